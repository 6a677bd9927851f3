use crate::error::PageError;
use crate::image_preprocessor::interface::ImageTensor;
use crate::library::logger::interface::Logger;
use crate::model_loader::interface::{LoadedModel, ModelHandle, ModelLoader};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scores an image by its mean brightness: darker images favor earlier labels.
pub struct FakeModel {
    labels: Vec<String>,
}

impl FakeModel {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|label| label.to_string()).collect(),
        }
    }
}

impl LoadedModel for FakeModel {
    fn run(
        &self,
        input: &ImageTensor,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        if self.labels.is_empty() {
            return Err("fake model has no classes".into());
        }

        let classes = self.labels.len();
        let bucket = ((input.mean() * classes as f32) as usize).min(classes - 1);

        Ok((0..classes)
            .map(|i| if i == bucket { 0.8 } else { 0.2 / (classes - 1).max(1) as f32 })
            .collect())
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

pub struct ModelLoaderFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delay: Duration,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
    handles: Mutex<Vec<ModelHandle>>,
}

impl ModelLoaderFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("model_loader").with_namespace("fake"),
            delay: Duration::ZERO,
            failing: vec![],
            calls: Mutex::new(vec![]),
            handles: Mutex::new(vec![]),
        }
    }

    /// Simulates the time a real artifact takes to load.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes every load of `model_name` fail.
    #[allow(dead_code)]
    pub fn with_failing(mut self, model_name: &str) -> Self {
        self.failing.push(model_name.to_string());
        self
    }

    /// Identifiers passed to `load`, in call order.
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Handles returned by successful loads, in call order.
    #[allow(dead_code)]
    pub fn handles(&self) -> Vec<ModelHandle> {
        self.handles
            .lock()
            .map(|handles| handles.clone())
            .unwrap_or_default()
    }
}

impl ModelLoader for ModelLoaderFake {
    fn load(&self, model_name: &str) -> Result<ModelHandle, PageError> {
        let _ = self.logger.info(&format!("Loading {}...", model_name));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(model_name.to_string());
        }

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if self.failing.iter().any(|failing| failing == model_name) {
            let _ = self.logger.error(&format!("{} is corrupt", model_name));
            return Err(PageError::load(model_name, "artifact is corrupt"));
        }

        let handle = ModelHandle::new(
            model_name,
            Arc::new(FakeModel::new(&["Healthy", "Powdery", "Rust"])),
        );
        if let Ok(mut handles) = self.handles.lock() {
            handles.push(handle.clone());
        }

        let _ = self.logger.info(&format!("{} loaded", model_name));
        Ok(handle)
    }
}
