use crate::error::PageError;
use crate::image_preprocessor::interface::ImageTensor;
use std::sync::Arc;

/// A trained network ready for inference.
pub trait LoadedModel: Send + Sync {
    /// Raw per-class scores for a single-image batch.
    fn run(
        &self,
        input: &ImageTensor,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>>;

    /// Class names by output index. May be empty.
    fn labels(&self) -> &[String];
}

/// Opaque handle to a loaded model, shared by the session and in-flight predictions.
#[derive(Clone)]
pub struct ModelHandle {
    model_name: String,
    model: Arc<dyn LoadedModel>,
}

impl ModelHandle {
    pub fn new(model_name: &str, model: Arc<dyn LoadedModel>) -> Self {
        Self {
            model_name: model_name.to_string(),
            model,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn run(
        &self,
        input: &ImageTensor,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        self.model.run(input)
    }

    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }
}

/// Two handles are equal when they refer to the same load.
impl PartialEq for ModelHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.model) as *const (),
            Arc::as_ptr(&other.model) as *const (),
        )
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model_name", &self.model_name)
            .field("labels", &self.labels().len())
            .finish()
    }
}

pub trait ModelLoader {
    fn load(&self, model_name: &str) -> Result<ModelHandle, PageError>;
}
