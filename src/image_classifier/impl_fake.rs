use crate::error::PageError;
use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::image_preprocessor::interface::ImageTensor;
use crate::library::logger::interface::Logger;
use crate::model_loader::interface::ModelHandle;
use rand::distr::{Distribution, Uniform};
use std::sync::{Arc, Mutex};

#[allow(dead_code)]
enum Behavior {
    Fixed(Vec<Classification>),
    Failing(String),
    Random,
}

pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    behavior: Behavior,
    calls: Mutex<Vec<(ModelHandle, ImageTensor)>>,
}

impl ImageClassifierFake {
    fn with_behavior(logger: Arc<dyn Logger + Send + Sync>, behavior: Behavior) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier").with_namespace("fake"),
            behavior,
            calls: Mutex::new(vec![]),
        }
    }

    /// Always answers with `classifications`.
    #[allow(dead_code)]
    pub fn new(
        logger: Arc<dyn Logger + Send + Sync>,
        classifications: Vec<Classification>,
    ) -> Self {
        Self::with_behavior(logger, Behavior::Fixed(classifications))
    }

    #[allow(dead_code)]
    pub fn failing(logger: Arc<dyn Logger + Send + Sync>, reason: &str) -> Self {
        Self::with_behavior(logger, Behavior::Failing(reason.to_string()))
    }

    /// Picks a random label of the model with a random confidence.
    pub fn random(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self::with_behavior(logger, Behavior::Random)
    }

    /// Model and input of every `classify` call, in call order.
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<(ModelHandle, ImageTensor)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn random_classification(
        &self,
        model: &ModelHandle,
    ) -> Result<Classification, Box<dyn std::error::Error + Send + Sync>> {
        let labels = model.labels();
        if labels.is_empty() {
            return Err("model has no labels".into());
        }

        let mut rng = rand::rng();
        let index_dist = Uniform::new(0, labels.len())?;
        let confidence_dist = Uniform::new(0.0, 1.0)?;

        Ok(Classification {
            label: labels[index_dist.sample(&mut rng)].clone(),
            confidence: confidence_dist.sample(&mut rng),
        })
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(
        &self,
        model: &ModelHandle,
        input: &ImageTensor,
    ) -> Result<Vec<Classification>, PageError> {
        let _ = self.logger.info(&format!(
            "Classifying {:?} with {}",
            input,
            model.model_name()
        ));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((model.clone(), input.clone()));
        }

        match &self.behavior {
            Behavior::Fixed(classifications) => Ok(classifications.clone()),
            Behavior::Failing(reason) => Err(PageError::inference(reason)),
            Behavior::Random => self
                .random_classification(model)
                .map(|classification| vec![classification])
                .map_err(PageError::inference),
        }
    }
}
