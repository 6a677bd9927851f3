use crate::error::PageError;
use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::image_decoder::interface::{DecodedImage, ImageDecoder};
use crate::image_preprocessor::interface::ImagePreprocessor;
use crate::library::logger::interface::Logger;
use crate::model_catalog::ModelProfile;
use crate::model_loader::interface::{ModelHandle, ModelLoader};
use crate::prediction_page::core::{Effect, Event};
use std::sync::Arc;

/// Executes effects against the collaborators and reports back with the completion event.
#[derive(Clone)]
pub struct RunEffect {
    logger: Arc<dyn Logger + Send + Sync>,
    model_loader: Arc<dyn ModelLoader + Send + Sync>,
    image_decoder: Arc<dyn ImageDecoder + Send + Sync>,
    image_preprocessor: Arc<dyn ImagePreprocessor + Send + Sync>,
    image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
}

impl RunEffect {
    pub fn new(
        logger: Arc<dyn Logger + Send + Sync>,
        model_loader: Arc<dyn ModelLoader + Send + Sync>,
        image_decoder: Arc<dyn ImageDecoder + Send + Sync>,
        image_preprocessor: Arc<dyn ImagePreprocessor + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    ) -> Self {
        Self {
            logger: logger.with_namespace("effect"),
            model_loader,
            image_decoder,
            image_preprocessor,
            image_classifier,
        }
    }

    pub fn run_effect(&self, effect: Effect) -> Event {
        let _ = self
            .logger
            .info(&format!("Running effect: {}", effect.to_display_string()));

        match effect {
            Effect::LoadModel {
                load_id,
                choice,
                model_name,
            } => {
                let result = self.model_loader.load(&model_name);
                if let Err(e) = &result {
                    let _ = self.logger.error(&e.to_string());
                }
                Event::ModelLoadDone {
                    load_id,
                    choice,
                    result,
                }
            }
            Effect::DecodeImage {
                upload_id,
                name,
                bytes,
            } => {
                let result = self.image_decoder.decode(&name, &bytes);
                Event::ImageDecodeDone { upload_id, result }
            }
            Effect::Predict {
                upload_id,
                model,
                image,
                profile,
            } => {
                let result = self.predict(&model, &image, &profile);
                if let Err(e) = &result {
                    let _ = self.logger.error(&e.to_string());
                }
                Event::PredictionDone { upload_id, result }
            }
        }
    }

    fn predict(
        &self,
        model: &ModelHandle,
        image: &DecodedImage,
        profile: &ModelProfile,
    ) -> Result<Vec<Classification>, PageError> {
        let (width, height) = profile.target_size;
        let _ = self.logger.info(&format!(
            "Preparing {:?} as {} {}x{} ({}, keep aspect ratio: {})",
            image,
            profile.color_mode.as_str(),
            width,
            height,
            profile.interpolation.as_str(),
            profile.keep_aspect_ratio
        ));

        let input = self.image_preprocessor.preprocess(&image.image, profile)?;
        self.image_classifier.classify(model, &input)
    }
}
