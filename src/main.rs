use config::Config;
use image_classifier::impl_fake::ImageClassifierFake;
use image_classifier::impl_top_k::ImageClassifierTopK;
use image_classifier::interface::ImageClassifier;
use image_decoder::impl_image::ImageDecoderImage;
use image_preprocessor::impl_resize::ImagePreprocessorResize;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use model_loader::impl_fake::ModelLoaderFake;
use model_loader::impl_tract_onnx::ModelLoaderTractOnnx;
use model_loader::interface::ModelLoader;
use prediction_page::main::PredictionPage;
use prediction_page::run_effect::RunEffect;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod error;
mod image_classifier;
mod image_decoder;
mod image_preprocessor;
mod library;
mod model_catalog;
mod model_loader;
mod prediction_page;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env();

    let logger: Arc<dyn Logger + Send + Sync> =
        Arc::new(LoggerConsole::new(config.logger_timezone));

    let _ = logger.info(&format!("Starting with {:?}", config));

    let (model_loader, image_classifier): (
        Arc<dyn ModelLoader + Send + Sync>,
        Arc<dyn ImageClassifier + Send + Sync>,
    ) = if config.use_fake_collaborators {
        (
            Arc::new(ModelLoaderFake::new(logger.clone()).with_delay(Duration::from_secs(1))),
            Arc::new(ImageClassifierFake::random(logger.clone())),
        )
    } else {
        (
            Arc::new(ModelLoaderTractOnnx::new(
                config.models_dir.clone(),
                logger.clone(),
            )),
            Arc::new(ImageClassifierTopK::new(config.top_k, logger.clone())),
        )
    };

    let image_decoder = Arc::new(ImageDecoderImage::new(logger.clone()));

    let image_preprocessor = Arc::new(ImagePreprocessorResize::new());

    let run_effect = RunEffect::new(
        logger.clone(),
        model_loader,
        image_decoder,
        image_preprocessor,
        image_classifier,
    );

    let page = PredictionPage::new(config, logger, run_effect);

    prediction_page::gui::run(page)?;

    Ok(())
}
