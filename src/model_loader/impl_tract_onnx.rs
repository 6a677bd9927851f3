use crate::error::PageError;
use crate::image_preprocessor::interface::ImageTensor;
use crate::library::logger::interface::Logger;
use crate::model_loader::interface::{LoadedModel, ModelHandle, ModelLoader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tract_onnx::prelude::*;

/// Loads ONNX exports of the trained models with tract.
///
/// Model identifiers name the Keras artifact (`*.keras`). The loader expects the
/// ONNX export next to it under the same stem, and optionally a
/// `<stem>.labels.txt` file holding one class name per line.
pub struct ModelLoaderTractOnnx {
    models_dir: PathBuf,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ModelLoaderTractOnnx {
    pub fn new(models_dir: PathBuf, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            models_dir,
            logger: logger.with_namespace("model_loader").with_namespace("tract"),
        }
    }

    pub fn resolve_path(&self, model_name: &str) -> PathBuf {
        let path = self.models_dir.join(model_name);
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("keras") | Some("h5") => path.with_extension("onnx"),
            _ => path,
        }
    }
}

pub fn read_labels(
    model_path: &Path,
) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
    let labels_path = model_path.with_extension("labels.txt");
    if !labels_path.exists() {
        return Ok(vec![]);
    }

    let contents = std::fs::read_to_string(&labels_path)?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

struct TractModel {
    plan: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    labels: Vec<String>,
}

impl TractModel {
    fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)?
            .into_optimized()?
            .into_runnable()?;

        let labels = read_labels(path)?;

        Ok(Self { plan, labels })
    }
}

impl LoadedModel for TractModel {
    fn run(
        &self,
        input: &ImageTensor,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        let [batch, height, width, channels] = input.shape;
        let tensor = tract_ndarray::Array4::from_shape_vec(
            (batch, height, width, channels),
            input.data.clone(),
        )?
        .into_tensor();

        let outputs = self.plan.run(tvec!(tensor.into_tvalue()))?;
        let output = outputs
            .first()
            .ok_or("model produced no output")?
            .to_array_view::<f32>()?;

        Ok(output.iter().copied().collect())
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl ModelLoader for ModelLoaderTractOnnx {
    fn load(&self, model_name: &str) -> Result<ModelHandle, PageError> {
        let path = self.resolve_path(model_name);
        let _ = self
            .logger
            .info(&format!("Loading model {} from {}", model_name, path.display()));

        if !path.exists() {
            let _ = self
                .logger
                .error(&format!("Model file not found: {}", path.display()));
            return Err(PageError::load(
                model_name,
                format!("file not found: {}", path.display()),
            ));
        }

        let model = TractModel::from_path(&path).map_err(|e| {
            let _ = self
                .logger
                .error(&format!("Loading {} failed: {}", model_name, e));
            PageError::load(model_name, e)
        })?;

        let _ = self.logger.info(&format!(
            "Model {} loaded with {} labels",
            model_name,
            model.labels.len()
        ));

        Ok(ModelHandle::new(model_name, Arc::new(model)))
    }
}
