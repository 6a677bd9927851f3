use crate::error::PageError;
use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::image_preprocessor::interface::ImageTensor;
use crate::library::logger::interface::Logger;
use crate::model_loader::interface::ModelHandle;
use std::sync::Arc;

/// Runs the model and keeps the `top_k` most likely classes.
pub struct ImageClassifierTopK {
    top_k: usize,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierTopK {
    pub fn new(top_k: usize, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            top_k: top_k.max(1),
            logger: logger.with_namespace("image_classifier"),
        }
    }
}

fn is_probability_distribution(scores: &[f32]) -> bool {
    scores.iter().all(|s| (0.0..=1.0).contains(s))
        && (scores.iter().sum::<f32>() - 1.0).abs() < 1e-3
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Turns raw model output into per-class probabilities.
///
/// A single output is a sigmoid over two classes, squashed first when it is a
/// raw logit; outputs that already sum to one
/// are kept as is; anything else is treated as logits.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    match scores {
        [p] => {
            let p = if (0.0..=1.0).contains(p) {
                *p
            } else {
                1.0 / (1.0 + (-p).exp())
            };
            vec![1.0 - p, p]
        }
        _ if is_probability_distribution(scores) => scores.to_vec(),
        _ => softmax(scores),
    }
}

pub fn label_for(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("class {}", index))
}

impl ImageClassifier for ImageClassifierTopK {
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

        let scores = model.run(input).map_err(PageError::inference)?;
        if scores.is_empty() {
            return Err(PageError::inference("model produced no scores"));
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(PageError::inference("model produced non-finite scores"));
        }

        let mut predictions: Vec<(usize, f32)> =
            to_probabilities(&scores).into_iter().enumerate().collect();
        predictions.sort_by(|a, b| b.1.total_cmp(&a.1));
        predictions.truncate(self.top_k);

        let classifications: Vec<Classification> = predictions
            .into_iter()
            .map(|(index, confidence)| Classification {
                label: label_for(model.labels(), index),
                confidence,
            })
            .collect();

        let _ = self
            .logger
            .info(&format!("Classifications: {:?}", classifications));

        Ok(classifications)
    }
}
