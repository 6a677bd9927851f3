use crate::error::PageError;
use crate::image_preprocessor::interface::ImageTensor;
use crate::model_loader::interface::ModelHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

pub trait ImageClassifier {
    /// Best classes first.
    fn classify(
        &self,
        model: &ModelHandle,
        input: &ImageTensor,
    ) -> Result<Vec<Classification>, PageError>;
}
