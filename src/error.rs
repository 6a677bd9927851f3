use thiserror::Error;

/// Failures the page surfaces to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PageError {
    /// Model artifact missing or unreadable. Never retried automatically.
    #[error("failed to load model {model_name}: {reason}")]
    LoadFailure { model_name: String, reason: String },

    /// Unsupported or corrupt upload. The user is asked for another file.
    #[error("could not read image {name}: {reason}")]
    DecodeFailure { name: String, reason: String },

    /// Preprocessing or inference failed for an otherwise valid image.
    #[error("prediction failed: {reason}")]
    InferenceFailure { reason: String },
}

impl PageError {
    pub fn load(model_name: &str, reason: impl ToString) -> Self {
        PageError::LoadFailure {
            model_name: model_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(name: &str, reason: impl ToString) -> Self {
        PageError::DecodeFailure {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl ToString) -> Self {
        PageError::InferenceFailure {
            reason: reason.to_string(),
        }
    }
}
