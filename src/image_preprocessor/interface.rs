use crate::error::PageError;
use crate::model_catalog::ModelProfile;
use image::DynamicImage;

/// Batch of one image laid out NHWC, values in `[0, 1]`.
#[derive(Clone, PartialEq)]
pub struct ImageTensor {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

impl ImageTensor {
    #[allow(dead_code)]
    pub fn height(&self) -> usize {
        self.shape[1]
    }

    #[allow(dead_code)]
    pub fn width(&self) -> usize {
        self.shape[2]
    }

    #[allow(dead_code)]
    pub fn channels(&self) -> usize {
        self.shape[3]
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|v| *v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }
}

impl std::fmt::Debug for ImageTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTensor")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

pub trait ImagePreprocessor {
    fn preprocess(
        &self,
        image: &DynamicImage,
        profile: &ModelProfile,
    ) -> Result<ImageTensor, PageError>;
}
