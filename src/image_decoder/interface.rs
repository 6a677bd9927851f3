use crate::error::PageError;
use image::DynamicImage;

/// An accepted upload.
#[derive(Clone, PartialEq)]
pub struct DecodedImage {
    pub name: String,
    /// Container format as detected from the bytes, e.g. `PNG`.
    pub format: Option<String>,
    pub image: DynamicImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn format_label(&self) -> &str {
        self.format.as_deref().unwrap_or("unknown")
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("size", &(self.width(), self.height()))
            .finish()
    }
}

pub trait ImageDecoder {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage, PageError>;
}
