use crate::error::PageError;
use crate::image_decoder::interface::{DecodedImage, ImageDecoder};
use crate::library::logger::interface::Logger;
use std::io::Cursor;
use std::sync::Arc;

pub struct ImageDecoderImage {
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageDecoderImage {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_decoder"),
        }
    }
}

fn decode_bytes(
    bytes: &[u8],
) -> Result<(Option<String>, image::DynamicImage), Box<dyn std::error::Error + Send + Sync>> {
    if bytes.is_empty() {
        return Err("file is empty".into());
    }

    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader
        .format()
        .map(|format| format!("{:?}", format).to_uppercase());
    let image = reader.decode()?;

    if image.width() == 0 || image.height() == 0 {
        return Err("image has no pixels".into());
    }

    Ok((format, image))
}

impl ImageDecoder for ImageDecoderImage {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage, PageError> {
        let _ = self
            .logger
            .info(&format!("Decoding {} ({} bytes)", name, bytes.len()));

        match decode_bytes(bytes) {
            Ok((format, image)) => {
                let decoded = DecodedImage {
                    name: name.to_string(),
                    format,
                    image,
                };
                let _ = self.logger.info(&format!("Decoded {:?}", decoded));
                Ok(decoded)
            }
            Err(e) => {
                let _ = self
                    .logger
                    .error(&format!("Rejected upload {}: {}", name, e));
                Err(PageError::decode(name, e))
            }
        }
    }
}
