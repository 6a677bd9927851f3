use crate::error::PageError;
use crate::image_preprocessor::interface::{ImagePreprocessor, ImageTensor};
use crate::model_catalog::{ColorMode, ModelProfile};
use image::DynamicImage;

pub struct ImagePreprocessorResize {}

impl ImagePreprocessorResize {
    pub fn new() -> Self {
        Self {}
    }
}

/// Largest centered region of `image` with the aspect ratio of `width x height`.
pub fn crop_to_aspect_ratio(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (w, h) = (image.width() as u64, image.height() as u64);
    let (tw, th) = (width as u64, height as u64);

    let crop_w = w.min(h * tw / th).max(1);
    let crop_h = h.min(w * th / tw).max(1);

    let x_offset = (w - crop_w) / 2;
    let y_offset = (h - crop_h) / 2;

    image.crop_imm(
        x_offset as u32,
        y_offset as u32,
        crop_w as u32,
        crop_h as u32,
    )
}

pub fn resize_image(image: &DynamicImage, profile: &ModelProfile) -> DynamicImage {
    let (width, height) = profile.target_size;
    let filter = profile.interpolation.filter_type();

    if profile.keep_aspect_ratio {
        crop_to_aspect_ratio(image, width, height).resize_exact(width, height, filter)
    } else {
        image.resize_exact(width, height, filter)
    }
}

fn image_to_tensor(image: &DynamicImage, color_mode: ColorMode) -> ImageTensor {
    let (width, height) = (image.width() as usize, image.height() as usize);

    let data: Vec<f32> = match color_mode {
        ColorMode::Rgb => image
            .to_rgb8()
            .pixels()
            .flat_map(|p| p.0)
            .map(|c| c as f32 / 255.0)
            .collect(),
        ColorMode::Grayscale => image
            .to_luma8()
            .pixels()
            .map(|p| p.0[0] as f32 / 255.0)
            .collect(),
    };

    ImageTensor {
        shape: [1, height, width, color_mode.channels()],
        data,
    }
}

impl ImagePreprocessor for ImagePreprocessorResize {
    fn preprocess(
        &self,
        image: &DynamicImage,
        profile: &ModelProfile,
    ) -> Result<ImageTensor, PageError> {
        let (width, height) = profile.target_size;
        if width == 0 || height == 0 {
            return Err(PageError::inference(format!(
                "invalid target size {}x{} for {}",
                width, height, profile.model_name
            )));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(PageError::inference("image has no pixels"));
        }

        let resized = resize_image(image, profile);

        Ok(image_to_tensor(&resized, profile.color_mode))
    }
}
