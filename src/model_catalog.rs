use image::imageops::FilterType;

/// Label of the select entry that stands for "no model chosen".
pub const PLACEHOLDER: &str = "Please select a model...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgb,
    Grayscale,
}

impl ColorMode {
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Rgb => 3,
            ColorMode::Grayscale => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Rgb => "RGB",
            ColorMode::Grayscale => "grayscale",
        }
    }
}

/// Resampling method used when resizing an upload to the model input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos,
}

impl Interpolation {
    pub fn filter_type(self) -> FilterType {
        match self {
            Interpolation::Nearest => FilterType::Nearest,
            Interpolation::Bilinear => FilterType::Triangle,
            Interpolation::Bicubic => FilterType::CatmullRom,
            Interpolation::Lanczos => FilterType::Lanczos3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interpolation::Nearest => "NEAREST",
            Interpolation::Bilinear => "BILINEAR",
            Interpolation::Bicubic => "BICUBIC",
            Interpolation::Lanczos => "LANCZOS",
        }
    }
}

/// How to prepare an image for one trained classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelProfile {
    /// File identifier of the saved model, relative to the models directory.
    pub model_name: &'static str,
    pub color_mode: ColorMode,
    /// `(width, height)` in pixels.
    pub target_size: (u32, u32),
    pub interpolation: Interpolation,
    pub keep_aspect_ratio: bool,
}

const TRANSFER_LEARNING: ModelProfile = ModelProfile {
    model_name: "TL_180px_32b_20e_model.keras",
    color_mode: ColorMode::Rgb,
    target_size: (180, 180),
    interpolation: Interpolation::Bilinear,
    keep_aspect_ratio: false,
};

const LENET: ModelProfile = ModelProfile {
    model_name: "Lenet_64px_32b-200e-model.keras",
    color_mode: ColorMode::Rgb,
    target_size: (64, 64),
    interpolation: Interpolation::Bilinear,
    keep_aspect_ratio: false,
};

const AUGMENTED_LENET: ModelProfile = ModelProfile {
    model_name: "AuLexNet5_128px_gray_32b_100e_model.keras",
    color_mode: ColorMode::Grayscale,
    target_size: (128, 128),
    interpolation: Interpolation::Bilinear,
    keep_aspect_ratio: false,
};

/// The closed set of models offered by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelChoice {
    TransferLearning,
    LeNet,
    AugmentedLeNet,
}

impl ModelChoice {
    /// Catalog entries in the order they are offered.
    pub const ALL: [ModelChoice; 3] = [
        ModelChoice::TransferLearning,
        ModelChoice::LeNet,
        ModelChoice::AugmentedLeNet,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelChoice::TransferLearning => "Transfer Learning",
            ModelChoice::LeNet => "LeNet",
            ModelChoice::AugmentedLeNet => "Augmented LeNet",
        }
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|choice| choice.display_name() == name)
    }

    pub fn profile(self) -> ModelProfile {
        match self {
            ModelChoice::TransferLearning => TRANSFER_LEARNING,
            ModelChoice::LeNet => LENET,
            ModelChoice::AugmentedLeNet => AUGMENTED_LENET,
        }
    }
}
