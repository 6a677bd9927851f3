use crate::image_classifier::interface::Classification;
use crate::image_decoder::interface::DecodedImage;
use crate::model_catalog::{ModelChoice, PLACEHOLDER};
use crate::prediction_page::core::{PageState, PredictionState, Session};
use std::sync::Arc;

pub const HEADER: &str = "Prediction 🍃";
pub const SELECT_SUBHEADER: &str = "1. Choose which model you want to use for prediction";
pub const SELECT_LABEL: &str = "Select a model to load:";
pub const UPLOAD_SUBHEADER: &str = "Upload an image";
pub const UPLOAD_NOTE: &str = "Note: please don't expect too much and don't load strange image.";
pub const RESULTS_SUBHEADER: &str = "Results";
pub const ORIGINAL_SUBHEADER: &str = "Original image ...";
pub const PREDICTION_SUBHEADER: &str = "... is probably :";

#[derive(Debug, Clone, PartialEq)]
pub enum StatusLine {
    Loading { model_file: String },
    Loaded { display_name: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionView {
    /// The model is still loading; the prediction starts once it is ready.
    WaitingForModel,
    Running,
    Label {
        best: Classification,
        others: Vec<Classification>,
    },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ResultsView {
    /// Changes whenever a different upload is shown.
    pub upload_id: u64,
    pub image: Arc<DecodedImage>,
    pub caption: String,
    pub prediction: PredictionView,
}

/// Everything the page displays for one session, top to bottom.
#[derive(Debug, Clone)]
pub struct PageView {
    pub options: Vec<&'static str>,
    pub selected_index: usize,
    pub model_status: Option<StatusLine>,
    pub show_upload_prompt: bool,
    pub decoding: Option<String>,
    pub upload_error: Option<String>,
    pub results: Option<ResultsView>,
}

pub fn select_options() -> Vec<&'static str> {
    std::iter::once(PLACEHOLDER)
        .chain(ModelChoice::ALL.iter().map(|choice| choice.display_name()))
        .collect()
}

/// Select entry at `index`; `None` for the placeholder.
pub fn choice_at(index: usize) -> Option<ModelChoice> {
    select_options()
        .get(index)
        .and_then(|name| ModelChoice::from_display_name(name))
}

pub fn file_details(image: &DecodedImage) -> String {
    format!(
        "Name: {}\nType: {}\nSize: {}x{}",
        image.name,
        image.format_label(),
        image.width(),
        image.height()
    )
}

fn model_status(session: &Session) -> Option<StatusLine> {
    if let Some(message) = &session.load_error {
        return Some(StatusLine::Failed {
            message: message.clone(),
        });
    }

    let choice = session.previous_selected_model?;
    if session.is_loading() {
        Some(StatusLine::Loading {
            model_file: choice.profile().model_name.to_string(),
        })
    } else {
        Some(StatusLine::Loaded {
            display_name: choice.display_name().to_string(),
        })
    }
}

fn prediction_view(session: &Session) -> PredictionView {
    match &session.prediction {
        PredictionState::Idle if session.is_loading() => PredictionView::WaitingForModel,
        PredictionState::Idle | PredictionState::Pending => PredictionView::Running,
        PredictionState::Done(classifications) => match classifications.split_first() {
            Some((best, others)) => PredictionView::Label {
                best: best.clone(),
                others: others.to_vec(),
            },
            None => PredictionView::Failed("the model returned no class".to_string()),
        },
        PredictionState::Failed(message) => PredictionView::Failed(message.clone()),
    }
}

impl PageView {
    pub fn from_session(session: &Session) -> Self {
        let selected_index = session
            .selected_model
            .and_then(|selected| ModelChoice::ALL.iter().position(|c| *c == selected))
            .map(|i| i + 1)
            .unwrap_or(0);

        let mut view = Self {
            options: select_options(),
            selected_index,
            model_status: None,
            show_upload_prompt: false,
            decoding: None,
            upload_error: None,
            results: None,
        };

        let state = session.page_state();
        if state == PageState::NoSelection {
            return view;
        }

        view.model_status = model_status(session);
        if state == PageState::LoadFailed {
            return view;
        }

        view.show_upload_prompt = true;
        view.decoding = session.pending_upload.clone();
        view.upload_error = session.upload_error.clone();

        if session.has_valid_image {
            view.results = session.uploaded_image.as_ref().map(|image| ResultsView {
                upload_id: session.upload_id,
                image: Arc::clone(image),
                caption: file_details(image),
                prediction: prediction_view(session),
            });
        }

        view
    }
}
