use crate::error::PageError;
use crate::image_classifier::interface::Classification;
use crate::image_decoder::interface::DecodedImage;
use crate::model_catalog::{ModelChoice, ModelProfile};
use crate::model_loader::interface::ModelHandle;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PredictionState {
    #[default]
    Idle,
    Pending,
    Done(Vec<Classification>),
    Failed(String),
}

/// Per-session state of the page.
///
/// Created with `Session::default()` when the page opens and reset on
/// `Event::SessionEnded`. `loaded_model_handle` is `Some` only once the load
/// of `previous_selected_model` has completed.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Current value of the select control. `None` is the placeholder.
    pub selected_model: Option<ModelChoice>,
    /// Model whose load was last started.
    pub previous_selected_model: Option<ModelChoice>,
    pub loaded_model_handle: Option<ModelHandle>,
    pub load_error: Option<String>,
    pub has_valid_image: bool,
    pub uploaded_image: Option<Arc<DecodedImage>>,
    /// Name of the upload being decoded.
    pub pending_upload: Option<String>,
    pub upload_error: Option<String>,
    /// Bumped whenever an upload or a model switch supersedes in-flight work.
    pub upload_id: u64,
    /// Bumped whenever a model load starts; replies for older loads are dropped.
    pub load_id: u64,
    pub prediction: PredictionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NoSelection,
    Loading,
    LoadFailed,
    AwaitingUpload,
    ImageReady,
}

impl Session {
    pub fn is_loading(&self) -> bool {
        self.previous_selected_model.is_some() && self.loaded_model_handle.is_none()
    }

    pub fn page_state(&self) -> PageState {
        match self.selected_model {
            None => PageState::NoSelection,
            Some(_) if self.load_error.is_some() => PageState::LoadFailed,
            Some(_) if self.is_loading() => PageState::Loading,
            Some(_) if self.has_valid_image => PageState::ImageReady,
            Some(_) => PageState::AwaitingUpload,
        }
    }

    /// Profile of the model the current handle belongs to.
    pub fn active_profile(&self) -> Option<ModelProfile> {
        self.previous_selected_model.map(ModelChoice::profile)
    }

    fn discard_upload(&mut self) {
        self.upload_id += 1;
        self.has_valid_image = false;
        self.uploaded_image = None;
        self.pending_upload = None;
        self.upload_error = None;
        self.prediction = PredictionState::Idle;
    }

    fn predict_effect(&mut self) -> Option<Effect> {
        let model = self.loaded_model_handle.clone()?;
        let profile = self.active_profile()?;
        let image = self.uploaded_image.clone()?;
        if !self.has_valid_image {
            return None;
        }

        self.prediction = PredictionState::Pending;

        Some(Effect::Predict {
            upload_id: self.upload_id,
            model,
            image,
            profile,
        })
    }
}

#[derive(Debug)]
pub enum Event {
    ModelSelected(Option<ModelChoice>),
    ModelLoadDone {
        load_id: u64,
        choice: ModelChoice,
        result: Result<ModelHandle, PageError>,
    },
    ImageUploaded {
        name: String,
        bytes: Arc<[u8]>,
    },
    ImageDecodeDone {
        upload_id: u64,
        result: Result<DecodedImage, PageError>,
    },
    PredictionDone {
        upload_id: u64,
        result: Result<Vec<Classification>, PageError>,
    },
    SessionEnded,
}

impl Event {
    pub fn to_display_string(&self) -> String {
        match self {
            Event::ImageUploaded { name, bytes } => {
                format!("ImageUploaded {{ name: {:?}, bytes: {} }}", name, bytes.len())
            }
            event => format!("{:?}", event),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadModel {
        load_id: u64,
        choice: ModelChoice,
        model_name: String,
    },
    DecodeImage {
        upload_id: u64,
        name: String,
        bytes: Arc<[u8]>,
    },
    Predict {
        upload_id: u64,
        model: ModelHandle,
        image: Arc<DecodedImage>,
        profile: ModelProfile,
    },
}

impl Effect {
    pub fn to_display_string(&self) -> String {
        match self {
            Effect::DecodeImage {
                upload_id,
                name,
                bytes,
            } => format!(
                "DecodeImage {{ upload_id: {}, name: {:?}, bytes: {} }}",
                upload_id,
                name,
                bytes.len()
            ),
            effect => format!("{:?}", effect),
        }
    }
}

pub fn init() -> (Session, Vec<Effect>) {
    (Session::default(), vec![])
}

pub fn transition(session: Session, event: Event) -> (Session, Vec<Effect>) {
    let mut session = session;

    match event {
        Event::ModelSelected(None) => {
            session.selected_model = None;
            (session, vec![])
        }

        Event::ModelSelected(Some(choice)) => {
            session.selected_model = Some(choice);

            if session.previous_selected_model == Some(choice) {
                return (session, vec![]);
            }

            session.previous_selected_model = Some(choice);
            session.loaded_model_handle = None;
            session.load_error = None;
            session.load_id += 1;
            session.discard_upload();

            let effects = vec![Effect::LoadModel {
                load_id: session.load_id,
                choice,
                model_name: choice.profile().model_name.to_string(),
            }];
            (session, effects)
        }

        Event::ModelLoadDone {
            load_id,
            choice,
            result,
        } => {
            if load_id != session.load_id
                || session.previous_selected_model != Some(choice)
                || session.loaded_model_handle.is_some()
            {
                return (session, vec![]);
            }

            match result {
                Ok(handle) => {
                    session.loaded_model_handle = Some(handle);
                    let effects = session.predict_effect().into_iter().collect();
                    (session, effects)
                }
                Err(e) => {
                    session.previous_selected_model = None;
                    session.load_error = Some(e.to_string());
                    session.discard_upload();
                    (session, vec![])
                }
            }
        }

        Event::ImageUploaded { name, bytes } => {
            if !matches!(
                session.page_state(),
                PageState::Loading | PageState::AwaitingUpload | PageState::ImageReady
            ) {
                return (session, vec![]);
            }

            session.discard_upload();
            session.pending_upload = Some(name.clone());

            let effects = vec![Effect::DecodeImage {
                upload_id: session.upload_id,
                name,
                bytes,
            }];
            (session, effects)
        }

        Event::ImageDecodeDone { upload_id, result } => {
            if upload_id != session.upload_id || session.pending_upload.is_none() {
                return (session, vec![]);
            }
            session.pending_upload = None;

            match result {
                Ok(image) => {
                    session.has_valid_image = true;
                    session.uploaded_image = Some(Arc::new(image));
                    let effects = session.predict_effect().into_iter().collect();
                    (session, effects)
                }
                Err(e) => {
                    session.has_valid_image = false;
                    session.uploaded_image = None;
                    session.upload_error = Some(e.to_string());
                    (session, vec![])
                }
            }
        }

        Event::PredictionDone { upload_id, result } => {
            if upload_id != session.upload_id || session.prediction != PredictionState::Pending {
                return (session, vec![]);
            }

            session.prediction = match result {
                Ok(classifications) if classifications.is_empty() => {
                    PredictionState::Failed("the model returned no class".to_string())
                }
                Ok(classifications) => PredictionState::Done(classifications),
                Err(e) => PredictionState::Failed(e.to_string()),
            };
            (session, vec![])
        }

        Event::SessionEnded => init(),
    }
}
