use super::fixture::{fake_handle, png_bytes, upload};
use crate::error::PageError;
use crate::image_classifier::interface::Classification;
use crate::image_decoder::interface::DecodedImage;
use crate::model_catalog::ModelChoice;
use crate::prediction_page::core::{
    init, transition, Effect, Event, PageState, PredictionState, Session,
};
use image::{DynamicImage, ImageBuffer, Rgb};
use std::sync::Arc;

fn decoded(name: &str) -> DecodedImage {
    DecodedImage {
        name: name.to_string(),
        format: Some("PNG".to_string()),
        image: DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 64, Rgb([0, 128, 0]))),
    }
}

fn select(session: Session, choice: ModelChoice) -> (Session, Vec<Effect>) {
    transition(session, Event::ModelSelected(Some(choice)))
}

/// Session with `choice` selected and its model loaded.
fn loaded(choice: ModelChoice) -> Session {
    let (session, _) = init();
    let (session, _) = select(session, choice);
    let load_id = session.load_id;
    let (session, _) = transition(
        session,
        Event::ModelLoadDone {
            load_id,
            choice,
            result: Ok(fake_handle(choice.profile().model_name)),
        },
    );
    session
}

/// Session with `choice` loaded and a decoded upload awaiting its prediction.
fn with_image(choice: ModelChoice) -> (Session, Vec<Effect>) {
    let bytes = png_bytes(4, 4, [0; 3]);
    let (session, effects) = transition(loaded(choice), upload("leaf.png", bytes));
    let upload_id = match &effects[..] {
        [Effect::DecodeImage { upload_id, .. }] => *upload_id,
        other => panic!("Unexpected effects: {:?}", other),
    };
    transition(
        session,
        Event::ImageDecodeDone {
            upload_id,
            result: Ok(decoded("leaf.png")),
        },
    )
}

#[test]
fn test_init() {
    let (session, effects) = init();

    assert_eq!(session.page_state(), PageState::NoSelection);
    assert!(session.previous_selected_model.is_none());
    assert!(session.loaded_model_handle.is_none());
    assert!(!session.has_valid_image);
    assert!(effects.is_empty());
}

#[test]
fn test_placeholder_does_nothing() {
    let (session, effects) = transition(Session::default(), Event::ModelSelected(None));

    assert_eq!(session.page_state(), PageState::NoSelection);
    assert!(effects.is_empty());
}

#[test]
fn test_first_selection_loads_model() {
    let (session, effects) = select(Session::default(), ModelChoice::TransferLearning);

    assert_eq!(session.page_state(), PageState::Loading);
    assert_eq!(
        session.previous_selected_model,
        Some(ModelChoice::TransferLearning)
    );
    assert!(!session.has_valid_image);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            load_id: session.load_id,
            choice: ModelChoice::TransferLearning,
            model_name: "TL_180px_32b_20e_model.keras".to_string(),
        }]
    );
}

#[test]
fn test_load_done_stores_handle() {
    let (session, _) = select(Session::default(), ModelChoice::LeNet);
    let handle = fake_handle("Lenet_64px_32b-200e-model.keras");
    let load_id = session.load_id;

    let (session, effects) = transition(
        session,
        Event::ModelLoadDone {
            load_id,
            choice: ModelChoice::LeNet,
            result: Ok(handle.clone()),
        },
    );

    assert_eq!(session.loaded_model_handle, Some(handle));
    assert_eq!(session.page_state(), PageState::AwaitingUpload);
    assert!(effects.is_empty());
}

#[test]
fn test_reselecting_same_model_does_not_reload() {
    let session = loaded(ModelChoice::TransferLearning);
    let handle = session.loaded_model_handle.clone();

    let (session, effects) = select(session, ModelChoice::TransferLearning);

    assert!(effects.is_empty());
    assert_eq!(session.loaded_model_handle, handle);
}

#[test]
fn test_reselecting_same_model_keeps_image() {
    let (session, _) = with_image(ModelChoice::LeNet);

    let (session, _) = transition(session, Event::ModelSelected(None));
    let (session, effects) = select(session, ModelChoice::LeNet);

    assert!(effects.is_empty());
    assert!(session.has_valid_image);
    assert_eq!(session.page_state(), PageState::ImageReady);
}

#[test]
fn test_switching_model_reloads_and_resets_image() {
    let (session, _) = with_image(ModelChoice::LeNet);
    assert!(session.has_valid_image);

    let (session, effects) = select(session, ModelChoice::AugmentedLeNet);

    assert!(!session.has_valid_image);
    assert!(session.uploaded_image.is_none());
    assert!(session.loaded_model_handle.is_none());
    assert_eq!(session.prediction, PredictionState::Idle);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            load_id: session.load_id,
            choice: ModelChoice::AugmentedLeNet,
            model_name: "AuLexNet5_128px_gray_32b_100e_model.keras".to_string(),
        }]
    );
}

#[test]
fn test_load_failure_returns_to_pre_load_state() {
    let (session, _) = select(Session::default(), ModelChoice::TransferLearning);
    let load_id = session.load_id;

    let (session, effects) = transition(
        session,
        Event::ModelLoadDone {
            load_id,
            choice: ModelChoice::TransferLearning,
            result: Err(PageError::load("TL_180px_32b_20e_model.keras", "missing")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(session.page_state(), PageState::LoadFailed);
    assert!(session.previous_selected_model.is_none());
    assert!(session.loaded_model_handle.is_none());
    assert!(session
        .load_error
        .as_deref()
        .is_some_and(|message| message.contains("TL_180px_32b_20e_model.keras")));

    // no upload is accepted until a model loads
    let (session, effects) = transition(session, upload("leaf.png", png_bytes(2, 2, [0; 3])));
    assert!(effects.is_empty());

    // explicit reselection is the only retry
    let (session, effects) = select(session, ModelChoice::TransferLearning);
    assert_eq!(effects.len(), 1);
    assert!(session.load_error.is_none());
    assert_eq!(session.page_state(), PageState::Loading);
}

#[test]
fn test_stale_load_is_ignored() {
    let (session, _) = select(Session::default(), ModelChoice::TransferLearning);
    let stale_id = session.load_id;
    let (session, _) = select(session, ModelChoice::LeNet);

    let (session, effects) = transition(
        session,
        Event::ModelLoadDone {
            load_id: stale_id,
            choice: ModelChoice::TransferLearning,
            result: Ok(fake_handle("TL_180px_32b_20e_model.keras")),
        },
    );

    assert!(effects.is_empty());
    assert!(session.loaded_model_handle.is_none());
    assert_eq!(session.page_state(), PageState::Loading);
}

#[test]
fn test_superseded_load_of_same_model_is_ignored() {
    let tl = ModelChoice::TransferLearning;
    let (session, _) = select(Session::default(), tl);
    let first_id = session.load_id;
    let (session, _) = select(session, ModelChoice::LeNet);
    let (session, effects) = select(session, tl);
    let current_id = match &effects[..] {
        [Effect::LoadModel { load_id, .. }] => *load_id,
        other => panic!("Unexpected effects: {:?}", other),
    };
    assert_ne!(first_id, current_id);

    let (session, effects) = transition(
        session,
        Event::ModelLoadDone {
            load_id: first_id,
            choice: tl,
            result: Err(PageError::load(tl.profile().model_name, "transient")),
        },
    );
    assert!(effects.is_empty());
    assert!(session.load_error.is_none());
    assert_eq!(session.page_state(), PageState::Loading);

    let handle = fake_handle(tl.profile().model_name);
    let (session, _) = transition(
        session,
        Event::ModelLoadDone {
            load_id: current_id,
            choice: tl,
            result: Ok(handle.clone()),
        },
    );
    assert_eq!(session.loaded_model_handle, Some(handle));
    assert_eq!(session.page_state(), PageState::AwaitingUpload);
}

#[test]
fn test_upload_ignored_without_selection() {
    let (session, effects) = transition(
        Session::default(),
        upload("leaf.png", png_bytes(2, 2, [0; 3])),
    );

    assert!(effects.is_empty());
    assert!(session.pending_upload.is_none());

    let session = loaded(ModelChoice::LeNet);
    let (session, _) = transition(session, Event::ModelSelected(None));
    let (_, effects) = transition(session, upload("leaf.png", png_bytes(2, 2, [0; 3])));

    assert!(effects.is_empty());
}

#[test]
fn test_upload_requests_decode() {
    let session = loaded(ModelChoice::LeNet);
    let bytes = png_bytes(2, 2, [0; 3]);
    let upload_id = session.upload_id;

    let (session, effects) = transition(session, upload("leaf.png", bytes.clone()));

    assert_eq!(session.upload_id, upload_id + 1);
    assert_eq!(session.pending_upload.as_deref(), Some("leaf.png"));
    assert_eq!(
        effects,
        vec![Effect::DecodeImage {
            upload_id: upload_id + 1,
            name: "leaf.png".to_string(),
            bytes,
        }]
    );
}

#[test]
fn test_decoded_image_triggers_prediction() {
    let (session, effects) = with_image(ModelChoice::LeNet);

    assert!(session.has_valid_image);
    assert_eq!(session.page_state(), PageState::ImageReady);
    assert_eq!(session.prediction, PredictionState::Pending);

    match &effects[..] {
        [Effect::Predict {
            upload_id,
            model,
            image,
            profile,
        }] => {
            assert_eq!(*upload_id, session.upload_id);
            assert_eq!(Some(model), session.loaded_model_handle.as_ref());
            assert_eq!(image.name, "leaf.png");
            assert_eq!(*profile, ModelChoice::LeNet.profile());
        }
        other => panic!("Unexpected effects: {:?}", other),
    }
}

#[test]
fn test_decode_failure_blocks_prediction() {
    let session = loaded(ModelChoice::AugmentedLeNet);
    let (session, _) = transition(session, upload("broken.png", Arc::from(vec![1u8, 2, 3])));

    let (session, effects) = transition(
        session.clone(),
        Event::ImageDecodeDone {
            upload_id: session.upload_id,
            result: Err(PageError::decode("broken.png", "truncated")),
        },
    );

    assert!(effects.is_empty());
    assert!(!session.has_valid_image);
    assert!(session.uploaded_image.is_none());
    assert!(session.upload_error.is_some());
    assert_eq!(session.prediction, PredictionState::Idle);
    assert_eq!(session.page_state(), PageState::AwaitingUpload);
}

#[test]
fn test_upload_while_loading_predicts_after_load() {
    let (session, _) = select(Session::default(), ModelChoice::LeNet);
    let (session, _) = transition(session, upload("leaf.png", png_bytes(2, 2, [0; 3])));

    let (session, effects) = transition(
        session.clone(),
        Event::ImageDecodeDone {
            upload_id: session.upload_id,
            result: Ok(decoded("leaf.png")),
        },
    );
    assert!(effects.is_empty());
    assert!(session.has_valid_image);
    assert_eq!(session.page_state(), PageState::Loading);

    let load_id = session.load_id;
    let (session, effects) = transition(
        session,
        Event::ModelLoadDone {
            load_id,
            choice: ModelChoice::LeNet,
            result: Ok(fake_handle("Lenet_64px_32b-200e-model.keras")),
        },
    );

    assert_eq!(session.prediction, PredictionState::Pending);
    assert!(matches!(&effects[..], [Effect::Predict { .. }]));
}

#[test]
fn test_stale_decode_is_ignored() {
    let session = loaded(ModelChoice::LeNet);
    let (session, _) = transition(session, upload("first.png", png_bytes(2, 2, [0; 3])));
    let first_id = session.upload_id;
    let (session, _) = transition(session, upload("second.png", png_bytes(2, 2, [0; 3])));

    let (session, effects) = transition(
        session,
        Event::ImageDecodeDone {
            upload_id: first_id,
            result: Ok(decoded("first.png")),
        },
    );

    assert!(effects.is_empty());
    assert!(!session.has_valid_image);
    assert_eq!(session.pending_upload.as_deref(), Some("second.png"));
}

#[test]
fn test_prediction_done() {
    let (session, _) = with_image(ModelChoice::TransferLearning);
    let classifications = vec![Classification {
        label: "Healthy".to_string(),
        confidence: 0.8,
    }];

    let (session, effects) = transition(
        session.clone(),
        Event::PredictionDone {
            upload_id: session.upload_id,
            result: Ok(classifications.clone()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(session.prediction, PredictionState::Done(classifications));
}

#[test]
fn test_prediction_failure_is_visible() {
    let (session, _) = with_image(ModelChoice::TransferLearning);

    let (session, _) = transition(
        session.clone(),
        Event::PredictionDone {
            upload_id: session.upload_id,
            result: Err(PageError::inference("shape mismatch")),
        },
    );

    assert_eq!(
        session.prediction,
        PredictionState::Failed("prediction failed: shape mismatch".to_string())
    );
    assert!(session.has_valid_image);
    assert!(session.loaded_model_handle.is_some());
}

#[test]
fn test_empty_prediction_is_failure() {
    let (session, _) = with_image(ModelChoice::TransferLearning);

    let (session, _) = transition(
        session.clone(),
        Event::PredictionDone {
            upload_id: session.upload_id,
            result: Ok(vec![]),
        },
    );

    assert!(matches!(session.prediction, PredictionState::Failed(_)));
}

#[test]
fn test_prediction_for_replaced_model_is_ignored() {
    let (session, _) = with_image(ModelChoice::TransferLearning);
    let old_upload_id = session.upload_id;
    let (session, _) = select(session, ModelChoice::LeNet);

    let (session, _) = transition(
        session,
        Event::PredictionDone {
            upload_id: old_upload_id,
            result: Ok(vec![Classification {
                label: "Rust".to_string(),
                confidence: 1.0,
            }]),
        },
    );

    assert_eq!(session.prediction, PredictionState::Idle);
}

#[test]
fn test_session_ended_resets_everything() {
    let (session, _) = with_image(ModelChoice::LeNet);

    let (session, effects) = transition(session, Event::SessionEnded);

    assert!(effects.is_empty());
    assert_eq!(session.page_state(), PageState::NoSelection);
    assert!(session.previous_selected_model.is_none());
    assert!(session.loaded_model_handle.is_none());
    assert!(!session.has_valid_image);
    assert_eq!(session.upload_id, 0);
}
