use std::sync::Once;

use panel_core::{
    update, ActionOutcome, Channel, Effect, Msg, PanelState, UploadOutcome, UploadPhase,
    UploadStep,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(panel_logging::initialize_for_tests);
}

fn shown(document_type: &str, parse_required: bool) -> PanelState {
    let (state, _) = update(PanelState::new(), Msg::Started);
    let (state, _) = update(
        state,
        Msg::UploadDialogShown {
            document_type: document_type.to_string(),
            parse_required,
        },
    );
    state
}

fn parsed_reply() -> UploadOutcome {
    UploadOutcome::NeedsConfirmation {
        fields: vec![
            ("first_name".to_string(), "Jan".to_string()),
            ("last_name".to_string(), "Kowalski".to_string()),
            ("case_number".to_string(), "123/2024".to_string()),
            ("fingerprints_date".to_string(), "2024-05-01".to_string()),
        ],
        raw_text: "WEZWANIE ... Jan Kowalski ...".to_string(),
        confirm_url: "/confirm/42/".to_string(),
        doc_id: 42,
    }
}

fn pending(document_type: &str) -> PanelState {
    let state = shown(document_type, true);
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (state, _) = update(state, Msg::UploadFinished(parsed_reply()));
    state
}

#[test]
fn parse_affordance_replaces_submit_for_parse_required_types() {
    init_logging();
    let view = shown("summons", true).view();

    assert_eq!(view.upload.step, UploadStep::Upload);
    assert!(view.upload.parse_visible);
    assert!(!view.upload.submit_visible);
    assert!(!view.upload.confirm_visible);

    let view = shown("passport", false).view();
    assert!(view.upload.submit_visible);
    assert!(!view.upload.parse_visible);
}

#[test]
fn submit_disables_controls_and_issues_the_upload() {
    init_logging();
    let state = shown("summons", true);
    let (state, effects) = update(state, Msg::UploadSubmitted);

    assert_eq!(state.upload().phase(), UploadPhase::Submitting);
    assert!(!state.view().upload.controls_enabled);
    assert!(!state.view().upload.confirm_visible);
    assert_eq!(
        effects,
        vec![Effect::SubmitUpload {
            document_type: "summons".to_string(),
            parse_required: true,
        }]
    );

    // Re-submitting while in flight is ignored.
    let (_state, effects) = update(state, Msg::UploadSubmitted);
    assert!(effects.is_empty());
}

#[test]
fn unconditional_success_closes_and_refreshes() {
    init_logging();
    let state = shown("passport", false);
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (state, effects) = update(
        state,
        Msg::UploadFinished(UploadOutcome::Completed {
            message: Some("Document 'passport' added.".to_string()),
        }),
    );

    assert_eq!(state.upload().phase(), UploadPhase::Idle);
    let notice = state.view().notice.expect("success notice");
    assert_eq!(notice.message, "Document 'passport' added.");
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::CloseUploadDialog);
    assert!(matches!(effects[1], Effect::FetchChecklist { .. }));
}

#[test]
fn pending_confirmation_reveals_the_confirm_step() {
    init_logging();
    let state = pending("summons");
    let view = state.view();

    assert_eq!(state.upload().phase(), UploadPhase::PendingConfirmation);
    assert_eq!(view.upload.step, UploadStep::Confirm);
    assert!(view.upload.confirm_visible);
    assert!(!view.upload.submit_visible);
    assert!(!view.upload.parse_visible);
    assert!(view.upload.controls_enabled);
    assert!(view
        .upload
        .fields
        .contains(&("first_name".to_string(), "Jan".to_string())));
    assert!(view
        .upload
        .fields
        .contains(&("case_number".to_string(), "123/2024".to_string())));

    // Raw text is stored but collapsed behind a manual toggle.
    assert!(!view.upload.raw_text_visible);
    assert!(!view.upload.raw_text.is_empty());
}

#[test]
fn raw_text_is_toggled_manually() {
    init_logging();
    let state = pending("summons");
    let (state, _) = update(state, Msg::RawTextToggled);
    assert!(state.view().upload.raw_text_visible);
    let (state, _) = update(state, Msg::RawTextToggled);
    assert!(!state.view().upload.raw_text_visible);
}

#[test]
fn confirm_carries_user_edited_fields_to_the_stored_locator() {
    init_logging();
    let state = pending("summons");
    let (state, _) = update(
        state,
        Msg::ParsedFieldEdited {
            name: "first_name".to_string(),
            value: "Jan Maria".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::ConfirmClicked);

    assert_eq!(state.upload().phase(), UploadPhase::Confirming);
    assert!(!state.view().upload.controls_enabled);
    let (confirm_url, fields) = match &effects[0] {
        Effect::SubmitConfirm {
            confirm_url,
            fields,
        } => (confirm_url.clone(), fields.clone()),
        other => panic!("unexpected effect: {other:?}"),
    };
    assert_eq!(confirm_url, "/confirm/42/");
    assert!(fields.contains(&("first_name".to_string(), "Jan Maria".to_string())));
    assert!(fields.contains(&("last_name".to_string(), "Kowalski".to_string())));
}

#[test]
fn confirm_success_closes_and_refreshes() {
    init_logging();
    let state = pending("summons");
    let (state, _) = update(state, Msg::ConfirmClicked);
    let (state, effects) = update(
        state,
        Msg::ConfirmFinished(ActionOutcome::Completed { message: None }),
    );

    assert_eq!(state.upload().phase(), UploadPhase::Idle);
    assert_eq!(effects[0], Effect::CloseUploadDialog);
    assert!(matches!(effects[1], Effect::FetchChecklist { .. }));
}

#[test]
fn confirm_rejection_retains_fields_for_correction() {
    init_logging();
    let state = pending("summons");
    let (state, _) = update(
        state,
        Msg::ParsedFieldEdited {
            name: "first_name".to_string(),
            value: "Jan Maria".to_string(),
        },
    );
    let (state, _) = update(state, Msg::ConfirmClicked);
    let (state, effects) = update(
        state,
        Msg::ConfirmFinished(ActionOutcome::Failed {
            message: "invalid".to_string(),
        }),
    );

    assert!(effects.is_empty());
    assert_eq!(state.upload().phase(), UploadPhase::PendingConfirmation);
    let view = state.view();
    assert_eq!(view.notice.expect("error notice").message, "invalid");
    assert!(view.upload.controls_enabled);
    assert!(view.upload.confirm_visible);
    assert!(view
        .upload
        .fields
        .contains(&("first_name".to_string(), "Jan Maria".to_string())));
}

#[test]
fn upload_rejection_returns_to_idle() {
    init_logging();
    let state = shown("summons", true);
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (state, effects) = update(
        state,
        Msg::UploadFinished(UploadOutcome::Failed {
            message: "Check the form for errors.".to_string(),
        }),
    );

    assert!(effects.is_empty());
    assert_eq!(state.upload().phase(), UploadPhase::Idle);
    let view = state.view();
    assert!(view.upload.controls_enabled);
    assert_eq!(
        view.notice.expect("error notice").message,
        "Check the form for errors."
    );
}

#[test]
fn hiding_the_dialog_resets_any_state() {
    init_logging();
    let state = pending("summons");
    let (state, effects) = update(state, Msg::UploadDialogHidden);

    assert_eq!(state.upload().phase(), UploadPhase::Idle);
    assert!(state.upload().fields().is_empty());
    assert!(state.upload().confirm_url().is_none());
    assert!(effects.contains(&Effect::CancelChannel(Channel::Upload)));
    assert!(effects.contains(&Effect::CancelChannel(Channel::Confirm)));
}

#[test]
fn reshow_resets_the_parse_requirement_per_type() {
    init_logging();
    let state = pending("summons");
    let (state, _) = update(state, Msg::UploadDialogHidden);
    let (state, _) = update(
        state,
        Msg::UploadDialogShown {
            document_type: "passport".to_string(),
            parse_required: false,
        },
    );

    let view = state.view();
    assert_eq!(state.upload().document_type(), "passport");
    assert!(!state.upload().parse_required());
    assert_eq!(view.upload.step, UploadStep::Upload);
    assert!(view.upload.submit_visible);
    assert!(view.upload.fields.is_empty());
}

#[test]
fn confirm_is_unreachable_without_a_successful_parse() {
    init_logging();
    // From Idle the click is a no-op.
    let state = shown("summons", true);
    let (state, effects) = update(state, Msg::ConfirmClicked);
    assert!(effects.is_empty());
    assert_eq!(state.upload().phase(), UploadPhase::Idle);

    // From Submitting as well.
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (state, effects) = update(state, Msg::ConfirmClicked);
    assert!(effects.is_empty());
    assert_eq!(state.upload().phase(), UploadPhase::Submitting);
    assert!(!state.view().upload.confirm_visible);
}

#[test]
fn stale_upload_result_after_hide_is_ignored() {
    init_logging();
    let state = shown("summons", true);
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (state, _) = update(state, Msg::UploadDialogHidden);

    // The channel was cancelled, but guard against a late completion anyway.
    let (state, effects) = update(state, Msg::UploadFinished(parsed_reply()));
    assert!(effects.is_empty());
    assert_eq!(state.upload().phase(), UploadPhase::Idle);
}
