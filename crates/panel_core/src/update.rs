use crate::checklist::reconcile;
use crate::state::{NoticeKind, SchedulerState};
use crate::workflow::UploadPhase;
use crate::{ActionOutcome, Channel, Effect, Msg, PanelState, PaymentOutcome, UploadOutcome};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PanelState, msg: Msg) -> (PanelState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            let mut effects = Vec::new();
            if state.gate.allowed() {
                state.scheduler = SchedulerState::Running;
                effects.push(Effect::StartPolling);
                effects.push(state.issue_refresh());
            }
            effects
        }
        Msg::PageVisibilityChanged(visible) => {
            let was_allowed = state.gate.allowed();
            state.gate.page_visible = visible;
            gate_effects(&mut state, was_allowed)
        }
        Msg::DialogOpened => {
            let was_allowed = state.gate.allowed();
            state.gate.modal_depth += 1;
            gate_effects(&mut state, was_allowed)
        }
        Msg::DialogClosed => {
            let was_allowed = state.gate.allowed();
            state.gate.modal_depth = state.gate.modal_depth.saturating_sub(1);
            gate_effects(&mut state, was_allowed)
        }
        Msg::UploadDialogShown {
            document_type,
            parse_required,
        } => {
            let was_allowed = state.gate.allowed();
            state.gate.modal_depth += 1;
            state.upload.show(document_type, parse_required);
            state.mark_dirty();
            gate_effects(&mut state, was_allowed)
        }
        Msg::UploadDialogHidden => {
            let was_allowed = state.gate.allowed();
            state.gate.modal_depth = state.gate.modal_depth.saturating_sub(1);
            state.upload.reset();
            state.mark_dirty();
            let mut effects = vec![
                Effect::CancelChannel(Channel::Upload),
                Effect::CancelChannel(Channel::Confirm),
            ];
            effects.extend(gate_effects(&mut state, was_allowed));
            effects
        }
        Msg::RefreshTick => {
            // A tick that slips in after the timer was disarmed is dropped;
            // only the periodic path is gated.
            if state.scheduler == SchedulerState::Running {
                vec![state.issue_refresh()]
            } else {
                Vec::new()
            }
        }
        Msg::RefreshRequested => vec![state.issue_refresh()],
        Msg::ChecklistFetched {
            generation,
            sections,
        } => {
            if generation == state.refresh_generation {
                let expansion = state.pending_expansion.clone();
                reconcile(&mut state.sections, sections, &expansion);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ChecklistFailed { generation: _ } => {
            // Prior content stays untouched; the host logs the failure.
            Vec::new()
        }
        Msg::SectionToggled { id, open } => {
            if let Some(section) = state.sections.iter_mut().find(|section| section.id == id) {
                section.open = open;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadSubmitted => {
            if state.upload.phase == UploadPhase::Idle {
                state.upload.phase = UploadPhase::Submitting;
                state.mark_dirty();
                vec![Effect::SubmitUpload {
                    document_type: state.upload.document_type.clone(),
                    parse_required: state.upload.parse_required,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::UploadFinished(outcome) => {
            if state.upload.phase != UploadPhase::Submitting {
                return (state, Vec::new());
            }
            match outcome {
                UploadOutcome::Completed { message } => {
                    state.upload.phase = UploadPhase::Idle;
                    state.set_notice(
                        NoticeKind::Success,
                        message.unwrap_or_else(|| "Document uploaded.".to_string()),
                    );
                    vec![Effect::CloseUploadDialog, state.issue_refresh()]
                }
                UploadOutcome::NeedsConfirmation {
                    fields,
                    raw_text,
                    confirm_url,
                    doc_id,
                } => {
                    state
                        .upload
                        .enter_pending_confirmation(fields, raw_text, confirm_url, doc_id);
                    state.mark_dirty();
                    Vec::new()
                }
                UploadOutcome::Failed { message } => {
                    state.upload.phase = UploadPhase::Idle;
                    state.set_notice(NoticeKind::Error, message);
                    Vec::new()
                }
            }
        }
        Msg::ParsedFieldEdited { name, value } => {
            if state.upload.phase == UploadPhase::PendingConfirmation {
                state.upload.fields.insert(name, value);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RawTextToggled => {
            if matches!(
                state.upload.phase,
                UploadPhase::PendingConfirmation | UploadPhase::Confirming
            ) {
                state.upload.raw_text_visible = !state.upload.raw_text_visible;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ConfirmClicked => {
            if state.upload.phase != UploadPhase::PendingConfirmation {
                return (state, Vec::new());
            }
            match state.upload.confirm_url.clone() {
                Some(confirm_url) => {
                    state.upload.phase = UploadPhase::Confirming;
                    state.mark_dirty();
                    vec![Effect::SubmitConfirm {
                        confirm_url,
                        fields: state
                            .upload
                            .fields
                            .iter()
                            .map(|(name, value)| (name.clone(), value.clone()))
                            .collect(),
                    }]
                }
                None => Vec::new(),
            }
        }
        Msg::ConfirmFinished(outcome) => {
            if state.upload.phase != UploadPhase::Confirming {
                return (state, Vec::new());
            }
            match outcome {
                ActionOutcome::Completed { message } => {
                    state.upload.phase = UploadPhase::Idle;
                    state.set_notice(
                        NoticeKind::Success,
                        message.unwrap_or_else(|| "Document confirmed.".to_string()),
                    );
                    vec![Effect::CloseUploadDialog, state.issue_refresh()]
                }
                ActionOutcome::Failed { message } => {
                    // Fields are retained for correction, not cleared.
                    state.upload.phase = UploadPhase::PendingConfirmation;
                    state.set_notice(NoticeKind::Error, message);
                    Vec::new()
                }
            }
        }
        Msg::PaymentSubmitted { existing_id } => {
            vec![Effect::SubmitPayment { existing_id }]
        }
        Msg::PaymentFinished(outcome) => {
            match outcome {
                PaymentOutcome::Saved {
                    payment_id,
                    markup,
                    created,
                    message,
                } => {
                    if created {
                        state.payments.insert(payment_id, markup);
                    } else {
                        state.payments.update(payment_id, markup);
                    }
                    state.set_notice(
                        NoticeKind::Success,
                        message.unwrap_or_else(|| "Payment saved.".to_string()),
                    );
                }
                PaymentOutcome::Failed { message } => {
                    state.set_notice(NoticeKind::Error, message);
                }
            }
            Vec::new()
        }
        Msg::DocumentDeleteRequested { document_id } => {
            vec![Effect::DeleteDocument { document_id }]
        }
        Msg::DocumentDeleteFinished(outcome) => action_finished(
            &mut state,
            outcome,
            "Document deleted.",
        ),
        Msg::VerifyAllRequested => vec![Effect::VerifyAll],
        Msg::VerifyAllFinished(outcome) => action_finished(
            &mut state,
            outcome,
            "All documents verified.",
        ),
        Msg::VerifyToggleRequested { document_id } => {
            vec![Effect::ToggleVerification { document_id }]
        }
        Msg::VerifyToggleFinished(outcome) => action_finished(
            &mut state,
            outcome,
            "Verification status changed.",
        ),
        Msg::ServiceSelected { service } => {
            if service.is_empty() {
                state.price_field = Some("0.00".to_string());
                state.mark_dirty();
                Vec::new()
            } else {
                vec![Effect::FetchPrice { service }]
            }
        }
        Msg::PriceFetched { amount } => {
            state.price_field = Some(amount);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PriceFailed => Vec::new(),
        Msg::NoticeDismissed => {
            if state.notice.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Teardown => {
            state.scheduler = SchedulerState::Stopped;
            vec![
                Effect::StopPolling,
                Effect::CancelChannel(Channel::ChecklistRefresh),
            ]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Applies a gate transition after one of its inputs changed.
///
/// Closed-to-open resumes the timer and issues one immediate refresh so that
/// state changed while suspended is not stale for a full interval.
fn gate_effects(state: &mut PanelState, was_allowed: bool) -> Vec<Effect> {
    let allowed = state.gate.allowed();
    if allowed == was_allowed {
        return Vec::new();
    }
    if allowed {
        state.scheduler = SchedulerState::Running;
        vec![Effect::StartPolling, state.issue_refresh()]
    } else {
        state.scheduler = SchedulerState::Stopped;
        vec![Effect::StopPolling]
    }
}

fn action_finished(
    state: &mut PanelState,
    outcome: ActionOutcome,
    default_message: &str,
) -> Vec<Effect> {
    match outcome {
        ActionOutcome::Completed { message } => {
            state.set_notice(
                NoticeKind::Success,
                message.unwrap_or_else(|| default_message.to_string()),
            );
            vec![state.issue_refresh()]
        }
        ActionOutcome::Failed { message } => {
            state.set_notice(NoticeKind::Error, message);
            Vec::new()
        }
    }
}
