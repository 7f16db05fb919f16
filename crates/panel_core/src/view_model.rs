use crate::state::{Notice, PanelState, SchedulerState};
use crate::workflow::UploadPhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub id: String,
    pub open: bool,
    pub markup: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRowView {
    pub id: u64,
    pub markup: String,
}

/// Which step of the upload dialog is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    Upload,
    Confirm,
}

/// Projection of the upload dialog: affordance visibility is mutually
/// exclusive and derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDialogView {
    pub step: UploadStep,
    /// Plain submit affordance, shown for document types without parsing.
    pub submit_visible: bool,
    /// Parse affordance replacing submit for parse-required types.
    pub parse_visible: bool,
    /// Only ever revealed by the pending-confirmation transition.
    pub confirm_visible: bool,
    /// False while a request is in flight on the upload or confirm channel.
    pub controls_enabled: bool,
    pub fields: Vec<(String, String)>,
    pub raw_text: String,
    pub raw_text_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelViewModel {
    pub polling: SchedulerState,
    pub sections: Vec<SectionView>,
    pub payments: Vec<PaymentRowView>,
    pub payments_placeholder: bool,
    pub upload: UploadDialogView,
    pub price_field: Option<String>,
    pub notice: Option<Notice>,
}

impl PanelViewModel {
    pub(crate) fn project(state: &PanelState) -> Self {
        let phase = state.upload.phase;
        let step = match phase {
            UploadPhase::Idle | UploadPhase::Submitting => UploadStep::Upload,
            UploadPhase::PendingConfirmation | UploadPhase::Confirming => UploadStep::Confirm,
        };
        let upload = UploadDialogView {
            step,
            submit_visible: step == UploadStep::Upload && !state.upload.parse_required,
            parse_visible: step == UploadStep::Upload && state.upload.parse_required,
            confirm_visible: step == UploadStep::Confirm,
            controls_enabled: !matches!(
                phase,
                UploadPhase::Submitting | UploadPhase::Confirming
            ),
            fields: state
                .upload
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            raw_text: state.upload.raw_text.clone(),
            raw_text_visible: state.upload.raw_text_visible,
        };

        Self {
            polling: state.scheduler,
            sections: state
                .sections
                .iter()
                .map(|section| SectionView {
                    id: section.id.clone(),
                    open: section.open,
                    markup: section.markup.clone(),
                })
                .collect(),
            payments: state
                .payments
                .entries()
                .iter()
                .map(|entry| PaymentRowView {
                    id: entry.id,
                    markup: entry.markup.clone(),
                })
                .collect(),
            payments_placeholder: state.payments.has_placeholder(),
            upload,
            price_field: state.price_field.clone(),
            notice: state.notice.clone(),
        }
    }
}
