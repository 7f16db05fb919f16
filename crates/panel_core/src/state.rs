use std::collections::BTreeSet;

use crate::checklist::{expansion_set, Section};
use crate::payments::PaymentList;
use crate::view_model::PanelViewModel;
use crate::workflow::UploadWorkflow;
use crate::Effect;

/// Aggregated "may the periodic poll run" condition.
///
/// Dialogs may nest, so the modal side is a depth counter rather than a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    pub(crate) page_visible: bool,
    pub(crate) modal_depth: u32,
}

impl Default for GateState {
    fn default() -> Self {
        Self {
            page_visible: true,
            modal_depth: 0,
        }
    }
}

impl GateState {
    pub fn allowed(&self) -> bool {
        self.page_visible && self.modal_depth == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Dismissible notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelState {
    pub(crate) gate: GateState,
    pub(crate) scheduler: SchedulerState,
    /// Bumped each time a checklist fetch is issued; stale responses are
    /// detected by comparing against it.
    pub(crate) refresh_generation: u64,
    /// Expansion set captured when the latest fetch was issued.
    pub(crate) pending_expansion: BTreeSet<String>,
    pub(crate) sections: Vec<Section>,
    pub(crate) payments: PaymentList,
    pub(crate) upload: UploadWorkflow,
    /// Auto-filled total for the payment dialog, formatted as "0.00".
    pub(crate) price_field: Option<String>,
    pub(crate) notice: Option<Notice>,
    dirty: bool,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from server-rendered page content instead of an empty panel.
    pub fn with_initial(sections: Vec<Section>, payments: PaymentList) -> Self {
        Self {
            sections,
            payments,
            ..Self::default()
        }
    }

    pub fn view(&self) -> PanelViewModel {
        PanelViewModel::project(self)
    }

    pub fn gate(&self) -> GateState {
        self.gate
    }

    pub fn scheduler(&self) -> SchedulerState {
        self.scheduler
    }

    pub fn upload(&self) -> &UploadWorkflow {
        &self.upload
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Issues a checklist fetch: bumps the generation and captures the
    /// expansion set, immediately before the request goes out.
    pub(crate) fn issue_refresh(&mut self) -> Effect {
        self.refresh_generation += 1;
        self.pending_expansion = expansion_set(&self.sections);
        Effect::FetchChecklist {
            generation: self.refresh_generation,
        }
    }

    pub(crate) fn set_notice(&mut self, kind: NoticeKind, message: String) {
        self.notice = Some(Notice { kind, message });
        self.mark_dirty();
    }
}
