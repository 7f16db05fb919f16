use std::collections::BTreeMap;

/// Upload workflow phase. There is no terminal "completed" phase: a
/// successful upload or confirm dismisses the dialog, and the dialog-hidden
/// event resets the workflow to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Submitting,
    PendingConfirmation,
    Confirming,
}

/// State of one upload dialog lifetime.
///
/// Created when the dialog is shown and reset whenever it is hidden. An
/// in-flight confirm on a hidden dialog is abandoned, not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadWorkflow {
    pub(crate) phase: UploadPhase,
    pub(crate) document_type: String,
    pub(crate) parse_required: bool,
    /// Extracted field values, editable on the confirm step.
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) raw_text: String,
    pub(crate) raw_text_visible: bool,
    pub(crate) confirm_url: Option<String>,
    pub(crate) doc_id: Option<u64>,
}

impl UploadWorkflow {
    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn parse_required(&self) -> bool {
        self.parse_required
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn confirm_url(&self) -> Option<&str> {
        self.confirm_url.as_deref()
    }

    /// Dialog shown for a new target document type.
    pub(crate) fn show(&mut self, document_type: String, parse_required: bool) {
        *self = Self {
            document_type,
            parse_required,
            ..Self::default()
        };
    }

    /// Unconditional reset, regardless of current phase.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn enter_pending_confirmation(
        &mut self,
        fields: Vec<(String, String)>,
        raw_text: String,
        confirm_url: String,
        doc_id: u64,
    ) {
        self.phase = UploadPhase::PendingConfirmation;
        self.fields = fields.into_iter().collect();
        self.raw_text = raw_text;
        self.raw_text_visible = false;
        self.confirm_url = Some(confirm_url);
        self.doc_id = Some(doc_id);
    }
}
