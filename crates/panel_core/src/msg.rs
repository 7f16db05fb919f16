use crate::checklist::Section;

/// Result of the upload request, as decoded by the network layer.
///
/// Superseded requests never produce a message; cancellation is absorbed
/// before it reaches the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Server stored the document and nothing needs review.
    Completed { message: Option<String> },
    /// Server stored the document but wants the extracted fields confirmed.
    NeedsConfirmation {
        fields: Vec<(String, String)>,
        raw_text: String,
        confirm_url: String,
        doc_id: u64,
    },
    /// Rejection or transport failure, already reduced to a display message.
    Failed { message: String },
}

/// Result of a plain POST action (confirm, delete, verify-all, verify-toggle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed { message: Option<String> },
    Failed { message: String },
}

/// Result of a payment create/update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Saved {
        payment_id: u64,
        /// Server-rendered markup for exactly one list entry.
        markup: String,
        /// True for a create, false for an update of an existing entry.
        created: bool,
        message: Option<String>,
    },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page finished loading; start polling and fetch once immediately.
    Started,
    /// Host visibility signal changed.
    PageVisibilityChanged(bool),
    /// Any dialog other than the upload dialog opened.
    DialogOpened,
    /// Any dialog other than the upload dialog closed.
    DialogClosed,
    /// Upload dialog became visible for the given document type.
    UploadDialogShown {
        document_type: String,
        parse_required: bool,
    },
    /// Upload dialog was hidden, whatever state the workflow was in.
    UploadDialogHidden,
    /// Periodic poll timer fired.
    RefreshTick,
    /// Manual refresh request; never gated.
    RefreshRequested,
    /// Checklist fetch succeeded.
    ChecklistFetched {
        generation: u64,
        sections: Vec<Section>,
    },
    /// Checklist fetch failed; prior content stays untouched.
    ChecklistFailed { generation: u64 },
    /// User opened or closed a checklist sub-section.
    SectionToggled { id: String, open: bool },
    /// User submitted the upload form.
    UploadSubmitted,
    UploadFinished(UploadOutcome),
    /// User edited one extracted field on the confirm step.
    ParsedFieldEdited { name: String, value: String },
    /// User toggled visibility of the raw extracted text.
    RawTextToggled,
    /// User activated the confirm affordance.
    ConfirmClicked,
    ConfirmFinished(ActionOutcome),
    /// User submitted the payment form.
    PaymentSubmitted { existing_id: Option<u64> },
    PaymentFinished(PaymentOutcome),
    DocumentDeleteRequested { document_id: u64 },
    DocumentDeleteFinished(ActionOutcome),
    VerifyAllRequested,
    VerifyAllFinished(ActionOutcome),
    VerifyToggleRequested { document_id: u64 },
    VerifyToggleFinished(ActionOutcome),
    /// Payment dialog service selection changed; drives price auto-fill.
    ServiceSelected { service: String },
    PriceFetched { amount: String },
    /// Price lookup failed; logged upstream, no user-visible error.
    PriceFailed,
    /// User dismissed the current notification.
    NoticeDismissed,
    /// Page is being torn down; release the timer and in-flight refresh.
    Teardown,
    /// Fallback for placeholder wiring.
    NoOp,
}
