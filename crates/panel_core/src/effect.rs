/// Logical single-flight slot for one category of network operation.
///
/// Starting a request on a channel supersedes any request already in flight
/// on that same channel; different channels never interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    ChecklistRefresh,
    Upload,
    Confirm,
    PaymentCreate,
    PaymentUpdate,
    DocumentDelete,
    VerifyAll,
    VerifyToggle,
    PriceLookup,
}

/// Side effects requested by `update`. The host executes them; form payloads
/// (multipart bodies, file bytes) stay with the host and are attached when the
/// effect runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Arm the periodic checklist poll.
    StartPolling,
    /// Disarm the periodic checklist poll.
    StopPolling,
    /// Fetch the checklist fragment. The generation tags the response so a
    /// superseded completion can be discarded.
    FetchChecklist { generation: u64 },
    SubmitUpload {
        document_type: String,
        parse_required: bool,
    },
    SubmitConfirm {
        confirm_url: String,
        fields: Vec<(String, String)>,
    },
    /// Create a payment (`existing_id` is `None`) or update one.
    SubmitPayment { existing_id: Option<u64> },
    DeleteDocument { document_id: u64 },
    VerifyAll,
    ToggleVerification { document_id: u64 },
    FetchPrice { service: String },
    /// Abandon whatever is in flight on the channel.
    CancelChannel(Channel),
    /// Ask the host to hide the upload dialog.
    CloseUploadDialog,
}
