use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Logical single-flight slot for one category of network operation.
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

/// Fallback shown when the server supplies no usable detail.
pub const GENERIC_FAILURE: &str = "Request failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport-level failure, including timeouts.
    Network,
    /// Non-2xx response status.
    HttpStatus(u16),
    /// 2xx response whose body could not be decoded.
    Decode,
    /// 2xx response with `status != "success"`; carries server-side detail.
    Rejected {
        message: Option<String>,
        errors: BTreeMap<String, Vec<String>>,
    },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Rejected { .. } => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct NetError {
    pub kind: FailureKind,
    pub message: String,
}

impl NetError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Reduces the failure to a user-facing message: the first field-level
    /// error, else the server message, else a generic fallback.
    pub fn display_message(&self) -> String {
        match &self.kind {
            FailureKind::Rejected { message, errors } => errors
                .values()
                .flat_map(|list| list.iter())
                .next()
                .cloned()
                .or_else(|| message.clone())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Completion of a coordinated request. `Cancelled` means superseded or
/// abandoned; callers treat it as a no-op, never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Cancelled,
    Failed(NetError),
}

/// One named sub-section extracted from the checklist fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSnapshot {
    pub id: String,
    pub markup: String,
    pub open: bool,
}

/// Extracted field values awaiting human review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub fields: Vec<(String, String)>,
    pub raw_text: String,
    pub confirm_url: String,
    pub doc_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub message: Option<String>,
    pub doc_id: Option<u64>,
    pub pending: Option<PendingConfirmation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReply {
    pub payment_id: u64,
    /// Server-rendered markup for exactly one list entry.
    pub html: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReply {
    pub message: Option<String>,
}

/// Multipart form payload assembled by the host; the core never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name the file is posted under.
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}
