//! Panel net: single-flight request channels and the record-page API client.
mod api;
mod coordinator;
mod fragment;
mod handle;
mod types;

pub use api::{Api, HttpApi, NetSettings};
pub use coordinator::{RequestCoordinator, Reservation};
pub use fragment::extract_sections;
pub use handle::{NetCommand, NetEvent, NetHandle};
pub use types::{
    ActionReply, Channel, FailureKind, FilePart, FormPayload, NetError, Outcome, PaymentReply,
    PendingConfirmation, SectionSnapshot, UploadReply, GENERIC_FAILURE,
};
