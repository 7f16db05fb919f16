//! Panel core: pure state machine for the client record panel.
//!
//! Keeps the document checklist, payment list and upload dialog consistent
//! with server state. All I/O is expressed as [`Effect`] values; the host
//! feeds external events back in as [`Msg`] values.
mod checklist;
mod effect;
mod msg;
mod payments;
mod state;
mod update;
mod view_model;
mod workflow;

pub use checklist::Section;
pub use effect::{Channel, Effect};
pub use msg::{ActionOutcome, Msg, PaymentOutcome, UploadOutcome};
pub use payments::{PaymentEntry, PaymentList};
pub use state::{GateState, Notice, NoticeKind, PanelState, SchedulerState};
pub use update::update;
pub use view_model::{PanelViewModel, PaymentRowView, SectionView, UploadDialogView, UploadStep};
pub use workflow::{UploadPhase, UploadWorkflow};
