//! Panel runtime: wires the pure core state machine to the network engine.
//!
//! The embedding UI owns rendering and raw DOM events; this crate owns the
//! message pump, the polling timer and effect execution.
mod effects;
mod endpoints;
mod logging;
mod runtime;

pub use effects::{FormSource, UiDirective};
pub use endpoints::Endpoints;
pub use logging::{initialize as initialize_logging, LogDestination};
pub use runtime::{PanelRuntime, REFRESH_INTERVAL};
