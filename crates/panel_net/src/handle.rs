use std::sync::{mpsc, Arc};
use std::thread;

use panel_logging::panel_debug;

use crate::coordinator::{RequestCoordinator, Reservation};
use crate::{
    ActionReply, Api, Channel, FormPayload, NetError, Outcome, PaymentReply, SectionSnapshot,
    UploadReply,
};

pub enum NetCommand {
    FetchChecklist {
        generation: u64,
        url: String,
    },
    Upload {
        url: String,
        form: FormPayload,
    },
    Confirm {
        url: String,
        fields: Vec<(String, String)>,
    },
    SavePayment {
        url: String,
        form: FormPayload,
        existing: Option<u64>,
    },
    /// Delete, verify-all or verify-toggle; the channel names which one.
    PostAction {
        channel: Channel,
        url: String,
    },
    FetchPrice {
        url: String,
    },
    Cancel(Channel),
}

/// Completions surfaced to the host. Cancelled outcomes are absorbed here and
/// never produce an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    ChecklistFetched {
        generation: u64,
        sections: Vec<SectionSnapshot>,
    },
    ChecklistFailed {
        generation: u64,
        error: NetError,
    },
    UploadFinished(Result<UploadReply, NetError>),
    ConfirmFinished(Result<ActionReply, NetError>),
    PaymentFinished {
        existing: Option<u64>,
        result: Result<PaymentReply, NetError>,
    },
    ActionFinished {
        channel: Channel,
        result: Result<ActionReply, NetError>,
    },
    PriceFinished(Result<String, NetError>),
}

/// Command/event pump around a dedicated tokio runtime thread. Commands run
/// as independent tasks; the per-channel coordinator supersedes overlapping
/// requests on the same channel.
pub struct NetHandle {
    cmd_tx: mpsc::Sender<NetCommand>,
    event_rx: mpsc::Receiver<NetEvent>,
}

impl NetHandle {
    pub fn new(api: Arc<dyn Api>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let coordinator = Arc::new(RequestCoordinator::new());

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    // Cancellation is synchronous; no task needed.
                    NetCommand::Cancel(channel) => coordinator.cancel(channel),
                    command => {
                        // Claim the slot here, in command order. Claiming
                        // inside the spawned task would let two back-to-back
                        // commands register in reverse and supersede the
                        // newer one.
                        let reservation = coordinator.reserve(command_channel(&command));
                        let api = api.clone();
                        let coordinator = coordinator.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run_command(api.as_ref(), &coordinator, command, reservation, event_tx)
                                .await;
                        });
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn sender(&self) -> mpsc::Sender<NetCommand> {
        self.cmd_tx.clone()
    }

    pub fn send(&self, command: NetCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<NetEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// Channel a command occupies while it runs.
fn command_channel(command: &NetCommand) -> Channel {
    match command {
        NetCommand::FetchChecklist { .. } => Channel::ChecklistRefresh,
        NetCommand::Upload { .. } => Channel::Upload,
        NetCommand::Confirm { .. } => Channel::Confirm,
        NetCommand::SavePayment { existing, .. } => {
            if existing.is_some() {
                Channel::PaymentUpdate
            } else {
                Channel::PaymentCreate
            }
        }
        NetCommand::PostAction { channel, .. } => *channel,
        NetCommand::FetchPrice { .. } => Channel::PriceLookup,
        NetCommand::Cancel(channel) => *channel,
    }
}

async fn run_command(
    api: &dyn Api,
    coordinator: &RequestCoordinator,
    command: NetCommand,
    reservation: Reservation,
    event_tx: mpsc::Sender<NetEvent>,
) {
    match command {
        NetCommand::FetchChecklist { generation, url } => {
            match coordinator
                .run_reserved(reservation, api.fetch_checklist(&url))
                .await
            {
                Outcome::Success(sections) => {
                    let _ = event_tx.send(NetEvent::ChecklistFetched {
                        generation,
                        sections,
                    });
                }
                Outcome::Cancelled => {
                    panel_debug!("checklist refresh superseded (generation {})", generation);
                }
                Outcome::Failed(error) => {
                    let _ = event_tx.send(NetEvent::ChecklistFailed { generation, error });
                }
            }
        }
        NetCommand::Upload { url, form } => {
            let outcome = coordinator
                .run_reserved(reservation, api.upload_document(&url, form))
                .await;
            if let Some(result) = completed(outcome) {
                let _ = event_tx.send(NetEvent::UploadFinished(result));
            }
        }
        NetCommand::Confirm { url, fields } => {
            let outcome = coordinator
                .run_reserved(reservation, api.confirm_document(&url, &fields))
                .await;
            if let Some(result) = completed(outcome) {
                let _ = event_tx.send(NetEvent::ConfirmFinished(result));
            }
        }
        NetCommand::SavePayment {
            url,
            form,
            existing,
        } => {
            let outcome = coordinator
                .run_reserved(reservation, api.save_payment(&url, form))
                .await;
            if let Some(result) = completed(outcome) {
                let _ = event_tx.send(NetEvent::PaymentFinished { existing, result });
            }
        }
        NetCommand::PostAction { channel, url } => {
            let outcome = coordinator
                .run_reserved(reservation, api.post_action(&url))
                .await;
            if let Some(result) = completed(outcome) {
                let _ = event_tx.send(NetEvent::ActionFinished { channel, result });
            }
        }
        NetCommand::FetchPrice { url } => {
            let outcome = coordinator
                .run_reserved(reservation, api.fetch_price(&url))
                .await;
            if let Some(result) = completed(outcome) {
                let _ = event_tx.send(NetEvent::PriceFinished(result));
            }
        }
        // Handled synchronously on the command thread.
        NetCommand::Cancel(_) => {}
    }
}

/// Folds a coordinated outcome into an emittable result; superseded requests
/// vanish without a trace.
fn completed<T>(outcome: Outcome<T>) -> Option<Result<T, NetError>> {
    match outcome {
        Outcome::Success(value) => Some(Ok(value)),
        Outcome::Failed(error) => Some(Err(error)),
        Outcome::Cancelled => None,
    }
}
