use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use panel_core::{ActionOutcome, Channel, Effect, Msg, PaymentOutcome, Section, UploadOutcome};
use panel_logging::{panel_debug, panel_warn};
use panel_net::{
    ActionReply, FormPayload, NetCommand, NetError, NetEvent, NetHandle, SectionSnapshot,
};

use crate::Endpoints;

/// Host-side source for live form payloads. The core never holds file bytes;
/// the payload is read off the dialog at the moment the effect runs.
pub trait FormSource: Send {
    fn upload_form(&self) -> FormPayload;
    fn payment_form(&self, existing_id: Option<u64>) -> FormPayload;
}

/// One-shot instructions for the embedding UI that are not state projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiDirective {
    CloseUploadDialog,
}

pub(crate) struct EffectRunner {
    net: mpsc::Sender<NetCommand>,
    endpoints: Endpoints,
    timer_armed: Arc<AtomicBool>,
    directives: Arc<Mutex<VecDeque<UiDirective>>>,
    forms: Box<dyn FormSource>,
}

impl EffectRunner {
    pub(crate) fn new(
        net: mpsc::Sender<NetCommand>,
        endpoints: Endpoints,
        timer_armed: Arc<AtomicBool>,
        directives: Arc<Mutex<VecDeque<UiDirective>>>,
        forms: Box<dyn FormSource>,
    ) -> Self {
        Self {
            net,
            endpoints,
            timer_armed,
            directives,
            forms,
        }
    }

    pub(crate) fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling => self.timer_armed.store(true, Ordering::Relaxed),
                Effect::StopPolling => self.timer_armed.store(false, Ordering::Relaxed),
                Effect::FetchChecklist { generation } => self.send(NetCommand::FetchChecklist {
                    generation,
                    url: self.endpoints.checklist_refresh.clone(),
                }),
                Effect::SubmitUpload {
                    document_type,
                    parse_required,
                } => {
                    let mut form = self.forms.upload_form();
                    if parse_required {
                        form.fields
                            .push(("parse_required".to_string(), "1".to_string()));
                    }
                    self.send(NetCommand::Upload {
                        url: self.endpoints.upload_url(&document_type),
                        form,
                    });
                }
                Effect::SubmitConfirm {
                    confirm_url,
                    fields,
                } => self.send(NetCommand::Confirm {
                    url: confirm_url,
                    fields,
                }),
                Effect::SubmitPayment { existing_id } => self.send(NetCommand::SavePayment {
                    url: self.endpoints.payment_url(existing_id),
                    form: self.forms.payment_form(existing_id),
                    existing: existing_id,
                }),
                Effect::DeleteDocument { document_id } => self.send(NetCommand::PostAction {
                    channel: panel_net::Channel::DocumentDelete,
                    url: self.endpoints.document_delete_url(document_id),
                }),
                Effect::VerifyAll => self.send(NetCommand::PostAction {
                    channel: panel_net::Channel::VerifyAll,
                    url: self.endpoints.verify_all.clone(),
                }),
                Effect::ToggleVerification { document_id } => self.send(NetCommand::PostAction {
                    channel: panel_net::Channel::VerifyToggle,
                    url: self.endpoints.verify_toggle_url(document_id),
                }),
                Effect::FetchPrice { service } => self.send(NetCommand::FetchPrice {
                    url: self.endpoints.price_url(&service),
                }),
                Effect::CancelChannel(channel) => {
                    self.send(NetCommand::Cancel(map_channel(channel)))
                }
                Effect::CloseUploadDialog => self
                    .directives
                    .lock()
                    .expect("directives lock")
                    .push_back(UiDirective::CloseUploadDialog),
            }
        }
    }

    fn send(&self, command: NetCommand) {
        let _ = self.net.send(command);
    }
}

fn map_channel(channel: Channel) -> panel_net::Channel {
    match channel {
        Channel::ChecklistRefresh => panel_net::Channel::ChecklistRefresh,
        Channel::Upload => panel_net::Channel::Upload,
        Channel::Confirm => panel_net::Channel::Confirm,
        Channel::PaymentCreate => panel_net::Channel::PaymentCreate,
        Channel::PaymentUpdate => panel_net::Channel::PaymentUpdate,
        Channel::DocumentDelete => panel_net::Channel::DocumentDelete,
        Channel::VerifyAll => panel_net::Channel::VerifyAll,
        Channel::VerifyToggle => panel_net::Channel::VerifyToggle,
        Channel::PriceLookup => panel_net::Channel::PriceLookup,
    }
}

fn map_section(snapshot: SectionSnapshot) -> Section {
    Section {
        id: snapshot.id,
        markup: snapshot.markup,
        open: snapshot.open,
    }
}

fn action_outcome(result: Result<ActionReply, NetError>) -> ActionOutcome {
    match result {
        Ok(reply) => ActionOutcome::Completed {
            message: reply.message,
        },
        Err(error) => ActionOutcome::Failed {
            message: error.display_message(),
        },
    }
}

/// Polls net events and translates them into core messages. Exiting drops the
/// handle, whose command sender keeps the network thread alive.
pub(crate) fn spawn_event_loop(
    handle: NetHandle,
    msg_tx: mpsc::Sender<Msg>,
    shutdown: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        while !shutdown.load(Ordering::Relaxed) {
            if let Some(event) = handle.try_recv() {
                let msg = translate_event(event);
                if msg_tx.send(msg).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        }
    });
}

fn translate_event(event: NetEvent) -> Msg {
    match event {
        NetEvent::ChecklistFetched {
            generation,
            sections,
        } => Msg::ChecklistFetched {
            generation,
            sections: sections.into_iter().map(map_section).collect(),
        },
        NetEvent::ChecklistFailed { generation, error } => {
            // Logged only; transient connectivity loss must not flood the
            // user with a notification every tick.
            panel_warn!("checklist refresh failed: {}", error);
            Msg::ChecklistFailed { generation }
        }
        NetEvent::UploadFinished(result) => Msg::UploadFinished(match result {
            Ok(reply) => match reply.pending {
                Some(pending) => UploadOutcome::NeedsConfirmation {
                    fields: pending.fields,
                    raw_text: pending.raw_text,
                    confirm_url: pending.confirm_url,
                    doc_id: pending.doc_id,
                },
                None => UploadOutcome::Completed {
                    message: reply.message,
                },
            },
            Err(error) => UploadOutcome::Failed {
                message: error.display_message(),
            },
        }),
        NetEvent::ConfirmFinished(result) => Msg::ConfirmFinished(action_outcome(result)),
        NetEvent::PaymentFinished { existing, result } => Msg::PaymentFinished(match result {
            Ok(reply) => PaymentOutcome::Saved {
                payment_id: reply.payment_id,
                markup: reply.html,
                created: existing.is_none(),
                message: reply.message,
            },
            Err(error) => PaymentOutcome::Failed {
                message: error.display_message(),
            },
        }),
        NetEvent::ActionFinished { channel, result } => {
            let outcome = action_outcome(result);
            match channel {
                panel_net::Channel::DocumentDelete => Msg::DocumentDeleteFinished(outcome),
                panel_net::Channel::VerifyAll => Msg::VerifyAllFinished(outcome),
                panel_net::Channel::VerifyToggle => Msg::VerifyToggleFinished(outcome),
                other => {
                    panel_warn!("action completion on unexpected channel: {:?}", other);
                    Msg::NoOp
                }
            }
        }
        NetEvent::PriceFinished(result) => match result {
            Ok(amount) => Msg::PriceFetched { amount },
            Err(error) => {
                panel_debug!("price lookup failed: {}", error);
                Msg::PriceFailed
            }
        },
    }
}
