use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use panel_core::{update, Msg, PanelState, PanelViewModel};
use panel_net::{HttpApi, NetError, NetHandle, NetSettings};

use crate::effects::{spawn_event_loop, EffectRunner, FormSource, UiDirective};
use crate::Endpoints;

/// Fixed periodic poll interval for the checklist channel.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(8);

/// Headless driver for one record page: owns the message pump, the polling
/// timer and the network engine. The embedding UI dispatches events and
/// renders from the view model.
pub struct PanelRuntime {
    msg_tx: mpsc::Sender<Msg>,
    shared: Arc<Mutex<PanelState>>,
    directives: Arc<Mutex<VecDeque<UiDirective>>>,
}

impl PanelRuntime {
    pub fn new(
        endpoints: Endpoints,
        settings: NetSettings,
        forms: Box<dyn FormSource>,
    ) -> Result<Self, NetError> {
        Self::with_state(PanelState::new(), endpoints, settings, forms)
    }

    /// Starts from server-rendered page content instead of an empty panel.
    pub fn with_state(
        state: PanelState,
        endpoints: Endpoints,
        settings: NetSettings,
        forms: Box<dyn FormSource>,
    ) -> Result<Self, NetError> {
        let api = Arc::new(HttpApi::new(settings)?);
        let handle = NetHandle::new(api);
        let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
        let shared = Arc::new(Mutex::new(state));
        let directives = Arc::new(Mutex::new(VecDeque::new()));
        let timer_armed = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));

        let runner = EffectRunner::new(
            handle.sender(),
            endpoints,
            timer_armed.clone(),
            directives.clone(),
            forms,
        );
        spawn_event_loop(handle, msg_tx.clone(), shutdown.clone());
        spawn_timer(timer_armed, shutdown.clone(), msg_tx.clone());
        spawn_pump(shared.clone(), msg_rx, runner, shutdown);

        let runtime = Self {
            msg_tx,
            shared,
            directives,
        };
        runtime.dispatch(Msg::Started);
        Ok(runtime)
    }

    pub fn dispatch(&self, msg: Msg) {
        let _ = self.msg_tx.send(msg);
    }

    pub fn view(&self) -> PanelViewModel {
        self.shared.lock().expect("panel state lock").view()
    }

    /// True once per batch of state changes; lets the UI skip re-renders.
    pub fn take_dirty(&self) -> bool {
        self.shared.lock().expect("panel state lock").consume_dirty()
    }

    pub fn try_recv_directive(&self) -> Option<UiDirective> {
        self.directives.lock().expect("directives lock").pop_front()
    }
}

impl Drop for PanelRuntime {
    /// Release path independent of the host remembering to send `Teardown`:
    /// stops the poll, abandons any in-flight refresh and unwinds the
    /// background threads.
    fn drop(&mut self) {
        let _ = self.msg_tx.send(Msg::Teardown);
    }
}

/// Background tick driving the periodic refresh. The armed flag mirrors the
/// core scheduler; the core additionally drops ticks that slip past a disarm.
/// Sleeps in short slices so teardown is not stalled by a full interval.
fn spawn_timer(armed: Arc<AtomicBool>, shutdown: Arc<AtomicBool>, msg_tx: mpsc::Sender<Msg>) {
    const SLICE: Duration = Duration::from_millis(100);
    thread::spawn(move || {
        let mut slept = Duration::ZERO;
        loop {
            thread::sleep(SLICE);
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            slept += SLICE;
            if slept < REFRESH_INTERVAL {
                continue;
            }
            slept = Duration::ZERO;
            if armed.load(Ordering::Relaxed) && msg_tx.send(Msg::RefreshTick).is_err() {
                break;
            }
        }
    });
}

/// Applies messages to the shared state and executes the resulting effects.
/// `Teardown` is terminal: its effects still run (disarm, cancel), then the
/// pump exits and raises the shutdown flag for the other threads.
fn spawn_pump(
    shared: Arc<Mutex<PanelState>>,
    msg_rx: mpsc::Receiver<Msg>,
    runner: EffectRunner,
    shutdown: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        while let Ok(msg) = msg_rx.recv() {
            let teardown = msg == Msg::Teardown;
            let effects = {
                let mut guard = shared.lock().expect("panel state lock");
                let state = std::mem::take(&mut *guard);
                let (state, effects) = update(state, msg);
                *guard = state;
                effects
            };
            runner.run(effects);
            if teardown {
                break;
            }
        }
        shutdown.store(true, Ordering::Relaxed);
    });
}
