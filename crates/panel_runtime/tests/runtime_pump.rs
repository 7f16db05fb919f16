use std::sync::Once;
use std::thread;
use std::time::{Duration, Instant};

use panel_core::{Msg, PanelViewModel, SchedulerState, UploadOutcome};
use panel_net::{FormPayload, NetSettings};
use panel_runtime::{Endpoints, FormSource, PanelRuntime, UiDirective};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(panel_logging::initialize_for_tests);
}

struct NoForms;

impl FormSource for NoForms {
    fn upload_form(&self) -> FormPayload {
        FormPayload::default()
    }

    fn payment_form(&self, _existing_id: Option<u64>) -> FormPayload {
        FormPayload::default()
    }
}

fn endpoints() -> Endpoints {
    // Discard port; requests fail fast and get logged, which is all these
    // tests need from the network side.
    let base = "http://127.0.0.1:9";
    Endpoints {
        checklist_refresh: format!("{base}/checklist/"),
        upload_template: format!("{base}/documents/__doc_type__/add/"),
        payment_create: format!("{base}/payments/add/"),
        payment_update_template: format!("{base}/payments/__payment_id__/edit/"),
        document_delete_template: format!("{base}/documents/__document_id__/delete/"),
        verify_all: format!("{base}/documents/verify-all/"),
        verify_toggle_template: format!("{base}/documents/__document_id__/verify/"),
        price_template: format!("{base}/services/__service__/price/"),
    }
}

fn runtime() -> PanelRuntime {
    PanelRuntime::new(endpoints(), NetSettings::default(), Box::new(NoForms)).expect("runtime")
}

fn wait_for(runtime: &PanelRuntime, predicate: impl Fn(&PanelViewModel) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if predicate(&runtime.view()) {
            return;
        }
        assert!(Instant::now() < deadline, "condition never reached");
        thread::sleep(Duration::from_millis(10));
    }
}

fn thread_count() -> usize {
    let status = std::fs::read_to_string("/proc/self/status").expect("proc status");
    status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|rest| rest.trim().parse().ok())
        .expect("thread count")
}

#[test]
fn dropping_the_runtime_releases_its_background_threads() {
    init_logging();
    let baseline = thread_count();

    for _ in 0..3 {
        let runtime = runtime();
        wait_for(&runtime, |view| view.polling == SchedulerState::Running);
    }

    // Pump, timer, event loop and the network thread (with its tokio
    // workers) must all unwind; other tests may still be winding down, so
    // wait for the count to settle back to the baseline.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if thread_count() <= baseline {
            break;
        }
        assert!(
            Instant::now() < deadline,
            "background threads never unwound"
        );
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn startup_arms_polling_and_dialogs_suspend_it() {
    init_logging();
    let runtime = runtime();
    wait_for(&runtime, |view| view.polling == SchedulerState::Running);

    runtime.dispatch(Msg::DialogOpened);
    wait_for(&runtime, |view| view.polling == SchedulerState::Stopped);

    runtime.dispatch(Msg::DialogClosed);
    wait_for(&runtime, |view| view.polling == SchedulerState::Running);
}

#[test]
fn upload_completion_directs_the_dialog_to_close() {
    init_logging();
    let runtime = runtime();
    wait_for(&runtime, |view| view.polling == SchedulerState::Running);

    runtime.dispatch(Msg::UploadDialogShown {
        document_type: "passport".to_string(),
        parse_required: false,
    });
    runtime.dispatch(Msg::UploadSubmitted);
    // Stand in for the server response; the real request to the discard
    // port fails later, when the workflow is already idle again.
    runtime.dispatch(Msg::UploadFinished(UploadOutcome::Completed {
        message: None,
    }));

    wait_for(&runtime, |view| view.notice.is_some());
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if runtime.try_recv_directive() == Some(UiDirective::CloseUploadDialog) {
            break;
        }
        assert!(Instant::now() < deadline, "directive never arrived");
        thread::sleep(Duration::from_millis(10));
    }
    runtime.dispatch(Msg::UploadDialogHidden);
    wait_for(&runtime, |view| view.polling == SchedulerState::Running);
}
