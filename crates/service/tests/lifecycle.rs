//! End-to-end lifecycle runs against the in-memory host.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::{Instant, sleep, timeout};
use warden_host::{ControlRequest, HandlerOutcome, ServiceIdentity, ServiceState, Severity};
use warden_host_mock::MockHost;
use warden_service::{
    BoxError, CancellationSignal, EventReporter, IdleWork, LifecycleCoordinator, Outcome,
    ServiceOptions, Work,
};

const POLL: Duration = Duration::from_millis(20);

fn options(name: &str) -> ServiceOptions {
    let identity = ServiceIdentity::new(name, "", std::env::current_exe().unwrap()).unwrap();

    ServiceOptions::new(identity).with_poll_interval(POLL)
}

fn coordinator<W: Work>(host: &MockHost, name: &str, work: W) -> LifecycleCoordinator<W> {
    let events = EventReporter::new(Arc::new(host.clone()), name);

    LifecycleCoordinator::new(options(name), events, work)
}

async fn wait_for_state(host: &MockHost, name: &str, state: ServiceState) {
    timeout(Duration::from_secs(5), async {
        while host.last_state(name) != Some(state) {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("{name} never reached {state}"));
}

async fn deliver(host: &MockHost, name: &str, request: ControlRequest) -> Option<HandlerOutcome> {
    let host = host.clone();
    let name = name.to_string();

    // the manager calls handlers from its own thread
    tokio::task::spawn_blocking(move || host.deliver(&name, request))
        .await
        .unwrap()
}

fn states(host: &MockHost, name: &str) -> Vec<(ServiceState, u32)> {
    host.reports(name)
        .into_iter()
        .map(|report| (report.state, report.checkpoint))
        .collect()
}

fn messages(host: &MockHost) -> Vec<(Severity, String)> {
    host.events()
        .into_iter()
        .map(|event| (event.record.severity, event.record.message))
        .collect()
}

struct FailingInit;

#[async_trait]
impl Work for FailingInit {
    async fn initialize(&mut self) -> Result<(), BoxError> {
        Err("no resources".into())
    }

    async fn run_once(&mut self, _signal: &CancellationSignal) -> Result<(), BoxError> {
        unreachable!("work must not run after a failed initialization")
    }
}

struct GatedInit {
    gate: Arc<Notify>,
}

#[async_trait]
impl Work for GatedInit {
    async fn initialize(&mut self) -> Result<(), BoxError> {
        self.gate.notified().await;
        Ok(())
    }

    async fn run_once(&mut self, _signal: &CancellationSignal) -> Result<(), BoxError> {
        sleep(POLL).await;
        Ok(())
    }
}

struct GatedUnit {
    gate: Arc<Notify>,
}

#[async_trait]
impl Work for GatedUnit {
    async fn run_once(&mut self, _signal: &CancellationSignal) -> Result<(), BoxError> {
        self.gate.notified().await;
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_run_stop() {
    let host = MockHost::new();
    let service = coordinator(&host, "svc1", IdleWork::new(POLL));

    let task = tokio::spawn({
        let host = host.clone();
        async move { service.run(&host).await }
    });

    wait_for_state(&host, "svc1", ServiceState::Running).await;
    assert!(host.has_handler("svc1"));
    assert_eq!(
        states(&host, "svc1"),
        vec![(ServiceState::StartPending, 1), (ServiceState::Running, 0)]
    );

    let stop_requested = Instant::now();
    assert_eq!(
        deliver(&host, "svc1", ControlRequest::Stop).await,
        Some(HandlerOutcome::Handled)
    );

    let outcome = task.await.unwrap().unwrap();
    assert!(stop_requested.elapsed() < Duration::from_secs(1));
    assert!(matches!(outcome, Outcome::Stopped { .. }));

    assert_eq!(
        states(&host, "svc1"),
        vec![
            (ServiceState::StartPending, 1),
            (ServiceState::Running, 0),
            (ServiceState::StopPending, 1),
            (ServiceState::StopPending, 1),
            (ServiceState::Stopped, 0),
        ]
    );

    let reports = host.reports("svc1");
    assert_eq!(reports[2], reports[3]);
    assert!(reports[2].wait_hint >= POLL);

    assert_eq!(
        messages(&host),
        vec![
            (
                Severity::Information,
                "Service initialized successfully.".to_string()
            ),
            (Severity::Information, "Service stopped.".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_registration_failure_publishes_nothing() {
    let host = MockHost::new();
    host.set_reject_registration(true);

    let outcome = coordinator(&host, "svc1", IdleWork::new(POLL))
        .run(&host)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::RegistrationFailed);
    assert!(!host.has_handler("svc1"));
    assert!(host.reports("svc1").is_empty());
    assert_eq!(
        messages(&host),
        vec![(
            Severity::Error,
            "Service control handler registration failed.".to_string()
        )]
    );
}

#[tokio::test]
async fn test_init_failure_skips_stop_pending() {
    let host = MockHost::new();

    let outcome = coordinator(&host, "svc1", FailingInit)
        .run(&host)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::InitFailed);
    assert_eq!(
        states(&host, "svc1"),
        vec![(ServiceState::StartPending, 1), (ServiceState::Stopped, 0)]
    );
    assert_eq!(
        messages(&host),
        vec![(Severity::Error, "Service initialization failed.".to_string())]
    );

    // stopped services accept nothing
    assert_eq!(
        host.deliver("svc1", ControlRequest::Stop),
        Some(HandlerOutcome::NotImplemented)
    );
    assert_eq!(host.reports("svc1").len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_pending_refuses_stop_and_answers_interrogate() {
    let host = MockHost::new();
    let gate = Arc::new(Notify::new());
    let service = coordinator(&host, "svc1", GatedInit { gate: gate.clone() });

    let task = tokio::spawn({
        let host = host.clone();
        async move { service.run(&host).await }
    });

    wait_for_state(&host, "svc1", ServiceState::StartPending).await;

    assert_eq!(
        deliver(&host, "svc1", ControlRequest::Stop).await,
        Some(HandlerOutcome::NotImplemented)
    );
    assert_eq!(
        deliver(&host, "svc1", ControlRequest::Interrogate).await,
        Some(HandlerOutcome::Handled)
    );

    let reports = host.reports("svc1");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0], reports[1]);
    assert_eq!(reports[1].state, ServiceState::StartPending);

    gate.notify_one();
    wait_for_state(&host, "svc1", ServiceState::Running).await;

    deliver(&host, "svc1", ControlRequest::Stop).await;
    task.await.unwrap().unwrap();

    assert_eq!(host.last_state("svc1"), Some(ServiceState::Stopped));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interrogate_while_running_republishes() {
    let host = MockHost::new();
    let service = coordinator(&host, "svc1", IdleWork::new(POLL));

    let task = tokio::spawn({
        let host = host.clone();
        async move { service.run(&host).await }
    });

    wait_for_state(&host, "svc1", ServiceState::Running).await;

    deliver(&host, "svc1", ControlRequest::Interrogate).await;
    assert_eq!(
        deliver(&host, "svc1", ControlRequest::Other(128)).await,
        Some(HandlerOutcome::NotImplemented)
    );

    let reports = host.reports("svc1");
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[1], reports[2]);

    deliver(&host, "svc1", ControlRequest::Stop).await;
    task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_stop_is_idempotent() {
    let host = MockHost::new();
    let gate = Arc::new(Notify::new());
    let service = coordinator(&host, "svc1", GatedUnit { gate: gate.clone() });

    let task = tokio::spawn({
        let host = host.clone();
        async move { service.run(&host).await }
    });

    wait_for_state(&host, "svc1", ServiceState::Running).await;

    assert_eq!(
        deliver(&host, "svc1", ControlRequest::Stop).await,
        Some(HandlerOutcome::Handled)
    );
    assert_eq!(
        deliver(&host, "svc1", ControlRequest::Stop).await,
        Some(HandlerOutcome::Handled)
    );
    assert_eq!(
        deliver(&host, "svc1", ControlRequest::Interrogate).await,
        Some(HandlerOutcome::Handled)
    );

    let reports = host.reports("svc1");
    assert_eq!(reports.last(), reports.get(reports.len() - 2));
    assert_eq!(host.last_state("svc1"), Some(ServiceState::StopPending));

    // the unit in flight finishes before the stop is observed
    gate.notify_one();

    let outcome = task.await.unwrap().unwrap();
    assert!(matches!(outcome, Outcome::Stopped { iterations } if iterations <= 1));

    assert_eq!(
        states(&host, "svc1"),
        vec![
            (ServiceState::StartPending, 1),
            (ServiceState::Running, 0),
            (ServiceState::StopPending, 1),
            (ServiceState::StopPending, 1),
            (ServiceState::StopPending, 1),
            (ServiceState::StopPending, 1),
            (ServiceState::Stopped, 0),
        ]
    );
}

#[tokio::test]
async fn test_rejected_running_report_still_publishes_stopped() {
    let host = MockHost::new();
    host.set_reject_status(Some(ServiceState::Running));

    let result = coordinator(&host, "svc1", IdleWork::new(POLL))
        .run(&host)
        .await;

    assert!(result.is_err());
    assert_eq!(
        states(&host, "svc1"),
        vec![(ServiceState::StartPending, 1), (ServiceState::Stopped, 0)]
    );
}

#[tokio::test]
async fn test_rejected_start_pending_report_still_publishes_stopped() {
    let host = MockHost::new();
    host.set_reject_status(Some(ServiceState::StartPending));

    let result = coordinator(&host, "svc1", IdleWork::new(POLL))
        .run(&host)
        .await;

    assert!(result.is_err());
    assert_eq!(states(&host, "svc1"), vec![(ServiceState::Stopped, 0)]);
    assert!(host.events().is_empty());
}
