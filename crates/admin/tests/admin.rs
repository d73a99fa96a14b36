//! Registry administration against the in-memory registry.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use warden_admin::{Error, RegistryAdmin, StopPolicy, Uninstalled};
use warden_host::{
    ControlRegistrar, ControlRequest, HandlerOutcome, ServiceIdentity, ServiceState, StartType,
    StatusHandle, StatusReport,
};
use warden_host_mock::MockHost;

fn identity(name: &str) -> ServiceIdentity {
    ServiceIdentity::new(name, "Service One", std::env::current_exe().unwrap()).unwrap()
}

fn admin(host: &MockHost) -> RegistryAdmin<MockHost> {
    RegistryAdmin::new(host.clone()).with_policy(StopPolicy {
        poll_interval: Duration::from_secs(1),
        max_polls: 3,
    })
}

#[tokio::test(start_paused = true)]
async fn test_install_then_uninstall_restores_registry() {
    let host = MockHost::new();
    let admin = admin(&host);
    let before = host.entries();

    admin.install(&identity("svc1"), StartType::Auto).unwrap();

    let entry = host.entry("svc1").unwrap();
    assert_eq!(entry.start_type, StartType::Auto);
    assert_eq!(entry.identity.display_name(), "Service One");
    assert_eq!(entry.status.state, ServiceState::Stopped);

    let uninstalled = admin.uninstall(&identity("svc1")).await.unwrap();

    assert_eq!(
        uninstalled,
        Uninstalled {
            stopped_running_instance: false
        }
    );
    assert_eq!(host.entries(), before);
}

#[test]
fn test_install_existing_entry_fails() {
    let host = MockHost::new();
    let admin = admin(&host);

    admin.install(&identity("svc1"), StartType::Auto).unwrap();
    let before = host.entries();

    let err = admin
        .install(&identity("svc1"), StartType::Demand)
        .unwrap_err();

    assert_matches!(err, Error::CreateFailed { ref name, .. } if name == "svc1");
    assert!(err.is_already_exists());
    assert_eq!(host.entries(), before);
    assert!(host.events().is_empty());
}

#[test]
fn test_install_without_registry() {
    let host = MockHost::new();
    host.set_unavailable(true);

    assert_matches!(
        admin(&host).install(&identity("svc1"), StartType::Auto),
        Err(Error::RegistryUnavailable(_))
    );
}

#[tokio::test(start_paused = true)]
async fn test_uninstall_missing_entry() {
    let host = MockHost::new();

    assert_matches!(
        admin(&host).uninstall(&identity("svc1")).await,
        Err(Error::NotFound { .. })
    );
}

#[tokio::test(start_paused = true)]
async fn test_uninstall_stops_running_instance() {
    let host = MockHost::new();
    let admin = admin(&host);

    admin.install(&identity("svc1"), StartType::Auto).unwrap();
    host.simulate_running("svc1", Some(1));

    let uninstalled = admin.uninstall(&identity("svc1")).await.unwrap();

    assert!(uninstalled.stopped_running_instance);
    assert!(host.entry("svc1").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_uninstall_gives_up_on_hung_service() {
    let host = MockHost::new();
    let admin = admin(&host);

    admin.install(&identity("svc1"), StartType::Auto).unwrap();
    host.simulate_running("svc1", None);

    let started = tokio::time::Instant::now();
    let err = admin.uninstall(&identity("svc1")).await.unwrap_err();

    assert_matches!(
        err,
        Error::StopFailed {
            state: ServiceState::StopPending,
            ..
        }
    );
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert!(host.entry("svc1").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_uninstall_reports_delete_failure() {
    let host = MockHost::new();
    let admin = admin(&host);

    admin.install(&identity("svc1"), StartType::Auto).unwrap();
    host.set_fail_delete(true);

    assert_matches!(
        admin.uninstall(&identity("svc1")).await,
        Err(Error::DeleteFailed { .. })
    );
    assert!(host.entry("svc1").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_start_status_stop() {
    let host = MockHost::new();
    let admin = admin(&host);
    let svc1 = identity("svc1");

    admin.install(&svc1, StartType::Demand).unwrap();
    admin.start(&svc1, &[]).unwrap();

    assert_eq!(admin.status(&svc1).unwrap().state, ServiceState::Running);
    assert_matches!(admin.start(&svc1, &[]), Err(Error::StartFailed { .. }));

    assert!(admin.stop(&svc1).await.unwrap());
    assert_eq!(admin.status(&svc1).unwrap().state, ServiceState::Stopped);

    // a stopped service has nothing to stop
    assert!(!admin.stop(&svc1).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_uninstall_of_service_refusing_stop_fails() {
    let host = MockHost::new();
    let admin = admin(&host);
    admin.install(&identity("svc1"), StartType::Auto).unwrap();

    // a resident instance still starting up refuses every control
    let status = host
        .register_control_handler(
            "svc1",
            Arc::new(|_: ControlRequest| HandlerOutcome::NotImplemented),
        )
        .unwrap();
    status
        .set_status(&StatusReport::settled(ServiceState::StartPending))
        .unwrap();

    let err = admin.uninstall(&identity("svc1")).await.unwrap_err();

    assert_matches!(
        err,
        Error::StopFailed { ref name, state: ServiceState::StartPending } if name == "svc1"
    );
    assert!(host.entry("svc1").is_some());
}
