use std::time::Duration;

use warden_host::{ControlsAccepted, ServiceState, StatusReport};

#[test]
fn test_backend_builds_report_from_raw_status() {
    let report = StatusReport {
        state: ServiceState::StopPending,
        controls_accepted: ControlsAccepted::with_stop(true),
        exit_code: 0,
        wait_hint: Duration::from_secs(2),
        checkpoint: 4,
    };

    assert!(report.controls_accepted.accepts_stop());
    assert_eq!(
        report.controls_accepted,
        ServiceState::StopPending.controls_accepted()
    );
}

#[test]
fn test_settled_report_has_no_progress() {
    let report = StatusReport::settled(ServiceState::Stopped);

    assert_eq!(report.controls_accepted, ControlsAccepted::with_stop(false));
    assert_eq!(report.checkpoint, 0);
    assert_eq!(report.wait_hint, Duration::ZERO);
}
