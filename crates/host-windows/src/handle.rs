use std::ffi::OsStr;
use std::io;
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::time::Duration;

use warden_host::{ControlsAccepted, Error, ServiceState, StatusReport, StatusSnapshot};
use windows_sys::Win32::Foundation::{
    ERROR_FAILED_SERVICE_CONTROLLER_CONNECT, ERROR_INVALID_SERVICE_CONTROL,
    ERROR_SERVICE_ALREADY_RUNNING, ERROR_SERVICE_CANNOT_ACCEPT_CTRL,
    ERROR_SERVICE_DOES_NOT_EXIST, ERROR_SERVICE_EXISTS, ERROR_SERVICE_MARKED_FOR_DELETE,
    ERROR_SERVICE_NOT_ACTIVE,
};
use windows_sys::Win32::System::Services::{
    CloseServiceHandle, SC_HANDLE, SERVICE_ACCEPT_STOP, SERVICE_CONTINUE_PENDING,
    SERVICE_PAUSE_PENDING, SERVICE_PAUSED, SERVICE_RUNNING, SERVICE_START_PENDING,
    SERVICE_STATUS, SERVICE_STOP_PENDING, SERVICE_STOPPED, SERVICE_WIN32_OWN_PROCESS,
};

/// Owned SCM handle, closed on drop.
#[derive(Debug)]
pub struct ScHandle(SC_HANDLE);

// SAFETY: SCM handles are not tied to the thread that opened them.
unsafe impl Send for ScHandle {}
// SAFETY: every use passes the handle by value to thread-safe SCM calls.
unsafe impl Sync for ScHandle {}

impl ScHandle {
    /// Wrap a handle returned by an SCM call, turning null into the last OS error.
    pub fn new(raw: SC_HANDLE) -> io::Result<Self> {
        if raw.is_null() {
            Err(io::Error::last_os_error())
        } else {
            Ok(Self(raw))
        }
    }

    pub const fn raw(&self) -> SC_HANDLE {
        self.0
    }
}

impl Drop for ScHandle {
    fn drop(&mut self) {
        // SAFETY: the handle is valid and owned by this value.
        unsafe {
            CloseServiceHandle(self.0);
        }
    }
}

/// Null-terminated UTF-16 copy of `s`.
pub fn wide(s: impl AsRef<OsStr>) -> Vec<u16> {
    s.as_ref().encode_wide().chain(iter::once(0)).collect()
}

fn os_code(e: &io::Error) -> u32 {
    #[allow(clippy::cast_sign_loss)]
    e.raw_os_error().map_or(0, |code| code as u32)
}

/// Translate an SCM failure into a host error.
pub fn scm_error(what: &'static str, name: &str, e: io::Error) -> Error {
    match os_code(&e) {
        ERROR_SERVICE_EXISTS => Error::AlreadyExists(name.to_string()),
        ERROR_SERVICE_DOES_NOT_EXIST | ERROR_SERVICE_MARKED_FOR_DELETE => {
            Error::NotFound(name.to_string())
        }
        ERROR_SERVICE_NOT_ACTIVE => Error::NotActive(name.to_string()),
        ERROR_SERVICE_ALREADY_RUNNING => Error::AlreadyRunning(name.to_string()),
        ERROR_INVALID_SERVICE_CONTROL | ERROR_SERVICE_CANNOT_ACCEPT_CTRL => {
            Error::ControlRejected(name.to_string())
        }
        #[allow(clippy::cast_possible_wrap)]
        ERROR_FAILED_SERVICE_CONTROLLER_CONNECT => {
            Error::NotUnderManager(ERROR_FAILED_SERVICE_CONTROLLER_CONNECT as i32)
        }
        _ => Error::Io(what, e),
    }
}

/// Snapshot of a `SERVICE_STATUS` returned by the SCM.
pub fn snapshot(status: &SERVICE_STATUS) -> warden_host::Result<StatusSnapshot> {
    let state = match status.dwCurrentState {
        SERVICE_START_PENDING | SERVICE_CONTINUE_PENDING => ServiceState::StartPending,
        SERVICE_RUNNING | SERVICE_PAUSE_PENDING | SERVICE_PAUSED => ServiceState::Running,
        SERVICE_STOP_PENDING => ServiceState::StopPending,
        SERVICE_STOPPED => ServiceState::Stopped,
        other => return Err(Error::UnknownState(other.to_string())),
    };

    Ok(StatusReport {
        state,
        controls_accepted: ControlsAccepted::with_stop(
            status.dwControlsAccepted & SERVICE_ACCEPT_STOP != 0,
        ),
        exit_code: status.dwWin32ExitCode,
        wait_hint: Duration::from_millis(u64::from(status.dwWaitHint)),
        checkpoint: status.dwCheckPoint,
    })
}

/// `SERVICE_STATUS` announcing `report` for an own-process service.
pub fn service_status(report: &StatusReport) -> SERVICE_STATUS {
    let current_state = match report.state {
        ServiceState::StartPending => SERVICE_START_PENDING,
        ServiceState::Running => SERVICE_RUNNING,
        ServiceState::StopPending => SERVICE_STOP_PENDING,
        ServiceState::Stopped => SERVICE_STOPPED,
    };

    SERVICE_STATUS {
        dwServiceType: SERVICE_WIN32_OWN_PROCESS,
        dwCurrentState: current_state,
        dwControlsAccepted: if report.controls_accepted.accepts_stop() {
            SERVICE_ACCEPT_STOP
        } else {
            0
        },
        dwWin32ExitCode: report.exit_code,
        dwServiceSpecificExitCode: 0,
        dwCheckPoint: report.checkpoint,
        dwWaitHint: u32::try_from(report.wait_hint.as_millis()).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_is_terminated() {
        assert_eq!(wide("ab"), vec![u16::from(b'a'), u16::from(b'b'), 0]);
    }

    #[test]
    fn test_status_conversion() {
        let report = StatusReport {
            wait_hint: Duration::from_secs(2),
            checkpoint: 3,
            ..StatusReport::settled(ServiceState::StopPending)
        };

        let status = service_status(&report);
        assert_eq!(status.dwCurrentState, SERVICE_STOP_PENDING);
        assert_eq!(status.dwControlsAccepted, SERVICE_ACCEPT_STOP);
        assert_eq!(status.dwWaitHint, 2000);

        assert_eq!(snapshot(&status).unwrap(), report);
    }

    #[test]
    fn test_snapshot_reads_accepted_controls() {
        let mut status = service_status(&StatusReport::settled(ServiceState::Running));
        assert!(snapshot(&status).unwrap().controls_accepted.accepts_stop());

        status.dwControlsAccepted = 0;
        assert_eq!(
            snapshot(&status).unwrap().controls_accepted,
            ControlsAccepted::NONE
        );
    }

    #[test]
    fn test_scm_error_mapping() {
        #[allow(clippy::cast_possible_wrap)]
        let exists = io::Error::from_raw_os_error(ERROR_SERVICE_EXISTS as i32);
        assert!(matches!(
            scm_error("create", "svc1", exists),
            Error::AlreadyExists(name) if name == "svc1"
        ));
    }
}
