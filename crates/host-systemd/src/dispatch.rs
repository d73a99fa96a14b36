use std::env;
use std::thread;

use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};
use signal_hook::iterator::{Handle, Signals};
use tracing::{debug, error, warn};
use warden_host::{
    ControlHandler, ControlRegistrar, ControlRequest, Error, HandlerOutcome, Result,
    ServiceDispatcher, ServiceMain, StatusHandle, StatusReport,
};

use crate::notify::{self, NotifySocket};

/// Exit code when the process was not launched by systemd.
pub const NOT_UNDER_MANAGER_CODE: i32 = 1;

/// Resident side of the systemd backend.
///
/// Control requests arrive as signals: `SIGTERM` and `SIGINT` request a stop,
/// `SIGUSR1` requests an interrogate. Status reports go out over `sd_notify`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemdHost;

impl ServiceDispatcher for SystemdHost {
    fn dispatch_main(&self, name: &str, entry: ServiceMain) -> Result<()> {
        if env::var_os("NOTIFY_SOCKET").is_none() && env::var_os("INVOCATION_ID").is_none() {
            return Err(Error::NotUnderManager(NOT_UNDER_MANAGER_CODE));
        }

        let args = vec![name.to_string()];

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || entry(args))
            .map_err(|e| Error::Io("failed to spawn service thread", e))?
            .join()
            .map_err(|_| Error::RegistrationFailed(name.to_string()))
    }
}

impl ControlRegistrar for SystemdHost {
    fn register_control_handler(
        &self,
        name: &str,
        handler: ControlHandler,
    ) -> Result<Box<dyn StatusHandle>> {
        let notify = NotifySocket::from_env().map_err(|e| {
            error!("invalid NOTIFY_SOCKET: {e}");
            Error::RegistrationFailed(name.to_string())
        })?;

        let mut signals = Signals::new([SIGTERM, SIGINT, SIGUSR1]).map_err(|e| {
            error!("failed to install signal handlers: {e}");
            Error::RegistrationFailed(name.to_string())
        })?;
        let signals_handle = signals.handle();

        let service = name.to_string();
        thread::Builder::new()
            .name(format!("{name}-control"))
            .spawn(move || {
                for signal in signals.forever() {
                    let request = control_request(signal);
                    if handler(request) == HandlerOutcome::NotImplemented {
                        warn!("{service} ignored {request:?} (signal {signal})");
                    }
                }
            })
            .map_err(|e| Error::Io("failed to spawn control thread", e))?;

        Ok(Box::new(NotifyStatusHandle {
            notify,
            signals: signals_handle,
        }))
    }
}

fn control_request(signal: i32) -> ControlRequest {
    match signal {
        SIGTERM | SIGINT => ControlRequest::Stop,
        SIGUSR1 => ControlRequest::Interrogate,
        other => ControlRequest::Other(u32::try_from(other).unwrap_or_default()),
    }
}

struct NotifyStatusHandle {
    notify: Option<NotifySocket>,
    signals: Handle,
}

impl StatusHandle for NotifyStatusHandle {
    fn set_status(&self, report: &StatusReport) -> Result<()> {
        let message = notify::message(report);

        let Some(socket) = &self.notify else {
            debug!("no NOTIFY_SOCKET, dropping status: {message:?}");
            return Ok(());
        };

        socket
            .notify(&message)
            .map_err(|e| Error::Io("failed to notify systemd", e))
    }
}

impl Drop for NotifyStatusHandle {
    fn drop(&mut self) {
        self.signals.close();
    }
}
