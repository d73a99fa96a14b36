//! Foreground host: Ctrl-C stands in for the service manager's stop request.

use tokio::runtime::Handle;
use tracing::{info, warn};
use warden_host::{
    ControlHandler, ControlRegistrar, ControlRequest, Error, EventLog, HandlerOutcome, Result,
    Severity, StatusHandle, StatusReport,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleHost;

impl ControlRegistrar for ConsoleHost {
    fn register_control_handler(
        &self,
        name: &str,
        handler: ControlHandler,
    ) -> Result<Box<dyn StatusHandle>> {
        let runtime =
            Handle::try_current().map_err(|_| Error::RegistrationFailed(name.to_string()))?;

        runtime.spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if handler(ControlRequest::Stop) == HandlerOutcome::NotImplemented {
                    warn!("not ready to stop yet");
                }
            }
        });

        Ok(Box::new(ConsoleStatus {
            service: name.to_string(),
        }))
    }
}

impl EventLog for ConsoleHost {
    fn emit(&self, source: &str, severity: Severity, message: &str) {
        println!("[{severity}] {source}: {message}");
    }
}

struct ConsoleStatus {
    service: String,
}

impl StatusHandle for ConsoleStatus {
    fn set_status(&self, report: &StatusReport) -> Result<()> {
        info!(
            service = %self.service,
            state = %report.state,
            checkpoint = report.checkpoint,
            wait_hint = ?report.wait_hint,
            "status"
        );

        Ok(())
    }
}
