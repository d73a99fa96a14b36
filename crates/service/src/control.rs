use std::sync::Arc;

use tracing::{debug, error, info};
use warden_host::{ControlHandler, ControlRequest, HandlerOutcome, ServiceState};

use crate::ServiceContext;

/// Translates control requests from the service manager into state
/// transitions and cancellation.
///
/// Runs on the host's thread. Its only side effects are setting the
/// cancellation signal and publishing status.
#[derive(Clone)]
pub struct ControlChannel {
    context: Arc<ServiceContext>,
}

impl ControlChannel {
    /// Create a channel over the shared context.
    #[must_use]
    pub const fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }

    /// Wrap the channel in the callback form the host registers.
    #[must_use]
    pub fn into_handler(self) -> ControlHandler {
        Arc::new(move |request| self.handle(request))
    }

    /// Handle one control request.
    pub fn handle(&self, request: ControlRequest) -> HandlerOutcome {
        match request {
            ControlRequest::Stop => self.stop(),
            ControlRequest::Interrogate => self.interrogate(),
            ControlRequest::Other(code) => {
                debug!(code, "ignoring unsupported control request");
                HandlerOutcome::NotImplemented
            }
        }
    }

    fn stop(&self) -> HandlerOutcome {
        let status = self.context.status();
        let signal = self.context.signal();

        match status.state() {
            Some(ServiceState::Running) => {
                info!(service = self.context.identity().name(), "stop requested");

                if let Err(e) = status.publish(
                    ServiceState::StopPending,
                    0,
                    self.context.stop_wait_hint(),
                ) {
                    error!("failed to publish stop pending: {e}");
                }

                signal.set();
                self.echo();

                HandlerOutcome::Handled
            }
            Some(ServiceState::StopPending) => {
                debug!(
                    service = self.context.identity().name(),
                    "stop already in progress"
                );

                signal.set();
                self.echo();

                HandlerOutcome::Handled
            }
            state => {
                debug!(?state, "stop not accepted in current state");
                HandlerOutcome::NotImplemented
            }
        }
    }

    fn interrogate(&self) -> HandlerOutcome {
        match self.context.status().republish() {
            Ok(Some(_)) => HandlerOutcome::Handled,
            Ok(None) => HandlerOutcome::NotImplemented,
            Err(e) => {
                error!("failed to answer interrogate: {e}");
                HandlerOutcome::Handled
            }
        }
    }

    fn echo(&self) {
        if let Err(e) = self.context.status().republish() {
            error!("failed to acknowledge stop request: {e}");
        }
    }
}
