use crate::{ControlHandler, Result, StatusReport};

/// Service body handed to the dispatcher. Receives the arguments the
/// manager started the service with.
pub type ServiceMain = Box<dyn FnOnce(Vec<String>) + Send + 'static>;

/// Hands control of the process to the service manager.
pub trait ServiceDispatcher {
    /// Connect to the service manager and run `entry` once it asks the
    /// service to start. Blocks until the service has stopped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotUnderManager`] if the process was not
    /// launched by the service manager.
    fn dispatch_main(&self, name: &str, entry: ServiceMain) -> Result<()>;
}

/// Registers the control handler for a dispatched service.
pub trait ControlRegistrar: Send + Sync {
    /// Register `handler` for the service `name` and obtain the handle used
    /// to publish status reports.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RegistrationFailed`] if the manager rejects the
    /// registration.
    fn register_control_handler(
        &self,
        name: &str,
        handler: ControlHandler,
    ) -> Result<Box<dyn StatusHandle>>;
}

/// Channel through which status reports reach the service manager.
pub trait StatusHandle: Send + Sync {
    /// Publish `report`. Visible to the manager once this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager rejects the report.
    fn set_status(&self, report: &StatusReport) -> Result<()>;
}
