use std::sync::Arc;

/// A control request delivered by the service manager.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlRequest {
    /// Ask the service to stop.
    Stop,

    /// Ask the service to report its current status.
    Interrogate,

    /// Any other host-specific control code.
    Other(u32),
}

/// What the handler tells the host about a control request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandlerOutcome {
    /// The request was handled.
    Handled,

    /// The request is not supported in the current state.
    NotImplemented,
}

/// Callback invoked by the host, on the host's own thread, for every control
/// request addressed to the service.
///
/// Must return promptly.
pub type ControlHandler = Arc<dyn Fn(ControlRequest) -> HandlerOutcome + Send + Sync>;
