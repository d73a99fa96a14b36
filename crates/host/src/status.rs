use std::fmt;
use std::time::Duration;

/// Lifecycle state of the service as seen by the service manager.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ServiceState {
    /// Initializing; no controls accepted yet.
    StartPending,

    /// Initialized and running the worker loop.
    Running,

    /// A stop was requested and the worker loop is winding down.
    StopPending,

    /// Terminal.
    Stopped,
}

impl ServiceState {
    /// Whether the state is a transitional (pending) state that must report
    /// checkpoint progress.
    #[must_use]
    pub const fn is_transitional(self) -> bool {
        matches!(self, Self::StartPending | Self::StopPending)
    }

    /// Controls the service accepts while in this state.
    #[must_use]
    pub const fn controls_accepted(self) -> ControlsAccepted {
        match self {
            Self::StartPending | Self::Stopped => ControlsAccepted::NONE,
            Self::Running | Self::StopPending => ControlsAccepted::STOP,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StartPending => "start pending",
            Self::Running => "running",
            Self::StopPending => "stop pending",
            Self::Stopped => "stopped",
        };

        f.write_str(s)
    }
}

/// Set of control requests a service is willing to receive.
///
/// Interrogate is implicit and always accepted.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ControlsAccepted {
    stop: bool,
}

impl ControlsAccepted {
    /// No controls.
    pub const NONE: Self = Self { stop: false };

    /// Stop only.
    pub const STOP: Self = Self { stop: true };

    /// Set accepting stop requests if `stop` is true.
    #[must_use]
    pub const fn with_stop(stop: bool) -> Self {
        Self { stop }
    }

    /// Whether stop requests are accepted.
    #[must_use]
    pub const fn accepts_stop(self) -> bool {
        self.stop
    }
}

/// A status report published to the service manager.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusReport {
    /// Current state.
    pub state: ServiceState,

    /// Controls accepted in `state`.
    pub controls_accepted: ControlsAccepted,

    /// Exit code reported with the state; zero for success.
    pub exit_code: u32,

    /// How long the manager should wait before expecting the next report.
    pub wait_hint: Duration,

    /// Progress counter during transitional states, zero otherwise.
    pub checkpoint: u32,
}

impl StatusReport {
    /// Report for a state with no wait hint and a zero checkpoint.
    #[must_use]
    pub const fn settled(state: ServiceState) -> Self {
        Self {
            state,
            controls_accepted: state.controls_accepted(),
            exit_code: 0,
            wait_hint: Duration::ZERO,
            checkpoint: 0,
        }
    }
}

/// Status of a registry entry as returned by the registry.
pub type StatusSnapshot = StatusReport;
