//! In-memory host for tests and local development.
//!
//! [`MockHost`] plays every host role at once: service registry, event log,
//! control registrar and dispatcher. Clones share state, so a test can hand
//! one clone to the code under test and inspect another.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod registry;

pub use registry::{MockEntry, MockManager};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tracing::debug;
use warden_host::{
    ControlHandler, ControlRegistrar, ControlRequest, Error, EventLog, EventRecord,
    HandlerOutcome, Result, ServiceDispatcher, ServiceIdentity, ServiceMain, ServiceState,
    Severity, StartType, StatusHandle, StatusReport, StatusSnapshot,
};

/// Code returned by [`MockHost::dispatch_main`] outside of a managed launch.
pub const NOT_UNDER_MANAGER_CODE: i32 = 1063;

/// An event captured by the mock event log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoggedEvent {
    /// Source the event was emitted under.
    pub source: String,

    /// The event itself.
    pub record: EventRecord,
}

/// A registry entry held by the mock registry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MockEntryState {
    /// Identity the entry was created with.
    pub identity: ServiceIdentity,

    /// Configured start type.
    pub start_type: StartType,

    /// Last status known to the registry.
    pub status: StatusSnapshot,

    /// Status queries left before a simulated stop completes. `None` never completes.
    pub stop_polls: Option<u32>,
}

#[derive(Default)]
struct Inner {
    entries: BTreeMap<String, MockEntryState>,
    events: Vec<LoggedEvent>,
    fail_delete: bool,
    handlers: HashMap<String, ControlHandler>,
    not_under_manager: bool,
    reject_registration: bool,
    reject_status: Option<ServiceState>,
    reports: HashMap<String, Vec<StatusReport>>,
    unavailable: bool,
}

/// Shared in-memory host.
#[derive(Clone, Default)]
pub struct MockHost {
    inner: Arc<Mutex<Inner>>,
}

impl MockHost {
    /// Create an empty host that behaves as if the process was launched by
    /// its service manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`warden_host::ServiceRegistry::open_manager`] fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    /// Make [`ServiceDispatcher::dispatch_main`] report a foreground launch.
    pub fn set_not_under_manager(&self, not_under_manager: bool) {
        self.inner.lock().not_under_manager = not_under_manager;
    }

    /// Make control handler registration fail.
    pub fn set_reject_registration(&self, reject: bool) {
        self.inner.lock().reject_registration = reject;
    }

    /// Make the manager reject status reports for `state`.
    pub fn set_reject_status(&self, state: Option<ServiceState>) {
        self.inner.lock().reject_status = state;
    }

    /// Make entry deletion fail.
    pub fn set_fail_delete(&self, fail: bool) {
        self.inner.lock().fail_delete = fail;
    }

    /// Mark an existing entry as running without an in-process handler.
    ///
    /// After a stop request, the entry reports `StopPending` for `stop_polls`
    /// status queries before reaching `Stopped`, or forever if `None`.
    pub fn simulate_running(&self, name: &str, stop_polls: Option<u32>) {
        if let Some(entry) = self.inner.lock().entries.get_mut(name) {
            entry.status = StatusReport::settled(ServiceState::Running);
            entry.stop_polls = stop_polls;
        }
    }

    /// Snapshot of a registry entry.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<MockEntryState> {
        self.inner.lock().entries.get(name).cloned()
    }

    /// Snapshot of every registry entry, keyed by name.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, MockEntryState> {
        self.inner.lock().entries.clone()
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.inner.lock().events.clone()
    }

    /// Status reports published by the service `name`, oldest first.
    #[must_use]
    pub fn reports(&self, name: &str) -> Vec<StatusReport> {
        self.inner
            .lock()
            .reports
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Most recent state published by the service `name`.
    #[must_use]
    pub fn last_state(&self, name: &str) -> Option<ServiceState> {
        self.inner
            .lock()
            .reports
            .get(name)
            .and_then(|reports| reports.last())
            .map(|report| report.state)
    }

    /// Whether a control handler is registered for `name`.
    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.inner.lock().handlers.contains_key(name)
    }

    /// Deliver a control request to the handler registered for `name`, the way
    /// the service manager would from its own thread.
    ///
    /// Returns `None` if no handler is registered.
    pub fn deliver(&self, name: &str, request: ControlRequest) -> Option<HandlerOutcome> {
        // the handler publishes through this host, so the lock must be released first
        let handler = self.inner.lock().handlers.get(name).cloned()?;
        debug!(service = name, ?request, "delivering control request");

        Some(handler(request))
    }

    fn record_status(&self, name: &str, report: StatusReport) {
        let mut inner = self.inner.lock();

        inner
            .reports
            .entry(name.to_string())
            .or_default()
            .push(report);

        if let Some(entry) = inner.entries.get_mut(name) {
            entry.status = report;
        }
    }
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Formatting may happen while a test holds the lock.
        let Some(inner) = self.inner.try_lock() else {
            return f.debug_struct("MockHost").finish_non_exhaustive();
        };

        f.debug_struct("MockHost")
            .field("entries", &inner.entries.keys().collect::<Vec<_>>())
            .field("handlers", &inner.handlers.keys().collect::<Vec<_>>())
            .field("unavailable", &inner.unavailable)
            .finish_non_exhaustive()
    }
}

impl EventLog for MockHost {
    fn emit(&self, source: &str, severity: Severity, message: &str) {
        self.inner.lock().events.push(LoggedEvent {
            source: source.to_string(),
            record: EventRecord::new(severity, message),
        });
    }
}

impl ControlRegistrar for MockHost {
    fn register_control_handler(
        &self,
        name: &str,
        handler: ControlHandler,
    ) -> Result<Box<dyn StatusHandle>> {
        let mut inner = self.inner.lock();

        if inner.reject_registration {
            return Err(Error::RegistrationFailed(name.to_string()));
        }

        inner.handlers.insert(name.to_string(), handler);

        Ok(Box::new(MockStatusHandle {
            host: self.clone(),
            name: name.to_string(),
        }))
    }
}

impl ServiceDispatcher for MockHost {
    fn dispatch_main(&self, name: &str, entry: ServiceMain) -> Result<()> {
        if self.inner.lock().not_under_manager {
            return Err(Error::NotUnderManager(NOT_UNDER_MANAGER_CODE));
        }

        let args = vec![name.to_string()];

        // the real dispatchers run the service body on a thread of their own
        thread::Builder::new()
            .name(format!("{name}-main"))
            .spawn(move || entry(args))
            .map_err(|e| Error::Io("failed to spawn service thread", e))?
            .join()
            .map_err(|_| Error::Io("service main panicked", io::Error::other(name.to_string())))
    }
}

struct MockStatusHandle {
    host: MockHost,
    name: String,
}

impl StatusHandle for MockStatusHandle {
    fn set_status(&self, report: &StatusReport) -> Result<()> {
        if self.host.inner.lock().reject_status == Some(report.state) {
            return Err(Error::Io(
                "status report rejected",
                io::Error::other(report.state.to_string()),
            ));
        }

        self.host.record_status(&self.name, *report);

        Ok(())
    }
}
