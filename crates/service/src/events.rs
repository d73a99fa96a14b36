use std::sync::Arc;

use tracing::{error, info, warn};
use warden_host::{EventLog, EventRecord, Severity};

/// Forwards events to the host event log under the service's source name,
/// mirroring each one into the tracing output.
#[derive(Clone)]
pub struct EventReporter {
    log: Arc<dyn EventLog>,
    source: String,
}

impl EventReporter {
    /// Create a reporter for `source`.
    pub fn new(log: Arc<dyn EventLog>, source: impl Into<String>) -> Self {
        Self {
            log,
            source: source.into(),
        }
    }

    /// Forward `record` to the event log.
    pub fn report(&self, record: &EventRecord) {
        match record.severity {
            Severity::Information => info!(source = %self.source, "{}", record.message),
            Severity::Warning => warn!(source = %self.source, "{}", record.message),
            Severity::Error => error!(source = %self.source, "{}", record.message),
        }

        self.log
            .emit(&self.source, record.severity, &record.message);
    }

    /// Report an informational event.
    pub fn info(&self, message: impl Into<String>) {
        self.report(&EventRecord::new(Severity::Information, message));
    }

    /// Report a warning.
    pub fn warning(&self, message: impl Into<String>) {
        self.report(&EventRecord::new(Severity::Warning, message));
    }

    /// Report an error.
    pub fn error(&self, message: impl Into<String>) {
        self.report(&EventRecord::new(Severity::Error, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use warden_host_mock::MockHost;

    #[traced_test]
    #[test]
    fn test_events_reach_log_and_tracing() {
        let host = MockHost::new();
        let reporter = EventReporter::new(Arc::new(host.clone()), "svc1");

        reporter.error("Service initialization failed.");

        let events = host.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, "svc1");
        assert_eq!(events[0].record.severity, Severity::Error);
        assert_eq!(events[0].record.message, "Service initialization failed.");
        assert!(logs_contain("Service initialization failed."));
    }
}
