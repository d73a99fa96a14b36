use std::fmt;

/// Severity of an event log entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Severity {
    /// Informational.
    Information,

    /// Warning.
    Warning,

    /// Error.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Error => "error",
        };

        f.write_str(s)
    }
}

/// A single diagnostic event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    /// Event text.
    pub message: String,

    /// Event severity.
    pub severity: Severity,
}

impl EventRecord {
    /// Create a new record.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// Write-only sink for diagnostic events.
///
/// Emission is fire-and-forget: implementations swallow their own failures.
pub trait EventLog: Send + Sync {
    /// Append an event under the given source name.
    fn emit(&self, source: &str, severity: Severity, message: &str);
}
