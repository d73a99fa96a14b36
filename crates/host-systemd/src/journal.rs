use std::io::{self, Write};

use warden_host::{EventLog, Severity};

/// Event log writing `<priority>` prefixed lines to stderr, which journald
/// parses into record priorities.
#[derive(Clone, Copy, Debug, Default)]
pub struct JournalEventLog;

impl EventLog for JournalEventLog {
    fn emit(&self, source: &str, severity: Severity, message: &str) {
        let line = format_line(source, severity, message);

        // Fire-and-forget; a closed stderr has nowhere to report to.
        let _ = writeln!(io::stderr().lock(), "{line}");
    }
}

fn format_line(source: &str, severity: Severity, message: &str) -> String {
    let priority = match severity {
        Severity::Error => 3,
        Severity::Warning => 4,
        Severity::Information => 6,
    };

    format!("<{priority}>{source}: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("warden", Severity::Error, "Service initialization failed."),
            "<3>warden: Service initialization failed."
        );
        assert_eq!(
            format_line("warden", Severity::Warning, "slow"),
            "<4>warden: slow"
        );
        assert_eq!(
            format_line("warden", Severity::Information, "Service stopped."),
            "<6>warden: Service stopped."
        );
    }
}
