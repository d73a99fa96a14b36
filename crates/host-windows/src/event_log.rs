use std::io;
use std::ptr;

use tracing::warn;
use warden_host::{EventLog, Severity};
use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::System::EventLog::{
    DeregisterEventSource, EVENTLOG_ERROR_TYPE, EVENTLOG_INFORMATION_TYPE,
    EVENTLOG_WARNING_TYPE, RegisterEventSourceW, ReportEventW,
};

use crate::handle::wide;

/// Event log writing to the Windows Application log.
#[derive(Debug)]
pub struct WindowsEventLog {
    handle: HANDLE,
    source: String,
}

// SAFETY: event source handles may be used from any thread.
unsafe impl Send for WindowsEventLog {}
// SAFETY: ReportEventW is thread-safe.
unsafe impl Sync for WindowsEventLog {}

impl WindowsEventLog {
    /// Register `source` with the local event log.
    ///
    /// # Errors
    ///
    /// Returns an error if the event source cannot be registered.
    pub fn register(source: &str) -> io::Result<Self> {
        let wide_source = wide(source);

        // SAFETY: a null server name selects the local machine.
        let handle = unsafe { RegisterEventSourceW(ptr::null(), wide_source.as_ptr()) };

        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            handle,
            source: source.to_string(),
        })
    }
}

impl EventLog for WindowsEventLog {
    fn emit(&self, source: &str, severity: Severity, message: &str) {
        if source != self.source {
            warn!("event for {source} written under {}", self.source);
        }

        let kind = match severity {
            Severity::Error => EVENTLOG_ERROR_TYPE,
            Severity::Warning => EVENTLOG_WARNING_TYPE,
            Severity::Information => EVENTLOG_INFORMATION_TYPE,
        };

        let text = wide(message);
        let strings = [text.as_ptr()];

        // SAFETY: one null terminated string, kept alive by text.
        let ok = unsafe {
            ReportEventW(
                self.handle,
                kind,
                0,
                0,
                ptr::null_mut(),
                1,
                0,
                strings.as_ptr(),
                ptr::null(),
            )
        };

        if ok == 0 {
            warn!("ReportEventW failed: {}", io::Error::last_os_error());
        }
    }
}

impl Drop for WindowsEventLog {
    fn drop(&mut self) {
        // SAFETY: the handle came from RegisterEventSourceW and is owned here.
        unsafe {
            DeregisterEventSource(self.handle);
        }
    }
}
