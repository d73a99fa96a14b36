//! Host backend for the current operating system.

#[cfg(not(any(target_os = "linux", windows)))]
compile_error!("warden supports systemd on Linux and the SCM on Windows");

#[cfg(target_os = "linux")]
mod imp {
    use std::io;
    use std::sync::Arc;

    use warden_host::EventLog;
    use warden_host_systemd::{JournalEventLog, SystemdHost, SystemdRegistry};

    pub type Host = SystemdHost;
    pub type Registry = SystemdRegistry;

    pub fn host() -> Host {
        SystemdHost
    }

    pub fn registry() -> Registry {
        SystemdRegistry::default()
    }

    #[allow(clippy::unnecessary_wraps)]
    pub fn event_log(_source: &str) -> io::Result<Arc<dyn EventLog>> {
        Ok(Arc::new(JournalEventLog))
    }
}

#[cfg(windows)]
mod imp {
    use std::io;
    use std::sync::Arc;

    use warden_host::EventLog;
    use warden_host_windows::{ScmHost, ScmRegistry, WindowsEventLog};

    pub type Host = ScmHost;
    pub type Registry = ScmRegistry;

    pub fn host() -> Host {
        ScmHost
    }

    pub fn registry() -> Registry {
        ScmRegistry
    }

    pub fn event_log(source: &str) -> io::Result<Arc<dyn EventLog>> {
        Ok(Arc::new(WindowsEventLog::register(source)?))
    }
}

pub use imp::*;
