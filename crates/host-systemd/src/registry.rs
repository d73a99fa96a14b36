use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use warden_host::{
    ControlRequest, Error, RegistryEntry, RegistryManager, Result, ServiceIdentity,
    ServiceRegistry, ServiceState, StartType, StatusSnapshot,
};

use crate::{systemctl, unit};

/// Where system unit files are installed.
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";

/// Service registry backed by unit files and `systemctl`.
#[derive(Clone, Debug)]
pub struct SystemdRegistry {
    unit_dir: PathBuf,
}

impl SystemdRegistry {
    /// Registry installing unit files into `unit_dir`.
    #[must_use]
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
        }
    }
}

impl Default for SystemdRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_DIR)
    }
}

impl ServiceRegistry for SystemdRegistry {
    type Manager = SystemdManager;

    fn open_manager(&self) -> Result<SystemdManager> {
        if !self.unit_dir.is_dir() {
            return Err(Error::Unavailable(format!(
                "unit directory {} does not exist",
                self.unit_dir.display()
            )));
        }

        Ok(SystemdManager {
            unit_dir: self.unit_dir.clone(),
        })
    }
}

/// Opened systemd registry.
#[derive(Debug)]
pub struct SystemdManager {
    unit_dir: PathBuf,
}

impl SystemdManager {
    fn unit_path(&self, unit: &str) -> PathBuf {
        self.unit_dir.join(unit)
    }
}

impl RegistryManager for SystemdManager {
    type Entry = SystemdEntry;

    fn create_entry(
        &self,
        identity: &ServiceIdentity,
        start_type: StartType,
    ) -> Result<SystemdEntry> {
        let unit = unit::unit_name(identity.name())?;
        let path = self.unit_path(&unit);

        if path.exists() {
            return Err(Error::AlreadyExists(identity.name().to_string()));
        }

        fs::write(&path, unit::render(identity))
            .map_err(|e| Error::Io("failed to write unit file", e))?;

        if let Err(e) = register(&unit, start_type) {
            rollback(&path);
            return Err(e);
        }

        info!("installed {} ({start_type})", path.display());

        Ok(SystemdEntry {
            name: identity.name().to_string(),
            path,
            unit,
        })
    }

    fn open_entry(&self, name: &str) -> Result<SystemdEntry> {
        let unit = unit::unit_name(name).map_err(|_| Error::NotFound(name.to_string()))?;
        let path = self.unit_path(&unit);

        if !path.is_file() {
            return Err(Error::NotFound(name.to_string()));
        }

        Ok(SystemdEntry {
            name: name.to_string(),
            path,
            unit,
        })
    }
}

// systemd has no disabled-but-installed state short of masking, which would
// shadow the unit file, so `Disabled` behaves like `Demand`.
fn register(unit: &str, start_type: StartType) -> Result<()> {
    systemctl::daemon_reload()?;

    if start_type == StartType::Auto {
        systemctl::enable(unit)?;
    }

    Ok(())
}

fn rollback(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("failed to remove {} during rollback: {e}", path.display());
    }

    if let Err(e) = systemctl::daemon_reload() {
        warn!("daemon-reload failed during rollback: {e}");
    }
}

/// An installed unit.
#[derive(Debug)]
pub struct SystemdEntry {
    name: String,
    path: PathBuf,
    unit: String,
}

impl RegistryEntry for SystemdEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, args: &[String]) -> Result<()> {
        if self.query_status()?.state != ServiceState::Stopped {
            return Err(Error::AlreadyRunning(self.name.clone()));
        }

        if !args.is_empty() {
            debug!("systemd units take no start arguments, ignoring {args:?}");
        }

        systemctl::start(&self.unit)
    }

    fn send_control(&self, request: ControlRequest) -> Result<StatusSnapshot> {
        if self.query_status()?.state == ServiceState::Stopped {
            return Err(Error::NotActive(self.name.clone()));
        }

        match request {
            ControlRequest::Stop => systemctl::stop(&self.unit)?,
            ControlRequest::Interrogate => systemctl::signal_main(&self.unit, "SIGUSR1")?,
            ControlRequest::Other(_) => return Err(Error::ControlRejected(self.name.clone())),
        }

        self.query_status()
    }

    fn query_status(&self) -> Result<StatusSnapshot> {
        let state = systemctl::active_state(&self.unit)?;
        let exec_main_status = systemctl::exec_main_status(&self.unit)?;

        unit::snapshot(state, exec_main_status.as_deref())
    }

    fn delete(self) -> Result<()> {
        systemctl::disable(&self.unit)?;

        fs::remove_file(&self.path).map_err(|e| Error::Io("failed to remove unit file", e))?;

        systemctl::daemon_reload()?;

        info!("removed {}", self.path.display());

        Ok(())
    }
}
