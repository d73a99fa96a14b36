//! One-shot administrative operations against the host's service registry.
//!
//! Nothing here is resident in the service process; every call opens the
//! registry, does its work and releases its handles.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};
use warden_host::{
    ControlRequest, RegistryEntry, RegistryManager, ServiceIdentity, ServiceRegistry,
    ServiceState, StartType, StatusSnapshot,
};

/// How long to wait for a running service to stop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StopPolicy {
    /// Delay between status queries.
    pub poll_interval: Duration,

    /// Status queries made before giving up.
    pub max_polls: u32,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_polls: 30,
        }
    }
}

/// Result of a successful uninstall.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Uninstalled {
    /// Whether a running instance had to be stopped first.
    pub stopped_running_instance: bool,
}

/// Administrative client for the service registry.
pub struct RegistryAdmin<R> {
    policy: StopPolicy,
    registry: R,
}

impl<R> RegistryAdmin<R>
where
    R: ServiceRegistry,
{
    /// Create a client using the default stop policy.
    pub fn new(registry: R) -> Self {
        Self {
            policy: StopPolicy::default(),
            registry,
        }
    }

    /// Replace the stop policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: StopPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register `identity` with the service manager.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryUnavailable`] if the registry cannot be opened
    /// and [`Error::CreateFailed`] if the entry cannot be created, including
    /// when it already exists.
    pub fn install(&self, identity: &ServiceIdentity, start_type: StartType) -> Result<()> {
        let manager = self.open()?;

        manager
            .create_entry(identity, start_type)
            .map_err(|source| Error::CreateFailed {
                name: identity.name().to_string(),
                source,
            })?;

        info!(
            service = identity.name(),
            path = %identity.executable_path().display(),
            %start_type,
            "service installed"
        );

        Ok(())
    }

    /// Stop any running instance of `identity`, then remove it from the
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryUnavailable`], [`Error::NotFound`],
    /// [`Error::ControlFailed`] or [`Error::StopFailed`] if a running instance
    /// refuses the stop or cannot be stopped within the policy, and
    /// [`Error::DeleteFailed`] if the entry cannot be removed. The entry is left in place on every error.
    pub async fn uninstall(&self, identity: &ServiceIdentity) -> Result<Uninstalled> {
        let manager = self.open()?;
        let entry = Self::open_entry(&manager, identity)?;

        let stopped_running_instance = self.stop_entry(&entry).await?;

        entry.delete().map_err(|source| Error::DeleteFailed {
            name: identity.name().to_string(),
            source,
        })?;

        info!(service = identity.name(), "service uninstalled");

        Ok(Uninstalled {
            stopped_running_instance,
        })
    }

    /// Ask the service manager to start `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryUnavailable`], [`Error::NotFound`] or
    /// [`Error::StartFailed`].
    pub fn start(&self, identity: &ServiceIdentity, args: &[String]) -> Result<()> {
        let manager = self.open()?;
        let entry = Self::open_entry(&manager, identity)?;

        entry.start(args).map_err(|source| Error::StartFailed {
            name: identity.name().to_string(),
            source,
        })?;

        info!(service = identity.name(), "start requested");

        Ok(())
    }

    /// Stop `identity` and wait until it reports `Stopped`.
    ///
    /// Returns `false` if the service was not running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryUnavailable`], [`Error::NotFound`],
    /// [`Error::ControlFailed`] or [`Error::StopFailed`].
    pub async fn stop(&self, identity: &ServiceIdentity) -> Result<bool> {
        let manager = self.open()?;
        let entry = Self::open_entry(&manager, identity)?;

        self.stop_entry(&entry).await
    }

    /// Current status of `identity` as recorded by the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryUnavailable`], [`Error::NotFound`] or
    /// [`Error::QueryFailed`].
    pub fn status(&self, identity: &ServiceIdentity) -> Result<StatusSnapshot> {
        let manager = self.open()?;
        let entry = Self::open_entry(&manager, identity)?;

        entry.query_status().map_err(|source| Error::QueryFailed {
            name: identity.name().to_string(),
            source,
        })
    }

    fn open(&self) -> Result<R::Manager> {
        self.registry
            .open_manager()
            .map_err(Error::RegistryUnavailable)
    }

    fn open_entry(
        manager: &R::Manager,
        identity: &ServiceIdentity,
    ) -> Result<<R::Manager as RegistryManager>::Entry> {
        manager
            .open_entry(identity.name())
            .map_err(|source| Error::NotFound {
                name: identity.name().to_string(),
                source,
            })
    }

    async fn stop_entry<E: RegistryEntry>(&self, entry: &E) -> Result<bool> {
        let name = entry.name().to_string();

        match entry.send_control(ControlRequest::Stop) {
            Ok(snapshot) if snapshot.state == ServiceState::Stopped => {
                info!(service = %name, "service stopped");
                return Ok(true);
            }
            Ok(snapshot) => debug!(service = %name, state = %snapshot.state, "stop sent"),
            Err(warden_host::Error::NotActive(_)) => {
                debug!(service = %name, "service not running");
                return Ok(false);
            }
            Err(warden_host::Error::ControlRejected(_)) => {
                let state = entry
                    .query_status()
                    .map_err(|source| Error::QueryFailed {
                        name: name.clone(),
                        source,
                    })?
                    .state;

                return Err(Error::StopFailed { name, state });
            }
            Err(source) => return Err(Error::ControlFailed { name, source }),
        }

        info!(service = %name, "stopping service...");

        let mut state = ServiceState::StopPending;
        for poll in 0..self.policy.max_polls {
            sleep(self.policy.poll_interval).await;

            state = entry
                .query_status()
                .map_err(|source| Error::QueryFailed {
                    name: name.clone(),
                    source,
                })?
                .state;

            if state != ServiceState::StopPending {
                break;
            }

            debug!(service = %name, poll, "still stopping");
        }

        if state == ServiceState::Stopped {
            info!(service = %name, "service stopped");
            Ok(true)
        } else {
            Err(Error::StopFailed { name, state })
        }
    }
}
