use std::fmt;
use std::str::FromStr;

use crate::{ControlRequest, Error, Result, ServiceIdentity, StatusSnapshot};

/// When the service manager starts the service.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StartType {
    /// Started automatically at boot.
    #[default]
    Auto,

    /// Started only on request.
    Demand,

    /// Cannot be started.
    Disabled,
}

impl FromStr for StartType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "demand" | "manual" => Ok(Self::Demand),
            "disabled" => Ok(Self::Disabled),
            other => Err(Error::InvalidStartType(other.to_string())),
        }
    }
}

impl fmt::Display for StartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Demand => "demand",
            Self::Disabled => "disabled",
        };

        f.write_str(s)
    }
}

/// Entry point to the host's service registry.
pub trait ServiceRegistry {
    /// Handle to an opened registry.
    type Manager: RegistryManager;

    /// Open the registry with administrative rights.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be opened.
    fn open_manager(&self) -> Result<Self::Manager>;
}

/// An opened service registry. Closed when dropped.
pub trait RegistryManager {
    /// Handle to a single registry entry.
    type Entry: RegistryEntry;

    /// Create a new entry for `identity`.
    ///
    /// A failed creation leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the name is taken, or another error if
    /// the entry could not be created.
    fn create_entry(&self, identity: &ServiceIdentity, start_type: StartType)
    -> Result<Self::Entry>;

    /// Open an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry has this name.
    fn open_entry(&self, name: &str) -> Result<Self::Entry>;
}

/// An opened registry entry. Closed when dropped.
pub trait RegistryEntry {
    /// Name of the entry.
    fn name(&self) -> &str;

    /// Ask the service manager to launch the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager refuses to start it.
    fn start(&self, args: &[String]) -> Result<()>;

    /// Deliver a control request to the running service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotActive`] if the service is not running.
    fn send_control(&self, request: ControlRequest) -> Result<StatusSnapshot>;

    /// Read the service's current status.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be queried.
    fn query_status(&self) -> Result<StatusSnapshot>;

    /// Remove the entry from the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be removed.
    fn delete(self) -> Result<()>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_type_parses_aliases() {
        assert_eq!("auto".parse::<StartType>().unwrap(), StartType::Auto);
        assert_eq!("manual".parse::<StartType>().unwrap(), StartType::Demand);
        assert_eq!("disabled".parse::<StartType>().unwrap(), StartType::Disabled);
        assert!("boot".parse::<StartType>().is_err());
    }
}
