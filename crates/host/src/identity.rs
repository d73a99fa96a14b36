use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Maximum length of a service name, in UTF-16 code units.
pub const MAX_SERVICE_NAME_LEN: usize = 256;

/// Identity under which the service is registered and dispatched.
///
/// Fixed for the lifetime of the process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceIdentity {
    name: String,
    display_name: String,
    executable_path: PathBuf,
}

impl ServiceIdentity {
    /// Create a validated identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if the name is empty, longer than
    /// [`MAX_SERVICE_NAME_LEN`] code units or contains a path separator, or if the
    /// executable path is not absolute.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        executable_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let name = name.into();
        let display_name = display_name.into();
        let executable_path = executable_path.into();

        if name.is_empty() {
            return Err(Error::InvalidIdentity("service name is empty".to_string()));
        }

        if name.encode_utf16().count() > MAX_SERVICE_NAME_LEN {
            return Err(Error::InvalidIdentity(format!(
                "service name exceeds {MAX_SERVICE_NAME_LEN} characters"
            )));
        }

        if name.contains(['/', '\\']) {
            return Err(Error::InvalidIdentity(format!(
                "service name `{name}` contains a path separator"
            )));
        }

        if !executable_path.is_absolute() {
            return Err(Error::InvalidIdentity(format!(
                "executable path {executable_path:?} is not absolute"
            )));
        }

        let display_name = if display_name.is_empty() {
            name.clone()
        } else {
            display_name
        };

        Ok(Self {
            name,
            display_name,
            executable_path,
        })
    }

    /// Key used by both the registry and the control channel.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable name shown by the service manager.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Binary the service manager launches.
    #[must_use]
    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }
}
