use crate::error::Result;
use crate::{InstallArgs, ServiceArgs, platform};

use warden_admin::RegistryAdmin;

pub fn install(service: &ServiceArgs, args: &InstallArgs) -> Result<()> {
    let identity = service.identity()?;

    RegistryAdmin::new(platform::registry()).install(&identity, args.start_type)?;

    println!("Service installed successfully.");

    Ok(())
}
