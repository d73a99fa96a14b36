use crate::error::Result;
use crate::{ServiceArgs, StartArgs, platform};

use warden_admin::RegistryAdmin;

pub fn start(service: &ServiceArgs, args: &StartArgs) -> Result<()> {
    let identity = service.identity()?;

    RegistryAdmin::new(platform::registry()).start(&identity, &args.args)?;

    println!("Service start requested.");

    Ok(())
}
