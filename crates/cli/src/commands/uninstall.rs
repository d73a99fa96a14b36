use crate::error::Result;
use crate::{ServiceArgs, StopArgs, platform};

use warden_admin::RegistryAdmin;

pub async fn uninstall(service: &ServiceArgs, args: &StopArgs) -> Result<()> {
    let identity = service.identity()?;

    let uninstalled = RegistryAdmin::new(platform::registry())
        .with_policy(args.policy())
        .uninstall(&identity)
        .await?;

    if uninstalled.stopped_running_instance {
        println!("Service stopped.");
    }
    println!("Service uninstalled successfully.");

    Ok(())
}
