use crate::error::Result;
use crate::{ServiceArgs, StopArgs, platform};

use warden_admin::RegistryAdmin;

pub async fn stop(service: &ServiceArgs, args: &StopArgs) -> Result<()> {
    let identity = service.identity()?;

    let stopped = RegistryAdmin::new(platform::registry())
        .with_policy(args.policy())
        .stop(&identity)
        .await?;

    if stopped {
        println!("Service stopped.");
    } else {
        println!("Service is not running.");
    }

    Ok(())
}
