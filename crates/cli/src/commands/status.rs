use crate::error::Result;
use crate::{ServiceArgs, platform};

use warden_admin::RegistryAdmin;

pub fn status(service: &ServiceArgs) -> Result<()> {
    let identity = service.identity()?;

    let snapshot = RegistryAdmin::new(platform::registry()).status(&identity)?;

    println!("{}: {}", identity.name(), snapshot.state);
    if snapshot.state.is_transitional() {
        println!("  checkpoint: {}", snapshot.checkpoint);
        println!("  wait hint:  {:?}", snapshot.wait_hint);
    }
    if snapshot.exit_code != 0 {
        println!("  exit code:  {}", snapshot.exit_code);
    }

    Ok(())
}
