use crate::console::ConsoleHost;
use crate::error::{Error, Result};
use crate::ServiceArgs;

use std::sync::Arc;

use tracing::info;
use warden_service::{EventReporter, IdleWork, LifecycleCoordinator, Outcome};

pub async fn console(service: &ServiceArgs) -> Result<()> {
    let options = service.options()?;
    let events = EventReporter::new(Arc::new(ConsoleHost), options.identity.name());
    let work = IdleWork::new(options.poll_interval);

    info!("running in the foreground, press Ctrl-C to stop");

    match LifecycleCoordinator::new(options, events, work)
        .run(&ConsoleHost)
        .await?
    {
        Outcome::Stopped { iterations } => {
            info!(iterations, "service stopped");
            Ok(())
        }
        Outcome::InitFailed => Err(Error::InitFailed),
        Outcome::RegistrationFailed => Err(Error::RegistrationFailed),
    }
}
