use crate::error::{Error, Result};
use crate::{ServiceArgs, platform};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tracing::debug;
use warden_host::ServiceDispatcher;
use warden_service::{EventReporter, IdleWork, LifecycleCoordinator, Outcome};

/// Hand the process to the service manager and run the lifecycle when it
/// calls back.
pub fn service(service: &ServiceArgs, runtime: &Runtime) -> Result<()> {
    let options = service.options()?;
    let name = options.identity.name().to_string();

    let log = platform::event_log(&name).map_err(|e| Error::EventSource(name.clone(), e))?;
    let events = EventReporter::new(log, name.as_str());

    let host = platform::host();
    let handle = runtime.handle().clone();
    let outcome = Arc::new(Mutex::new(None));

    let slot = Arc::clone(&outcome);
    host.dispatch_main(
        &name,
        Box::new(move |args| {
            debug!(?args, "service main entered");

            let work = IdleWork::new(options.poll_interval);
            let result = handle.block_on(LifecycleCoordinator::new(options, events, work).run(&host));

            *slot.lock() = Some(result);
        }),
    )?;

    let result = outcome.lock().take();
    match result {
        Some(Ok(Outcome::Stopped { iterations })) => {
            debug!(iterations, "service exited");
            Ok(())
        }
        Some(Ok(Outcome::InitFailed)) => Err(Error::InitFailed),
        Some(Ok(Outcome::RegistrationFailed)) => Err(Error::RegistrationFailed),
        Some(Err(e)) => Err(e.into()),
        None => Ok(()),
    }
}
