use std::io;

use warden_host::{
    ControlRequest, Error, HandlerOutcome, RegistryEntry, RegistryManager, Result,
    ServiceIdentity, ServiceRegistry, ServiceState, StartType, StatusReport, StatusSnapshot,
};

use crate::{MockEntryState, MockHost};

impl ServiceRegistry for MockHost {
    type Manager = MockManager;

    fn open_manager(&self) -> Result<MockManager> {
        if self.inner.lock().unavailable {
            return Err(Error::Unavailable("mock registry is offline".to_string()));
        }

        Ok(MockManager { host: self.clone() })
    }
}

/// Opened mock registry.
#[derive(Debug)]
pub struct MockManager {
    host: MockHost,
}

impl RegistryManager for MockManager {
    type Entry = MockEntry;

    fn create_entry(&self, identity: &ServiceIdentity, start_type: StartType) -> Result<MockEntry> {
        let mut inner = self.host.inner.lock();

        if inner.entries.contains_key(identity.name()) {
            return Err(Error::AlreadyExists(identity.name().to_string()));
        }

        inner.entries.insert(
            identity.name().to_string(),
            MockEntryState {
                identity: identity.clone(),
                start_type,
                status: StatusReport::settled(ServiceState::Stopped),
                stop_polls: Some(0),
            },
        );

        Ok(MockEntry {
            host: self.host.clone(),
            name: identity.name().to_string(),
        })
    }

    fn open_entry(&self, name: &str) -> Result<MockEntry> {
        if !self.host.inner.lock().entries.contains_key(name) {
            return Err(Error::NotFound(name.to_string()));
        }

        Ok(MockEntry {
            host: self.host.clone(),
            name: name.to_string(),
        })
    }
}

/// Opened mock registry entry.
#[derive(Debug)]
pub struct MockEntry {
    host: MockHost,
    name: String,
}

impl MockEntry {
    fn status(&self) -> Result<StatusSnapshot> {
        self.host
            .inner
            .lock()
            .entries
            .get(&self.name)
            .map(|entry| entry.status)
            .ok_or_else(|| Error::NotFound(self.name.clone()))
    }
}

impl RegistryEntry for MockEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, _args: &[String]) -> Result<()> {
        let mut inner = self.host.inner.lock();
        let entry = inner
            .entries
            .get_mut(&self.name)
            .ok_or_else(|| Error::NotFound(self.name.clone()))?;

        if entry.status.state != ServiceState::Stopped {
            return Err(Error::AlreadyRunning(self.name.clone()));
        }

        entry.status = StatusReport::settled(ServiceState::Running);

        Ok(())
    }

    fn send_control(&self, request: ControlRequest) -> Result<StatusSnapshot> {
        let current = self.status()?;
        if current.state == ServiceState::Stopped {
            return Err(Error::NotActive(self.name.clone()));
        }

        // an in-process service answers for itself
        if let Some(outcome) = self.host.deliver(&self.name, request) {
            return match outcome {
                HandlerOutcome::Handled => self.status(),
                HandlerOutcome::NotImplemented => Err(Error::ControlRejected(self.name.clone())),
            };
        }

        match request {
            ControlRequest::Interrogate => Ok(current),
            ControlRequest::Stop if current.state == ServiceState::Running => {
                let mut inner = self.host.inner.lock();
                let entry = inner
                    .entries
                    .get_mut(&self.name)
                    .ok_or_else(|| Error::NotFound(self.name.clone()))?;

                entry.status = StatusReport {
                    checkpoint: 1,
                    ..StatusReport::settled(ServiceState::StopPending)
                };

                Ok(entry.status)
            }
            ControlRequest::Stop => Ok(current),
            ControlRequest::Other(_) => Err(Error::ControlRejected(self.name.clone())),
        }
    }

    fn query_status(&self) -> Result<StatusSnapshot> {
        let mut inner = self.host.inner.lock();
        let has_handler = inner.handlers.contains_key(&self.name);
        let entry = inner
            .entries
            .get_mut(&self.name)
            .ok_or_else(|| Error::NotFound(self.name.clone()))?;

        if !has_handler && entry.status.state == ServiceState::StopPending {
            match entry.stop_polls {
                Some(0) => entry.status = StatusReport::settled(ServiceState::Stopped),
                Some(ref mut remaining) => {
                    *remaining -= 1;
                    entry.status.checkpoint += 1;
                }
                None => entry.status.checkpoint += 1,
            }
        }

        Ok(entry.status)
    }

    fn delete(self) -> Result<()> {
        let mut inner = self.host.inner.lock();

        if inner.fail_delete {
            return Err(Error::Io(
                "failed to delete service",
                io::Error::other("marked for deletion"),
            ));
        }

        inner
            .entries
            .remove(&self.name)
            .map(|_| ())
            .ok_or(Error::NotFound(self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn identity(name: &str) -> ServiceIdentity {
        ServiceIdentity::new(name, "", std::env::current_exe().unwrap()).unwrap()
    }

    #[test]
    fn test_create_rejects_duplicate_names() {
        let host = MockHost::new();
        let manager = host.open_manager().unwrap();

        manager.create_entry(&identity("svc1"), StartType::Auto).unwrap();

        assert_matches!(
            manager.create_entry(&identity("svc1"), StartType::Auto),
            Err(Error::AlreadyExists(name)) if name == "svc1"
        );
        assert_eq!(host.entries().len(), 1);
    }

    #[test]
    fn test_opened_entry_reports_its_name() {
        let host = MockHost::new();
        let manager = host.open_manager().unwrap();
        manager.create_entry(&identity("svc1"), StartType::Auto).unwrap();

        let entry = manager.open_entry("svc1").unwrap();

        assert_eq!(entry.name(), "svc1");
        assert!(format!("{entry:?}").contains("svc1"));
    }

    #[test]
    fn test_open_missing_entry() {
        let host = MockHost::new();
        let manager = host.open_manager().unwrap();

        assert_matches!(manager.open_entry("svc1"), Err(Error::NotFound(_)));
    }

    #[test]
    fn test_unavailable_registry() {
        let host = MockHost::new();
        host.set_unavailable(true);

        assert_matches!(host.open_manager(), Err(Error::Unavailable(_)));
    }

    #[test]
    fn test_simulated_stop_progresses_on_query() {
        let host = MockHost::new();
        let manager = host.open_manager().unwrap();
        let entry = manager.create_entry(&identity("svc1"), StartType::Auto).unwrap();
        host.simulate_running("svc1", Some(1));

        let snapshot = entry.send_control(ControlRequest::Stop).unwrap();
        assert_eq!(snapshot.state, ServiceState::StopPending);
        assert_eq!(snapshot.checkpoint, 1);

        let first = entry.query_status().unwrap();
        assert_eq!(first.state, ServiceState::StopPending);
        assert_eq!(first.checkpoint, 2);

        assert_eq!(entry.query_status().unwrap().state, ServiceState::Stopped);
    }

    #[test]
    fn test_control_on_stopped_service_is_not_active() {
        let host = MockHost::new();
        let manager = host.open_manager().unwrap();
        let entry = manager.create_entry(&identity("svc1"), StartType::Auto).unwrap();

        assert_matches!(entry.send_control(ControlRequest::Stop), Err(Error::NotActive(_)));
    }

    #[test]
    fn test_start_twice_fails() {
        let host = MockHost::new();
        let manager = host.open_manager().unwrap();
        let entry = manager.create_entry(&identity("svc1"), StartType::Demand).unwrap();

        entry.start(&[]).unwrap();

        assert_matches!(entry.start(&[]), Err(Error::AlreadyRunning(_)));
    }
}
