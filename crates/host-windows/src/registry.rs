use std::io;
use std::mem;
use std::ptr;

use tracing::{debug, info};
use warden_host::{
    ControlRequest, Error, RegistryEntry, RegistryManager, Result, ServiceIdentity,
    ServiceRegistry, StartType, StatusSnapshot,
};
use windows_sys::Win32::System::Services::{
    ControlService, CreateServiceW, DeleteService, OpenSCManagerW, OpenServiceW,
    QueryServiceStatus, SC_MANAGER_ALL_ACCESS, SERVICE_ALL_ACCESS, SERVICE_AUTO_START,
    SERVICE_CONTROL_INTERROGATE, SERVICE_CONTROL_STOP, SERVICE_DEMAND_START, SERVICE_DISABLED,
    SERVICE_ERROR_NORMAL, SERVICE_STATUS, SERVICE_WIN32_OWN_PROCESS, StartServiceW,
};

use crate::handle::{ScHandle, scm_error, snapshot, wide};

/// Service registry backed by the local Service Control Manager.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScmRegistry;

impl ServiceRegistry for ScmRegistry {
    type Manager = ScmManager;

    fn open_manager(&self) -> Result<ScmManager> {
        // SAFETY: null machine and database names select the local active database.
        let raw = unsafe { OpenSCManagerW(ptr::null(), ptr::null(), SC_MANAGER_ALL_ACCESS) };

        let handle = ScHandle::new(raw).map_err(|e| Error::Unavailable(e.to_string()))?;

        Ok(ScmManager { handle })
    }
}

/// Opened Service Control Manager.
#[derive(Debug)]
pub struct ScmManager {
    handle: ScHandle,
}

impl RegistryManager for ScmManager {
    type Entry = ScmEntry;

    fn create_entry(&self, identity: &ServiceIdentity, start_type: StartType) -> Result<ScmEntry> {
        let name = wide(identity.name());
        let display_name = wide(identity.display_name());
        let binary_path = wide(format!("\"{}\"", identity.executable_path().display()));

        let start_type = match start_type {
            StartType::Auto => SERVICE_AUTO_START,
            StartType::Demand => SERVICE_DEMAND_START,
            StartType::Disabled => SERVICE_DISABLED,
        };

        // SAFETY: every string is null terminated and outlives the call.
        let raw = unsafe {
            CreateServiceW(
                self.handle.raw(),
                name.as_ptr(),
                display_name.as_ptr(),
                SERVICE_ALL_ACCESS,
                SERVICE_WIN32_OWN_PROCESS,
                start_type,
                SERVICE_ERROR_NORMAL,
                binary_path.as_ptr(),
                ptr::null(),
                ptr::null_mut(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };

        let handle = ScHandle::new(raw)
            .map_err(|e| scm_error("failed to create service", identity.name(), e))?;

        info!("created service {}", identity.name());

        Ok(ScmEntry {
            handle,
            name: identity.name().to_string(),
        })
    }

    fn open_entry(&self, name: &str) -> Result<ScmEntry> {
        let wide_name = wide(name);

        // SAFETY: the name is null terminated and outlives the call.
        let raw = unsafe { OpenServiceW(self.handle.raw(), wide_name.as_ptr(), SERVICE_ALL_ACCESS) };

        let handle = ScHandle::new(raw).map_err(|e| scm_error("failed to open service", name, e))?;

        Ok(ScmEntry {
            handle,
            name: name.to_string(),
        })
    }
}

/// Opened service entry.
#[derive(Debug)]
pub struct ScmEntry {
    handle: ScHandle,
    name: String,
}

impl ScmEntry {
    fn check(&self, what: &'static str, ok: i32) -> Result<()> {
        if ok == 0 {
            Err(scm_error(what, &self.name, io::Error::last_os_error()))
        } else {
            Ok(())
        }
    }
}

impl RegistryEntry for ScmEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, args: &[String]) -> Result<()> {
        let wide_args: Vec<Vec<u16>> = args.iter().map(wide).collect();
        let argv: Vec<*const u16> = wide_args.iter().map(|arg| arg.as_ptr()).collect();
        let argc = u32::try_from(argv.len())
            .map_err(|_| Error::InvalidIdentity("too many start arguments".to_string()))?;

        // SAFETY: argv points at null terminated strings kept alive by wide_args.
        let ok = unsafe {
            StartServiceW(
                self.handle.raw(),
                argc,
                if argv.is_empty() { ptr::null() } else { argv.as_ptr() },
            )
        };

        self.check("failed to start service", ok)
    }

    fn send_control(&self, request: ControlRequest) -> Result<StatusSnapshot> {
        let control = match request {
            ControlRequest::Stop => SERVICE_CONTROL_STOP,
            ControlRequest::Interrogate => SERVICE_CONTROL_INTERROGATE,
            ControlRequest::Other(code) => code,
        };

        // SAFETY: SERVICE_STATUS is plain data; zeroed is a valid value.
        let mut status: SERVICE_STATUS = unsafe { mem::zeroed() };

        // SAFETY: status is a valid out pointer for the duration of the call.
        let ok = unsafe { ControlService(self.handle.raw(), control, &raw mut status) };
        self.check("failed to control service", ok)?;

        debug!("sent {request:?} to {}", self.name);

        snapshot(&status)
    }

    fn query_status(&self) -> Result<StatusSnapshot> {
        // SAFETY: SERVICE_STATUS is plain data; zeroed is a valid value.
        let mut status: SERVICE_STATUS = unsafe { mem::zeroed() };

        // SAFETY: status is a valid out pointer for the duration of the call.
        let ok = unsafe { QueryServiceStatus(self.handle.raw(), &raw mut status) };
        self.check("failed to query service", ok)?;

        snapshot(&status)
    }

    fn delete(self) -> Result<()> {
        // SAFETY: the handle was opened with DELETE access.
        let ok = unsafe { DeleteService(self.handle.raw()) };
        self.check("failed to delete service", ok)?;

        info!("deleted service {}", self.name);

        Ok(())
    }
}
