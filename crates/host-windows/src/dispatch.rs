use std::ffi::c_void;
use std::io;
use std::ptr;
use std::slice;

use parking_lot::{Mutex, const_mutex};
use tracing::{debug, error};
use warden_host::{
    ControlHandler, ControlRegistrar, ControlRequest, Error, HandlerOutcome, Result,
    ServiceDispatcher, ServiceMain, StatusHandle, StatusReport,
};
use windows_sys::Win32::Foundation::{
    ERROR_CALL_NOT_IMPLEMENTED, ERROR_FAILED_SERVICE_CONTROLLER_CONNECT, NO_ERROR,
};
use windows_sys::Win32::System::Services::{
    RegisterServiceCtrlHandlerExW, SERVICE_CONTROL_INTERROGATE, SERVICE_CONTROL_STOP,
    SERVICE_STATUS_HANDLE, SERVICE_TABLE_ENTRYW, SetServiceStatus, StartServiceCtrlDispatcherW,
};

use crate::handle::{scm_error, service_status, wide};

/// Exit code when the process was not started by the SCM.
#[allow(clippy::cast_possible_wrap)]
pub const NOT_UNDER_MANAGER_CODE: i32 = ERROR_FAILED_SERVICE_CONTROLLER_CONNECT as i32;

// The SCM calls the service main without a context pointer, so the entry
// point waits here between dispatch and the callback.
static SERVICE_MAIN: Mutex<Option<ServiceMain>> = const_mutex(None);

/// Resident side of the Windows backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScmHost;

impl ServiceDispatcher for ScmHost {
    fn dispatch_main(&self, name: &str, entry: ServiceMain) -> Result<()> {
        *SERVICE_MAIN.lock() = Some(entry);

        let mut wide_name = wide(name);
        let table = [
            SERVICE_TABLE_ENTRYW {
                lpServiceName: wide_name.as_mut_ptr(),
                lpServiceProc: Some(service_main),
            },
            SERVICE_TABLE_ENTRYW {
                lpServiceName: ptr::null_mut(),
                lpServiceProc: None,
            },
        ];

        // SAFETY: the table is null terminated and outlives the call, which
        // returns only after the service has stopped.
        let ok = unsafe { StartServiceCtrlDispatcherW(table.as_ptr()) };

        SERVICE_MAIN.lock().take();

        if ok == 0 {
            return Err(scm_error(
                "service dispatcher failed",
                name,
                io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

unsafe extern "system" fn service_main(argc: u32, argv: *mut *mut u16) {
    let args = if argv.is_null() {
        Vec::new()
    } else {
        // SAFETY: the SCM passes argc valid, null terminated strings.
        unsafe { slice::from_raw_parts(argv, argc as usize) }
            .iter()
            .map(|&arg| unsafe { from_wide_ptr(arg) })
            .collect()
    };

    let entry = SERVICE_MAIN.lock().take();
    match entry {
        Some(entry) => entry(args),
        None => error!("service main invoked without a pending entry point"),
    }
}

/// # Safety
///
/// `ptr` must point at a null terminated UTF-16 string.
unsafe fn from_wide_ptr(ptr: *const u16) -> String {
    let mut len = 0;
    // SAFETY: guaranteed by the caller.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }

    // SAFETY: the first len units were just read.
    String::from_utf16_lossy(unsafe { slice::from_raw_parts(ptr, len) })
}

impl ControlRegistrar for ScmHost {
    fn register_control_handler(
        &self,
        name: &str,
        handler: ControlHandler,
    ) -> Result<Box<dyn StatusHandle>> {
        let wide_name = wide(name);

        // Lives for the rest of the process; the SCM may call back until exit.
        let context = Box::into_raw(Box::new(handler));

        // SAFETY: the name is null terminated and the context stays valid.
        let raw = unsafe {
            RegisterServiceCtrlHandlerExW(
                wide_name.as_ptr(),
                Some(control_handler),
                context.cast::<c_void>(),
            )
        };

        if raw.is_null() {
            let e = io::Error::last_os_error();
            error!("RegisterServiceCtrlHandlerExW failed: {e}");

            // SAFETY: the SCM never saw the context, so it is still ours.
            drop(unsafe { Box::from_raw(context) });

            return Err(Error::RegistrationFailed(name.to_string()));
        }

        Ok(Box::new(ScmStatusHandle(raw)))
    }
}

unsafe extern "system" fn control_handler(
    control: u32,
    _event_type: u32,
    _event_data: *mut c_void,
    context: *mut c_void,
) -> u32 {
    // SAFETY: context is the leaked handler from registration.
    let handler = unsafe { &*context.cast::<ControlHandler>() };

    let request = match control {
        SERVICE_CONTROL_STOP => ControlRequest::Stop,
        SERVICE_CONTROL_INTERROGATE => ControlRequest::Interrogate,
        other => ControlRequest::Other(other),
    };

    match handler(request) {
        HandlerOutcome::Handled => NO_ERROR,
        HandlerOutcome::NotImplemented => {
            debug!("control {request:?} not implemented");
            ERROR_CALL_NOT_IMPLEMENTED
        }
    }
}

struct ScmStatusHandle(SERVICE_STATUS_HANDLE);

// SAFETY: status handles may be used from any thread and need not be closed.
unsafe impl Send for ScmStatusHandle {}
// SAFETY: SetServiceStatus is thread-safe; callers serialize publishes anyway.
unsafe impl Sync for ScmStatusHandle {}

impl StatusHandle for ScmStatusHandle {
    fn set_status(&self, report: &StatusReport) -> Result<()> {
        let status = service_status(report);

        // SAFETY: the handle came from RegisterServiceCtrlHandlerExW.
        let ok = unsafe { SetServiceStatus(self.0, &raw const status) };

        if ok == 0 {
            return Err(Error::Io(
                "failed to set service status",
                io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}
