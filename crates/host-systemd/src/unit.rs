use std::fmt::Write;

use systemctl::ActiveState;
use warden_host::{
    Error, Result, ServiceIdentity, ServiceState, StatusReport, StatusSnapshot,
};

/// Unit name for a service, rejecting names systemd would not accept.
pub fn unit_name(service: &str) -> Result<String> {
    let valid = service
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.' | '-' | '@' | '\\'));

    if !valid {
        return Err(Error::InvalidIdentity(format!(
            "`{service}` contains characters not allowed in a systemd unit name"
        )));
    }

    Ok(format!("{service}.service"))
}

/// Render the unit file installed for `identity`.
pub fn render(identity: &ServiceIdentity) -> String {
    let mut unit = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(unit, "[Unit]");
    let _ = writeln!(unit, "Description={}", identity.display_name());
    let _ = writeln!(unit);
    let _ = writeln!(unit, "[Service]");
    let _ = writeln!(unit, "Type=notify");
    let _ = writeln!(unit, "NotifyAccess=main");
    let _ = writeln!(
        unit,
        "ExecStart={}",
        quote_exec(&identity.executable_path().to_string_lossy())
    );
    let _ = writeln!(unit, "Restart=no");
    let _ = writeln!(unit);
    let _ = writeln!(unit, "[Install]");
    let _ = writeln!(unit, "WantedBy=multi-user.target");

    unit
}

fn quote_exec(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('"');
    for c in path.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '%' => quoted.push_str("%%"),
            '$' => quoted.push_str("$$"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Map the state systemd reports onto a service state.
pub fn service_state(state: ActiveState) -> Result<ServiceState> {
    match state {
        ActiveState::Activating => Ok(ServiceState::StartPending),
        ActiveState::Active | ActiveState::Reloading => Ok(ServiceState::Running),
        ActiveState::Deactivating => Ok(ServiceState::StopPending),
        ActiveState::Inactive | ActiveState::Failed => Ok(ServiceState::Stopped),
        ActiveState::Unknown => Err(Error::UnknownState(format!("{state:?}"))),
    }
}

/// Snapshot from the unit's active state and its `ExecMainStatus` property.
pub fn snapshot(state: ActiveState, exec_main_status: Option<&str>) -> Result<StatusSnapshot> {
    let exit_code = exec_main_status
        .and_then(|status| status.trim().parse().ok())
        .unwrap_or_default();

    Ok(StatusReport {
        exit_code,
        ..StatusReport::settled(service_state(state)?)
    })
}
