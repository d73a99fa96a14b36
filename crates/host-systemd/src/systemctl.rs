use std::process::{Command, ExitStatus};

use systemctl::{ActiveState, ServiceProperty, SystemCtl};
use warden_host::{Error, Result};

pub fn start(unit: &str) -> Result<()> {
    let status = SystemCtl::default()
        .start(unit)
        .map_err(|e| Error::Io("failed to run systemctl start", e))?;

    check("systemctl start", status)
}

pub fn stop(unit: &str) -> Result<()> {
    let status = SystemCtl::default()
        .stop(unit)
        .map_err(|e| Error::Io("failed to run systemctl stop", e))?;

    check("systemctl stop", status)
}

pub fn daemon_reload() -> Result<()> {
    let status = SystemCtl::default()
        .daemon_reload()
        .map_err(|e| Error::Io("failed to run systemctl daemon-reload", e))?;

    check("systemctl daemon-reload", status)
}

pub fn enable(unit: &str) -> Result<()> {
    let status = SystemCtl::default()
        .enable(unit)
        .map_err(|e| Error::Io("failed to run systemctl enable", e))?;

    check("systemctl enable", status)
}

pub fn disable(unit: &str) -> Result<()> {
    let status = SystemCtl::default()
        .disable(unit)
        .map_err(|e| Error::Io("failed to run systemctl disable", e))?;

    check("systemctl disable", status)
}

pub fn active_state(unit: &str) -> Result<ActiveState> {
    SystemCtl::default()
        .get_active_state(unit)
        .map_err(|e| Error::Io("failed to query unit state", e))
}

pub fn exec_main_status(unit: &str) -> Result<Option<String>> {
    SystemCtl::default()
        .show(ServiceProperty::ExecMainStatus, unit)
        .map_err(|e| Error::Io("failed to query unit exit status", e))
}

// The systemctl crate has no `kill` verb.
pub fn signal_main(unit: &str, signal: &str) -> Result<()> {
    let status = Command::new("systemctl")
        .args(["kill", "--kill-whom=main", &format!("--signal={signal}"), unit])
        .status()
        .map_err(|e| Error::Io("failed to run systemctl kill", e))?;

    check("systemctl kill", status)
}

fn check(what: &'static str, status: ExitStatus) -> Result<()> {
    if !status.success() {
        return Err(Error::NonZeroExit(what, status));
    }

    Ok(())
}
