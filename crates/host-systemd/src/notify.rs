use std::env;
use std::io;
use std::os::linux::net::SocketAddrExt;
use std::os::unix::net::{SocketAddr, UnixDatagram};

use warden_host::{ServiceState, StatusReport};

/// Datagram socket named by `$NOTIFY_SOCKET`.
#[derive(Debug)]
pub struct NotifySocket {
    addr: SocketAddr,
    socket: UnixDatagram,
}

impl NotifySocket {
    /// Connect to the socket systemd passed in `$NOTIFY_SOCKET`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or no socket can be created.
    pub fn from_env() -> io::Result<Option<Self>> {
        match env::var("NOTIFY_SOCKET") {
            Ok(path) if !path.is_empty() => Self::new(&path).map(Some),
            _ => Ok(None),
        }
    }

    /// Socket sending to `path`; a leading `@` names an abstract address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or no socket can be created.
    pub fn new(path: &str) -> io::Result<Self> {
        let addr = match path.strip_prefix('@') {
            Some(name) => SocketAddr::from_abstract_name(name.as_bytes())?,
            None => SocketAddr::from_pathname(path)?,
        };

        Ok(Self {
            addr,
            socket: UnixDatagram::unbound()?,
        })
    }

    /// Send a raw notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the datagram cannot be sent.
    pub fn notify(&self, message: &str) -> io::Result<()> {
        self.socket
            .send_to_addr(message.as_bytes(), &self.addr)
            .map(|_| ())
    }
}

/// `sd_notify` message announcing `report`.
pub fn message(report: &StatusReport) -> String {
    let mut fields = Vec::with_capacity(3);

    match report.state {
        ServiceState::StartPending => {
            fields.push(format!("STATUS=Starting (checkpoint {})", report.checkpoint));
        }
        ServiceState::Running => {
            fields.push("READY=1".to_string());
            fields.push("STATUS=Running".to_string());
        }
        ServiceState::StopPending => {
            fields.push("STOPPING=1".to_string());
            fields.push(format!("STATUS=Stopping (checkpoint {})", report.checkpoint));
        }
        ServiceState::Stopped => {
            fields.push("STATUS=Stopped".to_string());
            if report.exit_code != 0 {
                fields.push(format!("ERRNO={}", report.exit_code));
            }
        }
    }

    if report.state.is_transitional() && !report.wait_hint.is_zero() {
        fields.push(format!(
            "EXTEND_TIMEOUT_USEC={}",
            report.wait_hint.as_micros()
        ));
    }

    fields.join("\n")
}
