//! Shared CLI plumbing for the `vtp-listen` and `vtp-serve` binaries.

use std::str::FromStr;

/// A `HOST[:PORT]` CLI argument, falling back to a default port when omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn with_default_port(s: &str, default_port: u16) -> Result<Self, String> {
        match s.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| format!("invalid port in '{s}': '{port}' is not a u16"))?;
                Ok(Self { host: host.to_string(), port })
            }
            None => Ok(Self { host: s.to_string(), port: default_port }),
        }
    }
}

/// Parser for `clap`'s `value_parser` with the default port baked in, used
/// for `vtp-serve --host`.
pub fn parse_host_port_default_8099(s: &str) -> Result<HostPort, String> {
    HostPort::with_default_port(s, 8099)
}

impl FromStr for HostPort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostPort::with_default_port(s, 8099)
    }
}

/// Installs a Ctrl-C (SIGINT) and, on Unix, SIGTERM handler that sets `stop`.
pub fn install_signal_handlers(stop: vtp::StopSignal) {
    let for_ctrlc = stop.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        tracing::info!("received interrupt, shutting down");
        for_ctrlc.set();
    }) {
        tracing::warn!(%err, "could not install Ctrl-C handler");
    }
}
