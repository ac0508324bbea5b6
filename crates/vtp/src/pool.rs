//! Endpoint pool: cycles through configured `(host, port)` pairs with
//! shared exponential backoff.

use std::{
    net::TcpStream,
    time::Duration,
};

use tracing::{info, warn};

use crate::{error::ConfigError, stop::StopSignal};

/// Broadcasts `hosts`/`ports` against each other: if one side has length 1
/// and the other length N, the short side is repeated to length N. Otherwise
/// the lengths must already match.
pub fn validate_host_port(hosts: &[String], ports: &[u16]) -> Result<(Vec<String>, Vec<u16>), ConfigError> {
    if hosts.is_empty() || ports.is_empty() {
        return Err(ConfigError::Empty);
    }

    match (hosts.len(), ports.len()) {
        (1, n) => Ok((vec![hosts[0].clone(); n], ports.to_vec())),
        (n, 1) => Ok((hosts.to_vec(), vec![ports[0]; n])),
        (h, p) if h == p => Ok((hosts.to_vec(), ports.to_vec())),
        (h, p) => Err(ConfigError::UnequalLengths { hosts: h, ports: p }),
    }
}

/// An `(host, port)` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Cyclic iterator over configured endpoints with shared exponential backoff.
///
/// `next_connected` never gives up: it blocks (interruptibly, via `stop`)
/// until a connection succeeds, doubling the backoff after every failed
/// attempt across the whole pool, up to `max_reconnect_timeout`.
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
    next: usize,
    backoff: Duration,
    max_reconnect_timeout: Duration,
    connect_timeout: Duration,
}

impl EndpointPool {
    pub fn new(endpoints: Vec<Endpoint>, connect_timeout: Duration, max_reconnect_timeout: Duration) -> Self {
        assert!(!endpoints.is_empty(), "endpoint pool requires at least one endpoint");
        Self {
            endpoints,
            next: 0,
            backoff: Duration::from_secs(1),
            max_reconnect_timeout,
            connect_timeout,
        }
    }

    fn advance(&mut self) -> &Endpoint {
        let ep = &self.endpoints[self.next];
        self.next = (self.next + 1) % self.endpoints.len();
        ep
    }

    /// Connects to the next endpoint, retrying forever with exponential
    /// backoff. Returns `None` if `stop` is set while waiting out a backoff
    /// sleep.
    pub fn next_connected(&mut self, stop: &StopSignal) -> Option<TcpStream> {
        loop {
            if stop.is_set() {
                return None;
            }

            let ep = self.advance().clone();
            let addr = match resolve_first(&ep.host, ep.port) {
                Ok(addr) => addr,
                Err(err) => {
                    warn!(host = %ep.host, port = ep.port, %err, "could not resolve, will retry");
                    if stop.wait_timeout(self.backoff) {
                        return None;
                    }
                    self.backoff = (self.backoff * 2).min(self.max_reconnect_timeout);
                    continue;
                }
            };

            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(sock) => {
                    info!(host = %ep.host, port = ep.port, "connected");
                    self.backoff = Duration::from_secs(1);
                    return Some(sock);
                }
                Err(err) => {
                    warn!(host = %ep.host, port = ep.port, %err, backoff_secs = self.backoff.as_secs(), "could not connect, will retry");
                    if stop.wait_timeout(self.backoff) {
                        return None;
                    }
                    self.backoff = (self.backoff * 2).min(self.max_reconnect_timeout);
                }
            }
        }
    }
}

fn resolve_first(host: &str, port: u16) -> std::io::Result<std::net::SocketAddr> {
    use std::net::ToSocketAddrs;
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address found"))
}
