//! Anonymous receiver for the VOEvent Transport Protocol (VTP).
//!
//! A long-lived client connects to one of several configured endpoints,
//! performs VTP framing and the `iamalive` keep-alive handshake, parses each
//! XML payload, acknowledges it, and dispatches VOEvents to a user-supplied
//! handler — recovering transparently from network faults, malformed frames,
//! dead peers, and parser errors. [`server::serve`] is a companion test
//! server that replays recorded payloads to exercise the client end-to-end.
//!
//! See the module list below for the mapping onto the protocol's pieces:
//! framing ([`frame`]), reply synthesis ([`response`]), XML classification
//! ([`classify`]), endpoint cycling with backoff ([`pool`]), the
//! per-connection read/respond/dispatch loop ([`connection`]), the outer
//! reconnect supervisor ([`listener`]), handler composition ([`handlers`]),
//! and the replay server ([`server`]).

pub mod classify;
pub mod connection;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod listener;
pub mod pool;
pub mod response;
pub mod server;
pub mod stop;

pub use pool::{validate_host_port, Endpoint, EndpointPool};
pub use stop::StopSignal;

/// Default client identity used in responses when none is configured.
pub const DEFAULT_IVORN: &str = "ivo://python_voeventclient/anonymous";

/// Default `iamalive_timeout`, in seconds.
pub const DEFAULT_IAMALIVE_TIMEOUT_SECS: u64 = 150;

/// Default `max_reconnect_timeout`, in seconds.
pub const DEFAULT_MAX_RECONNECT_TIMEOUT_SECS: u64 = 1024;

/// Stand-in for the parsed XML root handed to payload handlers.
///
/// Re-parsing a borrowed tree across a closure boundary is awkward in Rust; a
/// handler that needs more than the IVORN can re-parse `payload` itself (see
/// [`classify::get_notice_type`] for the one field every provided adapter
/// needs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoEvent {
    pub ivorn: String,
}

/// Connects to `endpoints` and dispatches VOEvents to `handler` until `stop`
/// is set. Thin re-export of [`listener::listen`] at the crate root.
pub fn listen<H>(
    endpoints: Vec<Endpoint>,
    ivorn: &str,
    iamalive_timeout: std::time::Duration,
    max_reconnect_timeout: std::time::Duration,
    handler: &H,
    stop: &StopSignal,
) where
    H: Fn(&[u8], &VoEvent),
{
    listener::listen(endpoints, ivorn, iamalive_timeout, max_reconnect_timeout, handler, stop)
}
