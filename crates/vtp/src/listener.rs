//! Supervisor / listener entry: the outer open/process/cleanup/reconnect
//! loop.

use std::{net::Shutdown, time::Duration};

use tracing::{debug, warn};

use crate::{
    connection::run_connection,
    pool::{Endpoint, EndpointPool},
    stop::StopSignal,
    VoEvent,
};

/// Connects to `endpoints` and dispatches VOEvents to `handler` until `stop`
/// is set. Does not return on its own otherwise: connection faults are
/// recoverable and trigger a reconnect through the endpoint pool.
pub fn listen<H>(
    endpoints: Vec<Endpoint>,
    ivorn: &str,
    iamalive_timeout: Duration,
    max_reconnect_timeout: Duration,
    handler: &H,
    stop: &StopSignal,
) where
    H: Fn(&[u8], &VoEvent),
{
    let mut pool = EndpointPool::new(endpoints, iamalive_timeout, max_reconnect_timeout);

    while !stop.is_set() {
        let Some(mut sock) = pool.next_connected(stop) else {
            break;
        };

        if let Err(err) = run_connection(&mut sock, ivorn, iamalive_timeout, handler, stop) {
            warn!(%err, "connection lost, will reconnect");
        }

        if let Err(err) = sock.shutdown(Shutdown::Both) {
            debug!(%err, "error shutting down socket");
        }
    }
}
