//! Replay server: a minimal test-only VTP server that replays a fixed
//! payload list to one connection at a time.
//!
//! State machine: `Bound -> Accepting -> Serving[conn] -> Accepting | Closed`.
//! Purely a testing aid: no backpressure, no concurrency beyond one
//! connection.

use std::{
    net::{Shutdown, TcpListener, TcpStream},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::{frame::send_frame, stop::StopSignal};

/// Binds `addr` and serves `payloads` forever, cycling through them with
/// `retransmit_timeout` spacing, one connection at a time.
///
/// Loops forever by design; see [`serve_for`] for a bounded-accept testing
/// variant.
pub fn serve(
    listener: &TcpListener,
    payloads: &[Vec<u8>],
    retransmit_timeout: Duration,
    stop: &StopSignal,
) {
    while !stop.is_set() {
        match listener.accept() {
            Ok((conn, addr)) => {
                info!(%addr, "client connected");
                serve_one(conn, payloads, retransmit_timeout, stop);
            }
            Err(err) => warn!(%err, "accept failed"),
        }
    }
}

/// Like [`serve`], but accepts at most `n` connections before returning.
/// Reserved for integration tests that need a bounded run.
pub fn serve_for(
    listener: &TcpListener,
    payloads: &[Vec<u8>],
    retransmit_timeout: Duration,
    n: usize,
    stop: &StopSignal,
) {
    for _ in 0..n {
        if stop.is_set() {
            return;
        }
        match listener.accept() {
            Ok((conn, addr)) => {
                info!(%addr, "client connected");
                serve_one(conn, payloads, retransmit_timeout, stop);
            }
            Err(err) => warn!(%err, "accept failed"),
        }
    }
}

fn serve_one(mut conn: TcpStream, payloads: &[Vec<u8>], retransmit_timeout: Duration, stop: &StopSignal) {
    let mut i = 0;
    loop {
        if stop.is_set() {
            break;
        }
        if let Err(err) = send_frame(&mut conn, &payloads[i]) {
            warn!(%err, "error communicating with peer");
            break;
        }
        i = (i + 1) % payloads.len();
        if stop.wait_timeout(retransmit_timeout) {
            break;
        }
    }

    // SO_LINGER(on, 0) forces an RST on close so the peer observes the
    // disconnect immediately instead of waiting on a graceful FIN.
    if let Err(err) = conn.set_linger(Some(Duration::ZERO)) {
        warn!(%err, "could not prepare to reset socket");
    }
    if let Err(err) = conn.shutdown(Shutdown::Both) {
        debug!(%err, "could not shut down socket");
    }
}
