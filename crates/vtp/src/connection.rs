//! Connection loop: drives one connected socket until it faults.

use std::{net::TcpStream, time::Duration};

use tracing::{debug, error, info};

use crate::{
    classify::{classify, PacketKind},
    error::ConnectionError,
    frame::{recv_frame, send_frame},
    response::{self, ROLE_ACK, ROLE_IAMALIVE},
    stop::StopSignal,
    VoEvent,
};

/// Runs the receive/classify/respond/dispatch loop on `sock` until a fault
/// occurs or `stop` is set.
///
/// Returns `Ok(())` on a clean stop-signalled exit; returns `Err` on any I/O
/// fault, timeout, or XML parse error (all of which are recoverable from the
/// supervisor's point of view — it reconnects).
pub fn run_connection<H>(
    sock: &mut TcpStream,
    ivorn: &str,
    iamalive_timeout: Duration,
    handler: &H,
    stop: &StopSignal,
) -> Result<(), ConnectionError>
where
    H: Fn(&[u8], &VoEvent),
{
    loop {
        if stop.is_set() {
            return Ok(());
        }

        let payload = recv_frame(sock, iamalive_timeout)?;
        debug!(bytes = payload.len(), "received packet");

        match classify(&payload)? {
            PacketKind::TransportIAmAlive { origin } => {
                debug!("received iamalive message");
                let reply =
                    response::form_response(ROLE_IAMALIVE, &origin, ivorn, &response::now_iso8601());
                send_frame(sock, &reply)?;
                debug!("sent iamalive response");
            }
            PacketKind::VOEvent { ivorn: event_ivorn } => {
                info!(ivorn = %event_ivorn, "received VOEvent");
                let reply =
                    response::form_response(ROLE_ACK, &event_ivorn, ivorn, &response::now_iso8601());
                send_frame(sock, &reply)?;
                debug!("sent ack response");

                let event = VoEvent { ivorn: event_ivorn };
                if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(&payload, &event)))
                    .is_err()
                {
                    error!("payload handler panicked; continuing connection");
                }
            }
            PacketKind::TransportOther | PacketKind::UnknownVOEvent | PacketKind::Unknown => {
                // no reply, no dispatch: classify() already logged the anomaly.
            }
        }
    }
}
