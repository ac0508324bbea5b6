//! Response builder: synthesises `ack`/`iamalive` reply packets.
//!
//! The template is byte-exact up to the four substitutions so that a
//! receiving stack relying on string-matching still works. No XML
//! canonicalisation is performed, and the transport namespace emitted on
//! replies is always `schema/Transport/v1.1` even though three different
//! namespace URIs are accepted on receive (see `classify`).

use chrono::{Local, Timelike};

pub const ROLE_ACK: &str = "ack";
pub const ROLE_IAMALIVE: &str = "iamalive";

/// Returns the current local time formatted the way Python's
/// `datetime.now().isoformat()` would: `YYYY-MM-DDTHH:MM:SS.ffffff`, no zone,
/// and no fractional part at all when the microseconds happen to be zero
/// (Python's `isoformat()` omits `.000000` rather than printing it).
pub fn now_iso8601() -> String {
    let now = Local::now();
    if now.timestamp_subsec_micros() == 0 {
        now.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Builds a UTF-8 Transport response packet.
///
/// `role` is `"ack"` or `"iamalive"`; `origin` is the event's IVORN for an
/// ack or the Transport `<Origin>` text for an iamalive; `response` is this
/// client's own IVORN.
pub fn form_response(role: &str, origin: &str, response: &str, timestamp: &str) -> Vec<u8> {
    format!(
        "<?xml version='1.0' encoding='UTF-8'?><trn:Transport role=\"{role}\" version=\"1.0\" \
         xmlns:trn=\"http://telescope-networks.org/schema/Transport/v1.1\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"http://telescope-networks.org/schema/Transport/v1.1 \
         http://telescope-networks.org/schema/Transport-v1.1.xsd\"><Origin>{origin}</Origin>\
         <Response>{response}</Response><TimeStamp>{timestamp}</TimeStamp></trn:Transport>"
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    #[test]
    fn template_matches_wire_format_exactly() {
        let got = form_response("ack", "ivo://test/event#1", "ivo://me/anon", "2020-01-01T00:00:00.000000");
        let expected = "<?xml version='1.0' encoding='UTF-8'?><trn:Transport role=\"ack\" version=\"1.0\" xmlns:trn=\"http://telescope-networks.org/schema/Transport/v1.1\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:schemaLocation=\"http://telescope-networks.org/schema/Transport/v1.1 http://telescope-networks.org/schema/Transport-v1.1.xsd\"><Origin>ivo://test/event#1</Origin><Response>ivo://me/anon</Response><TimeStamp>2020-01-01T00:00:00.000000</TimeStamp></trn:Transport>";
        assert_eq!(String::from_utf8(got).unwrap(), expected);
    }

    #[test]
    fn response_round_trips_through_classifier() {
        let payload = form_response("iamalive", "ivo://origin/x", "ivo://me/anon", "2020-01-01T00:00:00.000000");
        let kind = classify(&payload).unwrap();
        match kind {
            crate::classify::PacketKind::TransportIAmAlive { origin } => {
                assert_eq!(origin, "ivo://origin/x");
            }
            other => panic!("expected iamalive, got {other:?}"),
        }
    }
}
