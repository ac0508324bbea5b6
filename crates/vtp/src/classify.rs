//! Packet classifier: parses a frame's XML payload and identifies its
//! message kind.

use base64::Engine as _;
use quick_xml::{
    events::Event,
    name::ResolveResult,
    reader::NsReader,
};
use tracing::error;

use crate::error::ClassifyError;

const TRANSPORT_NAMESPACES: [&[u8]; 3] = [
    b"http://telescope-networks.org/xml/Transport/v1.1",
    b"http://telescope-networks.org/schema/Transport/v1.1",
    b"http://www.telescope-networks.org/xml/Transport/v1.1",
];

const VOEVENT_NAMESPACES: [&[u8]; 2] =
    [b"http://www.ivoa.net/xml/VOEvent/v1.1", b"http://www.ivoa.net/xml/VOEvent/v2.0"];

/// The classified kind of an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketKind {
    /// Keep-alive from the server; carries the `<Origin>` text.
    TransportIAmAlive { origin: String },
    /// Any other transport role. Logged, never dispatched.
    TransportOther,
    /// A VOEvent payload with a usable `ivorn` attribute.
    VOEvent { ivorn: String },
    /// A VOEvent root missing its `ivorn` attribute. Logged, not dispatched.
    UnknownVOEvent,
    /// Any other root element.
    Unknown,
}

fn decode_root_payload(payload: &[u8]) {
    let encoded = base64::engine::general_purpose::STANDARD.encode(payload);
    error!(payload_base64 = %encoded, "failed to parse XML, logging payload");
}

/// Parses `payload` as XML and classifies the root element.
///
/// A parse failure is the only case that returns `Err`; every other anomaly
/// (missing role, missing ivorn, unrecognised root) is logged here and
/// surfaced as a [`PacketKind`] variant so the connection loop keeps running.
pub fn classify(payload: &[u8]) -> Result<PacketKind, ClassifyError> {
    let mut reader = NsReader::from_reader(payload);
    reader.config_mut().trim_text(true);

    loop {
        let resolved = match reader.read_resolved_event() {
            Ok(r) => r,
            Err(e) => {
                decode_root_payload(payload);
                return Err(e.into());
            }
        };

        match resolved {
            (ResolveResult::Bound(ns), Event::Start(e)) => {
                let ns = ns.into_inner();
                let local = e.local_name();
                let local = local.as_ref();

                if local == b"Transport" && TRANSPORT_NAMESPACES.contains(&ns) {
                    return classify_transport(&mut reader, &e);
                } else if local == b"VOEvent" && VOEVENT_NAMESPACES.contains(&ns) {
                    return classify_voevent(&e);
                }
                error!(root = %String::from_utf8_lossy(local), "received XML document with unrecognized root tag");
                return Ok(PacketKind::Unknown);
            }
            (ResolveResult::Bound(ns), Event::Empty(e)) => {
                let ns = ns.into_inner();
                let local = e.local_name();
                let local = local.as_ref();

                if local == b"VOEvent" && VOEVENT_NAMESPACES.contains(&ns) {
                    return classify_voevent(&e);
                }
                if local == b"Transport" && TRANSPORT_NAMESPACES.contains(&ns) {
                    // a self-closed Transport tag has no Origin child to reply
                    // with, so even role="iamalive" degrades to "other".
                    error!("received self-closed transport message, no Origin available");
                    return Ok(PacketKind::TransportOther);
                }
                error!(root = %String::from_utf8_lossy(local), "received XML document with unrecognized root tag");
                return Ok(PacketKind::Unknown);
            }
            (_, Event::Eof) => {
                error!("XML document had no root element");
                return Ok(PacketKind::Unknown);
            }
            _ => {}
        }
    }
}

fn classify_voevent(e: &quick_xml::events::BytesStart<'_>) -> Result<PacketKind, ClassifyError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ivorn" {
            let ivorn = attr.unescape_value()?.into_owned();
            return Ok(PacketKind::VOEvent { ivorn });
        }
    }
    error!("received voevent message without ivorn");
    Ok(PacketKind::UnknownVOEvent)
}

fn classify_transport<'a>(
    reader: &mut NsReader<&'a [u8]>,
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<PacketKind, ClassifyError> {
    let mut role = None;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"role" {
            role = Some(attr.unescape_value()?.into_owned());
        }
    }

    let Some(role) = role else {
        error!("received transport message without a role");
        return Ok(PacketKind::TransportOther);
    };

    if role != "iamalive" {
        error!(%role, "received transport message with unrecognized role");
        return Ok(PacketKind::TransportOther);
    }

    // Scan forward for the <Origin> child's text content.
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) if start.local_name().as_ref() == b"Origin" => {
                match reader.read_event() {
                    Ok(Event::Text(t)) => {
                        let origin = t.unescape()?.into_owned();
                        return Ok(PacketKind::TransportIAmAlive { origin });
                    }
                    Ok(Event::End(_)) => {
                        return Ok(PacketKind::TransportIAmAlive { origin: String::new() });
                    }
                    Ok(_) | Err(_) => {
                        return Ok(PacketKind::TransportIAmAlive { origin: String::new() });
                    }
                }
            }
            Ok(Event::Eof) => {
                error!("iamalive message had no Origin element");
                return Ok(PacketKind::TransportIAmAlive { origin: String::new() });
            }
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Extracts the integer `./What/Param[@name='Packet_Type']/@value` text from
/// a VOEvent payload. Undefined (returns `None`) for non-VOEvent payloads or
/// payloads missing the parameter.
pub fn get_notice_type(payload: &[u8]) -> Option<i64> {
    let mut reader = NsReader::from_reader(payload);
    reader.config_mut().trim_text(true);

    let mut in_what = false;
    let mut what_depth = 0usize;
    let mut depth = 0usize;

    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => {
                depth += 1;
                let local = e.local_name();
                if local.as_ref() == b"What" {
                    in_what = true;
                    what_depth = depth;
                } else if in_what && local.as_ref() == b"Param" {
                    let mut name = None;
                    let mut value = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => name = attr.unescape_value().ok().map(|c| c.into_owned()),
                            b"value" => value = attr.unescape_value().ok().map(|c| c.into_owned()),
                            _ => {}
                        }
                    }
                    if name.as_deref() == Some("Packet_Type") {
                        return value.and_then(|v| v.parse().ok());
                    }
                }
            }
            Event::Empty(e) => {
                if in_what && e.local_name().as_ref() == b"Param" {
                    let mut name = None;
                    let mut value = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => name = attr.unescape_value().ok().map(|c| c.into_owned()),
                            b"value" => value = attr.unescape_value().ok().map(|c| c.into_owned()),
                            _ => {}
                        }
                    }
                    if name.as_deref() == Some("Packet_Type") {
                        return value.and_then(|v| v.parse().ok());
                    }
                }
            }
            Event::End(_) => {
                if in_what && depth == what_depth {
                    in_what = false;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}
