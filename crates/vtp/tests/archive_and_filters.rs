//! Archive handler and filter composition over a pair of representative
//! payloads (standing in for `gbm_flt_pos.xml` / `kill_socket.xml`-style
//! fixtures).

use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};

use vtp::{classify::get_notice_type, handlers, VoEvent};

const GBM_FLT_POS: &[u8] = br#"<voe:VOEvent ivorn="ivo://nasa.gsfc.gcn/Fermi#GBM_Flt_Pos_2024-01-01T00:00:00.00_123456_1-000"
    xmlns:voe="http://www.ivoa.net/xml/VOEvent/v2.0">
    <What><Param name="Packet_Type" value="111"/></What>
</voe:VOEvent>"#;

const KILL_SOCKET: &[u8] = br#"<voe:VOEvent ivorn="ivo://nasa.gsfc.gcn/KILL_SOCKET-000"
    xmlns:voe="http://www.ivoa.net/xml/VOEvent/v2.0">
    <What><Param name="Packet_Type" value="999"/></What>
</voe:VOEvent>"#;

fn ivorn_of(payload: &[u8]) -> String {
    match vtp::classify::classify(payload).unwrap() {
        vtp::classify::PacketKind::VOEvent { ivorn } => ivorn,
        other => panic!("expected VOEvent, got {other:?}"),
    }
}

#[test]
fn archive_writes_both_payloads_under_their_ivorn_filenames() {
    let dir = tempfile::tempdir().unwrap();
    let archiver = handlers::archive(dir.path());

    for payload in [GBM_FLT_POS, KILL_SOCKET] {
        let event = VoEvent { ivorn: ivorn_of(payload) };
        archiver(payload, &event);
    }

    for payload in [GBM_FLT_POS, KILL_SOCKET] {
        let ivorn = ivorn_of(payload);
        let filename: String = url::form_urlencoded::byte_serialize(ivorn.as_bytes()).collect();
        let contents = std::fs::read(dir.path().join(filename)).unwrap();
        assert_eq!(contents, payload);
    }
}

#[test]
fn include_filter_invokes_handler_once_for_matching_type() {
    let count = Arc::new(AtomicUsize::new(0));
    let last_type = Arc::new(std::sync::Mutex::new(None));
    let (c, t) = (count.clone(), last_type.clone());

    let handler = handlers::include_notice_types([111], move |payload, _event| {
        c.fetch_add(1, Ordering::SeqCst);
        *t.lock().unwrap() = get_notice_type(payload);
    });

    for payload in [GBM_FLT_POS, KILL_SOCKET] {
        let event = VoEvent { ivorn: ivorn_of(payload) };
        handler(payload, &event);
    }

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(*last_type.lock().unwrap(), Some(111));
}

#[test]
fn exclude_filter_invokes_handler_once_for_nonmatching_type() {
    let count = Arc::new(AtomicUsize::new(0));
    let last_type = Arc::new(std::sync::Mutex::new(None));
    let (c, t) = (count.clone(), last_type.clone());

    let handler = handlers::exclude_notice_types([111], move |payload, _event| {
        c.fetch_add(1, Ordering::SeqCst);
        *t.lock().unwrap() = get_notice_type(payload);
    });

    for payload in [GBM_FLT_POS, KILL_SOCKET] {
        let event = VoEvent { ivorn: ivorn_of(payload) };
        handler(payload, &event);
    }

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(*last_type.lock().unwrap(), Some(999));
}
