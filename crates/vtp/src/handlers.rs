//! Handler adapters: filters, archive-to-file, and queue hand-off.
//!
//! Every adapter composes with the plain `Fn(&[u8], &VoEvent)` handler
//! contract; decorator-style filtering becomes ordinary higher-order
//! functions returning closures.

use std::{collections::HashSet, path::Path, sync::mpsc};

use crate::{classify::get_notice_type, VoEvent};

/// Invokes `inner` only when the payload's notice type is one of `ids`.
pub fn include_notice_types<H>(
    ids: impl IntoIterator<Item = i64>,
    inner: H,
) -> impl Fn(&[u8], &VoEvent)
where
    H: Fn(&[u8], &VoEvent),
{
    let ids: HashSet<i64> = ids.into_iter().collect();
    move |payload, event| {
        if get_notice_type(payload).is_some_and(|t| ids.contains(&t)) {
            inner(payload, event);
        }
    }
}

/// Invokes `inner` only when the payload's notice type is *not* one of `ids`.
pub fn exclude_notice_types<H>(
    ids: impl IntoIterator<Item = i64>,
    inner: H,
) -> impl Fn(&[u8], &VoEvent)
where
    H: Fn(&[u8], &VoEvent),
{
    let ids: HashSet<i64> = ids.into_iter().collect();
    move |payload, event| {
        if !get_notice_type(payload).is_some_and(|t| ids.contains(&t)) {
            inner(payload, event);
        }
    }
}

/// Writes `payload` to `dir/urlencode(ivorn)`, truncating any existing file.
pub fn archive(dir: impl AsRef<Path>) -> impl Fn(&[u8], &VoEvent) {
    let dir = dir.as_ref().to_path_buf();
    move |payload, event| {
        let filename = percent_encode(&event.ivorn);
        let path = dir.join(filename);
        match std::fs::write(&path, payload) {
            Ok(()) => tracing::info!(ivorn = %event.ivorn, ?path, "archived payload"),
            Err(err) => tracing::error!(ivorn = %event.ivorn, ?path, %err, "failed to archive payload"),
        }
    }
}

/// `urllib.parse.quote_plus`-equivalent percent-encoding for IVORN filenames.
fn percent_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Non-blocking hand-off to an `mpsc` channel drained by a consumer on a
/// separate thread. The queue is unbounded; callers needing backpressure
/// should wrap `tx` in their own bounded channel before passing it here.
pub fn queue_handler_for(tx: mpsc::Sender<(Vec<u8>, VoEvent)>) -> impl Fn(&[u8], &VoEvent) {
    move |payload, event| {
        if tx.send((payload.to_vec(), event.clone())).is_err() {
            tracing::error!("queue handler: consumer has disconnected, dropping payload");
        }
    }
}
