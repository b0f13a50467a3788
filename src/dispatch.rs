//! Single-threaded dispatcher: drains the source page by page and feeds
//! individual records to the writers over the bounded channel.

use crate::error::TransportError;
use crate::source::{Hit, RecordSource};
use crossbeam_channel::Sender;

/// Pump the source until it is exhausted or fails. `records` is the only
/// sender for the channel, so returning from here closes it exactly once;
/// sends block while every writer is busy, which is the backpressure.
///
/// Returns the transport error when the scroll died mid-run. Records already
/// sent stay in flight either way.
pub fn drain(mut source: impl RecordSource, records: Sender<Hit>) -> Option<TransportError> {
    let mut pages: u64 = 0;
    let mut sent: u64 = 0;
    loop {
        match source.next_page() {
            Ok(page) if page.is_empty() => {
                tracing::debug!("source exhausted after {pages} pages ({sent} records)");
                return None;
            }
            Ok(page) => {
                pages += 1;
                for hit in page {
                    if records.send(hit).is_err() {
                        // Only possible if every writer is gone; nothing left
                        // to feed, so stop fetching.
                        tracing::error!("all writers disconnected; stopping dispatch");
                        return None;
                    }
                    sent += 1;
                }
            }
            Err(e) => {
                tracing::warn!("stopping fetch after transport error: {e}");
                return Some(e);
            }
        }
    }
}
