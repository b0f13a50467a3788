//! Error taxonomy for the export pipeline.
//!
//! Setup failures (output directory, client construction, count query) abort
//! the run and are carried as `anyhow::Error` with context at the call site.
//! `TransportError` covers everything that can go wrong between us and the
//! search backend mid-run: it permanently stops fetching, but records already
//! dispatched keep flowing to the writers. Per-record failures never surface
//! here at all; they are logged and counted as skips where they happen.

use thiserror::Error;

/// A failure talking to the search backend. Terminal for the scroll: after
/// one of these the source stays finished and no retry is attempted.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request never completed (connect, timeout, TLS, body decode).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("search backend returned HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The response was well-formed HTTP but not a usable scroll reply,
    /// e.g. a page without a `_scroll_id` to continue from.
    #[error("scroll protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}
