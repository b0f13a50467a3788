//! The producer side of the pipeline: a paginated, finite stream of records.

use crate::error::TransportError;
use serde::Deserialize;
use serde_json::value::RawValue;

/// One batch of records as returned by the source. An empty page means the
/// source is exhausted.
pub type Page = Vec<Hit>;

/// One record off the wire: identifier plus the raw JSON payload. The payload
/// stays unparsed until a writer picks the record up, so a malformed document
/// costs one skip on one writer instead of failing a whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: Box<RawValue>,
}

impl Hit {
    /// Build a hit from a raw JSON string; handy for stub sources in tests.
    pub fn new(id: impl Into<String>, source: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: id.into(),
            source: RawValue::from_string(source.to_string())?,
        })
    }
}

/// A lazy, finite, non-restartable record stream with an upfront size
/// estimate. After `next_page` reports exhaustion or an error, the source
/// stays finished; callers never retry it.
pub trait RecordSource {
    /// Count the records matching the query before iteration begins. A
    /// failure here aborts the whole run; nothing has been fetched yet.
    fn estimated_total(&mut self) -> Result<u64, TransportError>;

    /// Fetch the next page: non-empty, empty (exhausted), or a transport
    /// failure (terminal).
    fn next_page(&mut self) -> Result<Page, TransportError>;
}
