//! The per-record write path: parse the payload, derive the hour bucket,
//! append the message line. Every failure mode here is a logged skip; this
//! module must never take the run down.

use crate::bucket::HourBucket;
use crate::record::{string_field, SkipReason};
use crate::source::Hit;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Payload field names the writers look up.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub timestamp: String,
    pub message: String,
}

/// Run one record through parse → timestamp → bucket → message → append.
/// Returns the bucket it was written to, or the reason it was dropped. The
/// message is validated before any file is opened, so a bad record leaves no
/// empty bucket file behind.
pub fn write_record(hit: &Hit, fields: &FieldSpec, out_dir: &Path) -> Result<HourBucket, SkipReason> {
    // The raw payload was validated as JSON when the hit was built, so this
    // parse cannot fail; a non-object payload falls through the field
    // lookups below and skips there.
    let payload: Value = serde_json::from_str(hit.source.get()).unwrap_or_default();

    let ts = match string_field(&payload, &fields.timestamp) {
        Some(s) => s,
        None => {
            tracing::warn!(id = %hit.id, field = %fields.timestamp, "skipping record: timestamp missing or not a string");
            return Err(SkipReason::MissingTimestamp);
        }
    };

    let bucket = match HourBucket::from_rfc3339(ts) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(id = %hit.id, timestamp = %ts, error = %e, "skipping record: unparsable timestamp");
            return Err(SkipReason::BadTimestamp);
        }
    };

    let message = match string_field(&payload, &fields.message) {
        Some(s) => s,
        None => {
            tracing::warn!(id = %hit.id, field = %fields.message, "skipping record: message missing or not a string");
            return Err(SkipReason::MissingMessage);
        }
    };

    let path = out_dir.join(bucket.file_name());
    if let Err(e) = append_line(&path, message) {
        tracing::warn!(id = %hit.id, path = %path.display(), error = %e, "skipping record: append failed");
        return Err(SkipReason::Io);
    }
    Ok(bucket)
}

/// Open-append-close with a single write of "message\n", so concurrent
/// writers interleave whole lines on the O_APPEND handle, never fragments.
fn append_line(path: &Path, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut line = String::with_capacity(message.len() + 1);
    line.push_str(message);
    line.push('\n');
    file.write_all(line.as_bytes())
}
