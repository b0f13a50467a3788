use serde_json::Value;

/// Extract a string field from a parsed document payload.
/// Returns `None` when the field is absent or not a JSON string; a numeric
/// timestamp or object-valued message is a skip, not something to coerce.
pub fn string_field<'a>(v: &'a Value, field: &str) -> Option<&'a str> {
    v.get(field).and_then(|x| x.as_str())
}

/// Why a record was dropped instead of written. Every variant is logged at
/// the point of failure and counted; none of them stop the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Timestamp field absent or not a string.
    MissingTimestamp,
    /// Timestamp string did not parse as RFC 3339.
    BadTimestamp,
    /// Message field absent or not a string.
    MissingMessage,
    /// Append to the bucket file failed.
    Io,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::MissingTimestamp => "missing timestamp",
            SkipReason::BadTimestamp => "bad timestamp",
            SkipReason::MissingMessage => "missing message",
            SkipReason::Io => "append failed",
        };
        f.write_str(s)
    }
}
