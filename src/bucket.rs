use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, UtcOffset};

/// "YYYY-MM-DD-HH" hour key with ordering; one bucket names one output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourBucket {
    date: Date,
    hour: u8, // 0..=23
}

impl HourBucket {
    /// Parse an RFC 3339 timestamp (fractional seconds and offsets accepted)
    /// and truncate to the UTC hour it falls in. Offset-bearing timestamps
    /// are normalized so one absolute hour always maps to one bucket.
    pub fn from_rfc3339(ts: &str) -> Result<Self, time::error::Parse> {
        Ok(Self::from_datetime(OffsetDateTime::parse(ts, &Rfc3339)?))
    }

    pub fn from_datetime(dt: OffsetDateTime) -> Self {
        let utc = dt.to_offset(UtcOffset::UTC);
        Self { date: utc.date(), hour: utc.hour() }
    }

    /// File name for this bucket, e.g. "2024-01-01-10.txt".
    pub fn file_name(&self) -> String {
        format!("{self}.txt")
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}-{:02}",
            self.date.year(),
            self.date.month() as u8,
            self.date.day(),
            self.hour
        )
    }
}
