//! Query specification rendered into the search backend's bool-filter DSL.

use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Time-range plus optional domain restriction for an export run.
/// Field names are configurable so the tool is not welded to one mapping.
#[derive(Clone, Debug)]
pub struct QuerySpec {
    pub since: OffsetDateTime,    // inclusive lower bound on the timestamp field
    pub timestamp_field: String,  // range clause target
    pub domain: Option<String>,   // exact term match when set
    pub domain_field: String,     // term clause target
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            since: OffsetDateTime::now_utc() - Duration::days(1),
            timestamp_field: "@timestamp".to_string(),
            domain: None,
            domain_field: "url.domain".to_string(),
        }
    }
}

impl QuerySpec {
    /// Window covering the last `days` days up to now.
    pub fn last_days(days: i64) -> Self {
        Self {
            since: OffsetDateTime::now_utc() - Duration::days(days.max(0)),
            ..Default::default()
        }
    }

    pub fn with_timestamp_field(mut self, field: impl Into<String>) -> Self {
        self.timestamp_field = field.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_domain_field(mut self, field: impl Into<String>) -> Self {
        self.domain_field = field.into();
        self
    }

    /// Render the bool query: a `range` on the timestamp field, plus a `term`
    /// on the domain field when a domain is set. Formatting only fails for
    /// timestamps outside the RFC 3339 year range.
    pub fn to_dsl(&self) -> Result<Value, time::error::Format> {
        let since = self.since.format(&Rfc3339)?;

        let mut range = Map::new();
        range.insert(self.timestamp_field.clone(), json!({ "gte": since }));
        let mut filter = vec![json!({ "range": Value::Object(range) })];

        if let Some(domain) = &self.domain {
            let mut term = Map::new();
            term.insert(self.domain_field.clone(), Value::String(domain.clone()));
            filter.push(json!({ "term": Value::Object(term) }));
        }

        Ok(json!({ "bool": { "filter": filter } }))
    }
}
