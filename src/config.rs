use std::path::{Path, PathBuf};
use std::time::Duration;

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub endpoint: String,             // search backend base URL
    pub api_key: Option<String>,      // sent as "Authorization: ApiKey <key>"
    pub index: String,                // index name or pattern, may include '*'
    pub domain: Option<String>,       // optional exact-match domain filter
    pub days_back: i64,               // export window: now - days .. now
    pub workers: usize,               // writer threads
    pub page_size: usize,             // scroll batch size
    pub output_dir: PathBuf,          // hourly .txt files land here
    pub progress: bool,               // show progress bar

    // field names in the document payload
    pub timestamp_field: String,
    pub message_field: String,
    pub domain_field: String,

    // transport tuning
    pub request_timeout: Duration,    // per-request HTTP timeout
    pub scroll_keep_alive: String,    // server-side scroll context TTL

    pub progress_interval: Duration,  // cadence of the progress log line
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            index: String::new(),
            domain: None,
            days_back: 1,
            workers: 4,
            page_size: 1000,
            output_dir: PathBuf::from("logdir"),
            progress: true,

            timestamp_field: "@timestamp".to_string(),
            message_field: "message".to_string(),
            domain_field: "url.domain".to_string(),

            request_timeout: Duration::from_secs(60),
            scroll_keep_alive: "1m".to_string(),

            progress_interval: Duration::from_secs(10),
        }
    }
}

impl ExportOptions {
    pub fn with_endpoint(mut self, endpoint: impl AsRef<str>) -> Self {
        self.endpoint = endpoint.as_ref().trim_end_matches('/').to_string();
        self
    }
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
    pub fn with_days_back(mut self, days: i64) -> Self {
        self.days_back = days.max(0);
        self
    }
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.max(1);
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_timestamp_field(mut self, field: impl Into<String>) -> Self {
        self.timestamp_field = field.into();
        self
    }
    pub fn with_message_field(mut self, field: impl Into<String>) -> Self {
        self.message_field = field.into();
        self
    }
    pub fn with_domain_field(mut self, field: impl Into<String>) -> Self {
        self.domain_field = field.into();
        self
    }
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
    pub fn with_scroll_keep_alive(mut self, ttl: impl Into<String>) -> Self {
        self.scroll_keep_alive = ttl.into();
        self
    }
    pub fn with_progress_interval(mut self, every: Duration) -> Self {
        self.progress_interval = every.max(Duration::from_millis(10));
        self
    }
}
