mod bucket;
mod config;
mod record;
mod query;
mod counters;

mod error;
mod source;
mod client;

mod dispatch;
mod writer;
mod pool;
mod supervisor;
mod progress;
mod util;
mod pipeline;

pub use crate::config::ExportOptions;
pub use crate::pipeline::{EsDrain, ExportReport};
pub use crate::query::QuerySpec;
pub use crate::bucket::HourBucket;

// Expose the source seam so callers (and tests) can inject their own.
pub use crate::source::{Hit, Page, RecordSource};
pub use crate::client::{EsClient, EsScrollSource};
pub use crate::error::TransportError;

// Expose counters and per-record outcomes for callers that embed the pipeline.
pub use crate::counters::Counters;
pub use crate::record::SkipReason;
pub use crate::pool::{WriterPool, WriterShared, WriterSummary};

// Progress + tracing helpers so the binary can share them.
pub use crate::progress::make_count_progress;
pub use crate::util::init_tracing_once;
