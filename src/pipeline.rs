use crate::client::{EsClient, EsScrollSource};
use crate::config::ExportOptions;
use crate::counters::Counters;
use crate::dispatch;
use crate::error::TransportError;
use crate::pool::{WriterPool, WriterShared};
use crate::progress::make_count_progress;
use crate::query::QuerySpec;
use crate::source::{Hit, RecordSource};
use crate::supervisor;
use crate::util::init_tracing_once;
use crate::writer::FieldSpec;
use anyhow::{ensure, Context, Result};
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct EsDrain {
    pub(crate) opts: ExportOptions,
}

/// What a finished run did. `transport_error` is set when the scroll died
/// mid-run; everything dispatched before the failure is still in the
/// written/skipped tallies and the run itself still counts as a success.
#[derive(Debug)]
pub struct ExportReport {
    pub estimated_total: u64,
    pub processed: u64,
    pub written: u64,
    pub skipped: u64,
    pub files: usize,
    pub elapsed: Duration,
    pub transport_error: Option<TransportError>,
}

impl EsDrain {
    pub fn new() -> Self {
        Self { opts: ExportOptions::default() }
    }

    // -------- Builder methods --------
    pub fn endpoint(mut self, url: impl AsRef<str>) -> Self { self.opts = self.opts.with_endpoint(url); self }
    pub fn api_key(mut self, key: impl Into<String>) -> Self { self.opts = self.opts.with_api_key(key); self }
    pub fn index(mut self, index: impl Into<String>) -> Self { self.opts = self.opts.with_index(index); self }
    pub fn domain(mut self, domain: impl Into<String>) -> Self { self.opts = self.opts.with_domain(domain); self }
    pub fn days_back(mut self, days: i64) -> Self { self.opts = self.opts.with_days_back(days); self }
    pub fn workers(mut self, n: usize) -> Self { self.opts = self.opts.with_workers(n); self }
    pub fn page_size(mut self, n: usize) -> Self { self.opts = self.opts.with_page_size(n); self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn timestamp_field(mut self, field: impl Into<String>) -> Self { self.opts = self.opts.with_timestamp_field(field); self }
    pub fn message_field(mut self, field: impl Into<String>) -> Self { self.opts = self.opts.with_message_field(field); self }
    pub fn domain_field(mut self, field: impl Into<String>) -> Self { self.opts = self.opts.with_domain_field(field); self }
    pub fn request_timeout(mut self, timeout: Duration) -> Self { self.opts = self.opts.with_request_timeout(timeout); self }
    pub fn scroll_keep_alive(mut self, ttl: impl Into<String>) -> Self { self.opts = self.opts.with_scroll_keep_alive(ttl); self }
    pub fn progress_interval(mut self, every: Duration) -> Self { self.opts = self.opts.with_progress_interval(every); self }

    /// Build the scroll source from the options and run the export.
    /// Everything that can fail in here is setup and aborts the run.
    pub fn run(self) -> Result<ExportReport> {
        init_tracing_once();
        ensure!(!self.opts.endpoint.is_empty(), "endpoint is required");
        ensure!(!self.opts.index.is_empty(), "index is required");

        fs::create_dir_all(&self.opts.output_dir).with_context(|| {
            format!("create output directory {}", self.opts.output_dir.display())
        })?;

        let client = EsClient::new(
            &self.opts.endpoint,
            self.opts.api_key.as_deref(),
            self.opts.request_timeout,
        )
        .context("construct search client")?;

        let mut query = QuerySpec::last_days(self.opts.days_back)
            .with_timestamp_field(&self.opts.timestamp_field)
            .with_domain_field(&self.opts.domain_field);
        if let Some(domain) = &self.opts.domain {
            query = query.with_domain(domain);
        }
        let dsl = query.to_dsl().context("render search query")?;

        let source = EsScrollSource::new(
            client,
            &self.opts.index,
            dsl,
            self.opts.page_size,
            &self.opts.scroll_keep_alive,
        );
        self.run_with_source(source)
    }

    /// Run the export over any record source. The output directory must
    /// already exist; `run` creates it, callers injecting a source own that
    /// step themselves.
    pub fn run_with_source<S>(self, mut source: S) -> Result<ExportReport>
    where
        S: RecordSource + Send + 'static,
    {
        init_tracing_once();
        let opts = self.opts;
        let started = Instant::now();

        // Count failure aborts the run before any page is fetched.
        let total = source
            .estimated_total()
            .context("estimate total matching records")?;
        tracing::info!("estimated {} matching records", total);

        let counters = Arc::new(Counters::new());
        counters.set_estimated(total);

        // One channel slot per writer: the fetch side stays at most one page
        // ahead of the writers.
        let (records_tx, records_rx) = bounded::<Hit>(opts.workers.max(1));
        let (done_tx, done_rx) = bounded::<()>(0);

        let pb = if opts.progress { Some(make_count_progress(total, "exporting")) } else { None };
        let touched = Arc::new(Mutex::new(BTreeSet::new()));

        let pool = WriterPool::spawn(
            opts.workers,
            records_rx,
            FieldSpec {
                timestamp: opts.timestamp_field.clone(),
                message: opts.message_field.clone(),
            },
            opts.output_dir.clone(),
            WriterShared {
                counters: Arc::clone(&counters),
                pb: pb.clone(),
                touched: Arc::clone(&touched),
                done: done_tx,
            },
        );
        let dispatcher = thread::spawn(move || dispatch::drain(source, records_tx));

        supervisor::run(&done_rx, &counters, opts.progress_interval, started, &opts.output_dir);

        let summaries = pool.join();
        tracing::debug!("{} writers exited cleanly", summaries.len());
        let transport_error = match dispatcher.join() {
            Ok(res) => res,
            Err(_) => {
                tracing::error!("dispatcher thread panicked");
                Some(TransportError::protocol("dispatcher thread panicked"))
            }
        };

        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let report = ExportReport {
            estimated_total: total,
            processed: counters.processed(),
            written: counters.written(),
            skipped: counters.skipped(),
            files: touched.lock().len(),
            elapsed: started.elapsed(),
            transport_error,
        };
        if let Some(e) = &report.transport_error {
            tracing::warn!(
                "source failed mid-run; exported {} of an estimated {} records: {e}",
                report.processed,
                report.estimated_total
            );
        }
        Ok(report)
    }
}
