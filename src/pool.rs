//! Writer pool: N consumer threads draining the record channel into hourly
//! bucket files, with wait-group completion signalling.

use crate::bucket::HourBucket;
use crate::counters::Counters;
use crate::source::Hit;
use crate::writer::{write_record, FieldSpec};
use crossbeam_channel::{Receiver, Sender};
use indicatif::ProgressBar;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Per-writer tally, logged when the writer exits and rolled into the report.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriterSummary {
    pub worker: usize,
    pub written: u64,
    pub skipped: u64,
}

impl WriterSummary {
    pub fn processed(&self) -> u64 {
        self.written + self.skipped
    }
}

/// Everything a writer thread shares with the rest of the run. The `done`
/// sender is never sent on: each writer drops its clone on exit, and the
/// supervisor reads the resulting disconnect as "all writers finished".
#[derive(Clone)]
pub struct WriterShared {
    pub counters: Arc<Counters>,
    pub pb: Option<ProgressBar>,
    pub touched: Arc<Mutex<BTreeSet<HourBucket>>>,
    pub done: Sender<()>,
}

pub struct WriterPool {
    handles: Vec<JoinHandle<WriterSummary>>,
}

impl WriterPool {
    /// Start `n` writers over clones of the shared receiver.
    pub fn spawn(
        n: usize,
        records: Receiver<Hit>,
        fields: FieldSpec,
        out_dir: PathBuf,
        shared: WriterShared,
    ) -> Self {
        let n = n.max(1);
        let mut handles = Vec::with_capacity(n);
        for worker in 0..n {
            let records = records.clone();
            let fields = fields.clone();
            let out_dir = out_dir.clone();
            let shared = shared.clone();
            handles.push(thread::spawn(move || {
                writer_loop(worker, records, fields, out_dir, shared)
            }));
        }
        Self { handles }
    }

    /// Wait for every writer and collect the summaries. A panicked writer is
    /// logged and omitted; whatever it processed is already in the shared
    /// counters, and its dropped `done` handle still signalled completion.
    pub fn join(self) -> Vec<WriterSummary> {
        let mut summaries = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            match handle.join() {
                Ok(summary) => summaries.push(summary),
                Err(_) => tracing::error!("writer thread panicked"),
            }
        }
        summaries
    }
}

fn writer_loop(
    worker: usize,
    records: Receiver<Hit>,
    fields: FieldSpec,
    out_dir: PathBuf,
    shared: WriterShared,
) -> WriterSummary {
    let mut summary = WriterSummary { worker, ..Default::default() };
    while let Ok(hit) = records.recv() {
        shared.counters.inc_processed();
        if let Some(pb) = &shared.pb {
            pb.inc(1);
        }
        match write_record(&hit, &fields, &out_dir) {
            Ok(bucket) => {
                summary.written += 1;
                shared.counters.inc_written();
                shared.touched.lock().insert(bucket);
            }
            Err(_) => {
                // Reason already logged at the point of failure.
                summary.skipped += 1;
                shared.counters.inc_skipped();
            }
        }
    }
    tracing::info!("writer {} processed {} records", worker, summary.processed());
    // Returning drops `shared.done`: the wait-group decrement.
    summary
}
