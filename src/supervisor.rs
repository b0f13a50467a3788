//! Progress supervision: periodic counter lines until every writer is done,
//! then the final success line naming the output directory.

use crate::counters::Counters;
use crossbeam_channel::{select, tick, Receiver};
use std::path::Path;
use std::time::{Duration, Instant};

/// Block until the `done` channel disconnects (all writers dropped their
/// handles), logging processed/estimated/elapsed every `every`. Nothing is
/// ever sent on `done`; the disconnect is the signal.
pub fn run(done: &Receiver<()>, counters: &Counters, every: Duration, started: Instant, output_dir: &Path) {
    let ticker = tick(every);
    loop {
        select! {
            recv(done) -> msg => {
                if msg.is_err() {
                    break;
                }
            }
            recv(ticker) -> _ => {
                tracing::info!(
                    "processed {} of {} records in {:.1?}",
                    counters.processed(),
                    counters.estimated(),
                    started.elapsed()
                );
            }
        }
    }
    tracing::info!("hourly files written to {}", output_dir.display());
}
