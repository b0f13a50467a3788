use esdrain::{Hit, Page, RecordSource, TransportError};
use serde_json::json;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Scripted record source: serves the configured pages in order, then either
/// reports exhaustion (empty page) or fails with a transport error. Mirrors
/// the scroll contract without a backend.
pub struct StubSource {
    total: u64,
    pages: Vec<Page>,
    fail_after_pages: Option<usize>,
    fail_estimate: bool,
    served: usize,
}

impl StubSource {
    pub fn new(total: u64, pages: Vec<Page>) -> Self {
        Self { total, pages, fail_after_pages: None, fail_estimate: false, served: 0 }
    }

    /// Fail with a transport error once `n` pages have been served.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after_pages = Some(n);
        self
    }

    /// Make the upfront count query fail.
    pub fn failing_estimate(mut self) -> Self {
        self.fail_estimate = true;
        self
    }
}

impl RecordSource for StubSource {
    fn estimated_total(&mut self) -> Result<u64, TransportError> {
        if self.fail_estimate {
            return Err(TransportError::protocol("count refused"));
        }
        Ok(self.total)
    }

    fn next_page(&mut self) -> Result<Page, TransportError> {
        if let Some(n) = self.fail_after_pages {
            if self.served >= n {
                return Err(TransportError::protocol("scroll connection dropped"));
            }
        }
        if self.served >= self.pages.len() {
            return Ok(Page::new());
        }
        let page = self.pages[self.served].clone();
        self.served += 1;
        Ok(page)
    }
}

/// A hit whose payload carries the default timestamp/message fields.
pub fn log_hit(id: &str, ts: &str, message: &str) -> Hit {
    Hit::new(id, &json!({ "@timestamp": ts, "message": message }).to_string()).unwrap()
}

/// A hit with an arbitrary JSON payload (must be valid JSON; the wire format
/// guarantees that much), for the skip-path tests.
pub fn raw_hit(id: &str, payload: &str) -> Hit {
    Hit::new(id, payload).unwrap()
}

/// Fresh output directory; the pipeline expects it to exist already.
pub fn make_out_dir() -> PathBuf {
    tempfile::tempdir().unwrap().into_path()
}

/// Read a bucket file line-by-line (order across writers is unspecified).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Sorted file names in the output directory.
pub fn dir_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
