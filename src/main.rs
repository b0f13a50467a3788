use anyhow::Result;
use clap::Parser;
use esdrain::{init_tracing_once, EsDrain};
use std::path::PathBuf;
use std::time::Duration;

/// Export recent documents from a search index into hourly text files.
#[derive(Parser, Debug)]
#[command(name = "esdrain", version, about)]
struct Cli {
    /// Base URL of the search backend, e.g. https://es.example.com:9200
    #[arg(long, env = "ESDRAIN_URL")]
    url: String,

    /// API key sent as "Authorization: ApiKey <key>"
    #[arg(long, env = "ESDRAIN_API_KEY")]
    api_key: Option<String>,

    /// Index name or pattern to export from (may include '*')
    #[arg(long, env = "ESDRAIN_INDEX")]
    index: String,

    /// Keep only documents whose url.domain equals this value
    #[arg(long)]
    domain: Option<String>,

    /// How many days back from now to export
    #[arg(long, default_value_t = 1)]
    days: i64,

    /// Number of writer threads
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Scroll page size
    #[arg(long, default_value_t = 1000)]
    page_size: usize,

    /// Directory the hourly files are written into
    #[arg(long, default_value = "logdir")]
    out_dir: PathBuf,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();

    let mut drain = EsDrain::new()
        .endpoint(&cli.url)
        .index(cli.index)
        .days_back(cli.days)
        .workers(cli.threads)
        .page_size(cli.page_size)
        .output_dir(&cli.out_dir)
        .request_timeout(Duration::from_secs(cli.timeout))
        .progress(!cli.no_progress);
    if let Some(key) = cli.api_key {
        drain = drain.api_key(key);
    }
    if let Some(domain) = cli.domain {
        drain = drain.domain(domain);
    }

    let report = drain.run()?;
    println!(
        "Wrote {} records ({} skipped) across {} hourly files in {}",
        report.written,
        report.skipped,
        report.files,
        cli.out_dir.display()
    );
    if report.transport_error.is_some() {
        println!(
            "Export ended early: processed {} of an estimated {} records",
            report.processed, report.estimated_total
        );
    }
    Ok(())
}
