//! # ct_scraper
//!
//! Collects Cointelegraph articles into CSV files: the home page listing is
//! paged back to a cutoff date in a real browser, then every article page is
//! fetched and its metadata (title, author, views, shares, publish date,
//! tags) written out.
//!
//! ## Usage
//!
//! ```sh
//! ct_scraper step1 --date 2024-02-01   # listing -> source.html
//! ct_scraper step2 --date 2024-02-01   # source.html -> downloads/resources_*/result.csv
//! ct_scraper update --filepath downloads/resources_01-03-2024-10-05/result.csv
//! ```
//!
//! ## Architecture
//!
//! 1. **Crawling**: a WebDriver session clicks "load more" until the oldest
//!    listed article predates the cutoff ([`crawler`])
//! 2. **Listing extraction**: article URLs are pulled from the rendered
//!    listing and split by the `/news` rule ([`scrapers::listing`])
//! 3. **Detail extraction**: each article page is fetched over plain HTTP
//!    and parsed ([`scrapers::article`])
//! 4. **Output**: URL audit and result rows go to a timestamped run
//!    directory ([`outputs`])
//!
//! Failures exit with a code per error kind (see [`error::ErrorKind`]).

use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tfmt;
use tracing_subscriber::prelude::*;

mod cli;
mod config;
mod crawler;
mod error;
mod fetcher;
#[cfg(test)]
mod fixtures;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::Settings;
use error::ScrapeError;
use fetcher::HttpFetcher;

/// Install the process-wide subscriber: terse console lines filtered by
/// `RUST_LOG` (default `info`), plus a timestamped debug log appended to
/// `log_file` when given.
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tfmt::layer()
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    let (file, open_err) = match log_file.map(|p| OpenOptions::new().create(true).append(true).open(p)) {
        Some(Ok(f)) => (Some(f), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let file_layer = file.map(|f| {
        tfmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_timer(tfmt::time::UtcTime::rfc_3339())
            .with_writer(Mutex::new(f))
            .with_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .parse_lossy("ct_scraper=debug"),
            )
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    match open_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn run(cli: &Cli, settings: &Settings) -> Result<(), ScrapeError> {
    let fetcher = HttpFetcher::new(&settings.user_agent)?;
    pipeline::run(
        cli.step,
        cli.date.as_deref(),
        cli.filepath.as_deref(),
        settings,
        &fetcher,
    )
    .await
}

#[tokio::main]
async fn main() -> ExitCode {
    let start_time = std::time::Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(&cli);

    let log_file = match &settings {
        Ok(s) => Some(s.log_file.clone()),
        Err(_) => cli.log_file.clone(),
    };
    if let Err(e) = init_logging(log_file.as_deref()) {
        warn!(error = %e, "Cannot open log file; logging to console only");
    }

    info!("####### STARTING COINTELEGRAPH SCRAPER #######");
    debug!(?cli, "Parsed CLI arguments");

    let result = match settings {
        Ok(settings) => run(&cli, &settings).await,
        Err(e) => Err(e),
    };

    let elapsed = start_time.elapsed();
    match result {
        Ok(()) => {
            info!(step = ?cli.step, secs = elapsed.as_secs(), "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(severity = "critical", "Failed unexpectedly. Check logs.");
            error!(kind = ?e.kind(), error = %e, detail = ?e, "Exception occurred");
            e.exit_code()
        }
    }
}
