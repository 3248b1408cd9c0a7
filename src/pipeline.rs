//! Pipeline driver: the three CLI steps.
//!
//! 1. **Collect** (`step1`): crawl the listing in a browser back to the
//!    cutoff and save the rendered markup to the snapshot file
//! 2. **Parse** (`step2`): read the snapshot, extract article URLs, fetch
//!    each article in listing order into a fresh run directory
//! 3. **Update**: like Parse, but the URLs come from the `url` column of an
//!    earlier CSV
//!
//! The listing is newest first, so the scan stops at the first article
//! older than the cutoff; nothing after it is fetched.

use crate::cli::Step;
use crate::config::Settings;
use crate::crawler::collect_listing;
use crate::error::{Result, ScrapeError};
use crate::fetcher::FetchText;
use crate::models::{Article, UrlSet};
use crate::outputs::RunDirectory;
use crate::outputs::records::{ResultWriter, read_urls, write_articles, write_url_audit};
use crate::outputs::snapshot::{read_snapshot, write_snapshot};
use crate::scrapers::PageExtractor;
use crate::scrapers::article::ArticlePage;
use crate::scrapers::listing::ListingPage;
use crate::utils::{
    epoch_cutoff, parse_date, parse_publish_date, validate_date_arg, validate_file_path_arg,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// What a Parse or Update run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_dir: PathBuf,
    pub candidates: usize,
    pub written: usize,
    /// The scan hit an article older than the cutoff.
    pub stopped_early: bool,
}

/// Validate `--date` and turn it into a cutoff.
pub fn cutoff_from_arg(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(text) if validate_date_arg(date) => parse_date(text),
        _ => Err(ScrapeError::Validation(format!(
            "--date must be a YYYY-MM-DD date no later than today (got {date:?})"
        ))),
    }
}

/// Dispatch one CLI step. Arguments are validated before any browser or
/// network activity.
///
/// # Arguments
///
/// * `step` - Which stage to run
/// * `date` - Raw `--date` value; required by `step1` and `step2`
/// * `filepath` - Raw `--filepath` value; required by `update`
/// * `settings` - Resolved settings
/// * `fetcher` - HTTP client used for every page fetch
///
/// # Returns
///
/// `Ok(())` on success, or the first error, whose kind picks the exit code.
pub async fn run<F: FetchText>(
    step: Step,
    date: Option<&str>,
    filepath: Option<&Path>,
    settings: &Settings,
    fetcher: &F,
) -> Result<()> {
    let now = Local::now().naive_local();
    match step {
        Step::Step1 => collect(settings, fetcher, cutoff_from_arg(date)?).await,
        Step::Step2 => parse(settings, fetcher, cutoff_from_arg(date)?, now)
            .await
            .map(|_| ()),
        Step::Update => update(settings, fetcher, filepath, now).await.map(|_| ()),
    }
}

/// Stage 1: crawl the listing back to `cutoff` and overwrite the snapshot
/// file with the rendered markup.
///
/// # Arguments
///
/// * `settings` - Browser settings and the snapshot path (`source_file`)
/// * `fetcher` - Used by the crawler to read publish dates
/// * `cutoff` - Oldest publish date the listing must reach
#[instrument(level = "info", skip_all, fields(%cutoff))]
pub async fn collect<F: FetchText>(settings: &Settings, fetcher: &F, cutoff: NaiveDate) -> Result<()> {
    info!("Starting automated browser window");
    let html = collect_listing(settings, fetcher, cutoff).await?;
    write_snapshot(&settings.source_file, &html).await?;
    info!("Step 1 complete");
    Ok(())
}

/// Stage 2: extract article URLs from the snapshot and fetch them in
/// listing order until one predates `cutoff`.
///
/// # Arguments
///
/// * `settings` - Snapshot path, downloads directory and result mode
/// * `fetcher` - HTTP client for the article pages
/// * `cutoff` - Articles published before this date end the scan
/// * `now` - Timestamp that names the run directory
///
/// # Returns
///
/// A [`RunSummary`] with the run directory and row counts.
#[instrument(level = "info", skip_all, fields(%cutoff, source = %settings.source_file.display()))]
pub async fn parse<F: FetchText>(
    settings: &Settings,
    fetcher: &F,
    cutoff: NaiveDate,
    now: NaiveDateTime,
) -> Result<RunSummary> {
    debug!("Collecting data from HTML file");
    let html = read_snapshot(&settings.source_file).await?;
    let urls = ListingPage::new(&settings.site_root)?.parse(&html)?;
    fetch_articles(settings, fetcher, &urls, cutoff, now).await
}

/// Refetch every URL listed in the `url` column of an earlier CSV.
///
/// # Arguments
///
/// * `csv_path` - Raw `--filepath` value; must name an existing file
/// * `now` - Timestamp that names the run directory
///
/// # Returns
///
/// A [`RunSummary`]. The cutoff is 1970-01-01, so every listed URL is
/// fetched.
#[instrument(level = "info", skip_all, fields(csv = ?csv_path))]
pub async fn update<F: FetchText>(
    settings: &Settings,
    fetcher: &F,
    csv_path: Option<&Path>,
    now: NaiveDateTime,
) -> Result<RunSummary> {
    let path = match csv_path {
        Some(path) if validate_file_path_arg(csv_path) => path,
        _ => {
            return Err(ScrapeError::Validation(format!(
                "--filepath must name an existing CSV file (got {csv_path:?})"
            )));
        }
    };
    info!(path = %path.display(), "UPDATE MODE: will update articles from CSV");
    let urls = UrlSet::new(read_urls(path)?);
    fetch_articles(settings, fetcher, &urls, epoch_cutoff(), now).await
}

/// Where fetched articles go.
enum ResultSink {
    Stream(ResultWriter),
    Batch(Vec<Article>),
}

impl ResultSink {
    fn open(settings: &Settings, path: &Path) -> Result<Self> {
        if settings.stream_results {
            Ok(ResultSink::Stream(ResultWriter::create(path)?))
        } else {
            Ok(ResultSink::Batch(Vec::new()))
        }
    }

    fn push(&mut self, article: Article) -> Result<()> {
        match self {
            ResultSink::Stream(writer) => writer.append(&article),
            ResultSink::Batch(articles) => {
                articles.push(article);
                Ok(())
            }
        }
    }

    fn finish(self, path: &Path) -> Result<usize> {
        match self {
            ResultSink::Stream(writer) => writer.finish(),
            ResultSink::Batch(articles) => write_articles(path, &articles),
        }
    }
}

async fn fetch_articles<F: FetchText>(
    settings: &Settings,
    fetcher: &F,
    urls: &UrlSet,
    cutoff: NaiveDate,
    now: NaiveDateTime,
) -> Result<RunSummary> {
    let run = RunDirectory::create(&settings.downloads_dir, now)?;
    write_url_audit(&run.urls_csv(), urls)?;

    let valid = urls.valid();
    debug!(found = valid.len(), discarded = urls.invalid().len(), "Validated URLs");

    let result_csv = run.result_csv();
    let mut sink = ResultSink::open(settings, &result_csv)?;
    let mut stopped_early = false;
    let total = valid.len();

    for (counter, url) in valid.iter().enumerate() {
        info!("Fetching article {}/{}", counter + 1, total);
        let html = fetcher.fetch_text(url).await?;
        let article = ArticlePage::new(url).parse(&html)?;
        let published = parse_publish_date(&article.date)?;
        if published < cutoff {
            info!(%url, %published, "Stopped fetching as articles too old");
            stopped_early = true;
            break;
        }
        sink.push(article)?;
        debug!("Article added");
    }

    let written = sink.finish(&result_csv)?;
    info!(
        candidates = total,
        written,
        stopped_early,
        run_dir = %run.path().display(),
        "Finished fetching articles"
    );
    Ok(RunSummary {
        run_dir: run.path().to_path_buf(),
        candidates: total,
        written,
        stopped_early,
    })
}
