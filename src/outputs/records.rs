//! CSV persistence for URL audits and article results.

use crate::error::{Result, ScrapeError};
use crate::models::{Article, ArticleRow, RESULT_HEADERS, UrlSet};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Write every discovered URL with its `valid`/`invalid` label.
#[instrument(level = "debug", skip(urls), fields(path = %path.display(), count = urls.len()))]
pub fn write_url_audit(path: &Path, urls: &UrlSet) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for row in urls.audit_rows() {
        writer.serialize(row)?;
    }
    // serialize() only emits headers with the first row
    if urls.is_empty() {
        writer.write_record(["url", "validity"])?;
    }
    writer.flush()?;
    debug!("Finished writing URLs to CSV");
    Ok(())
}

/// Incremental writer for `result.csv`; every row is flushed to disk as soon
/// as it is appended, so a crash keeps everything written so far.
pub struct ResultWriter {
    writer: Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl ResultWriter {
    /// Create (truncate) the file and write the header row.
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
        writer.write_record(RESULT_HEADERS)?;
        writer.flush()?;
        debug!(path = %path.display(), "Result csv file created");
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    /// Append one article row and flush it.
    ///
    /// # Arguments
    ///
    /// * `article` - The extracted article; tags are stored as a JSON array
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Csv`] when the row cannot be serialized or written.
    pub fn append(&mut self, article: &Article) -> Result<()> {
        self.writer.serialize(ArticleRow::from(article))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and close, returning the number of article rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        info!(path = %self.path.display(), rows = self.rows, "Closed result csv");
        Ok(self.rows)
    }
}

/// Write a batch of articles in one pass.
pub fn write_articles(path: &Path, articles: &[Article]) -> Result<usize> {
    let mut writer = ResultWriter::create(path)?;
    for article in articles {
        writer.append(article)?;
    }
    writer.finish()
}

fn read_error(path: &Path, e: csv::Error) -> ScrapeError {
    if e.is_io_error() {
        ScrapeError::Csv(e)
    } else {
        ScrapeError::Format(format!("{}: {e}", path.display()))
    }
}

/// Values of the `url` column, in row order.
///
/// The column may sit at any position and rows may be ragged.
///
/// # Arguments
///
/// * `path` - CSV file with a header row
///
/// # Returns
///
/// The URLs as written, including ones that fail the `/news` rule.
///
/// # Errors
///
/// [`ScrapeError::Format`] when there is no `url` header or a row has no
/// value for it; [`ScrapeError::Csv`] on read failures.
#[instrument(level = "debug", fields(path = %path.display()))]
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    let idx = reader
        .headers()
        .map_err(|e| read_error(path, e))?
        .iter()
        .position(|h| h.trim() == "url")
        .ok_or_else(|| ScrapeError::Format(format!("{} has no `url` column", path.display())))?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| read_error(path, e))?;
        match record.get(idx) {
            Some(url) => urls.push(url.to_string()),
            None => {
                return Err(ScrapeError::Format(format!(
                    "{}: row {} has no url value",
                    path.display(),
                    urls.len() + 1
                )));
            }
        }
    }
    debug!(count = urls.len(), "Extracted URLs from CSV");
    Ok(urls)
}
