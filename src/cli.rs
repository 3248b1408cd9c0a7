//! Command-line interface definitions.
//!
//! The scraper runs one step per invocation:
//!
//! ```sh
//! # Stage 1: page through the listing in a browser until DATE
//! ct_scraper step1 --date 2024-02-01
//!
//! # Stage 2: fetch every article found in the saved listing
//! ct_scraper step2 --date 2024-02-01
//!
//! # Re-fetch the articles of an earlier result.csv
//! ct_scraper update --filepath downloads/resources_01-03-2024-10-00/result.csv
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which pipeline stage to run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Scrape the listing into the intermediate HTML file
    Step1,
    /// Parse the intermediate HTML file into article CSV rows
    Step2,
    /// Re-fetch articles for URLs listed in an existing CSV
    Update,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Parse data from cointelegraph.com")]
pub struct Cli {
    /// Which step to run
    #[arg(value_enum)]
    pub step: Step,

    /// Date limit (YYYY-MM-DD); must not be in the future
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// CSV file with a `url` column (update mode)
    #[arg(long, value_name = "FILEPATH")]
    pub filepath: Option<PathBuf>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver endpoint (geckodriver, chromedriver, ...)
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Directory holding per-run output folders
    #[arg(long)]
    pub downloads_dir: Option<PathBuf>,

    /// Intermediate listing snapshot path
    #[arg(long)]
    pub source_file: Option<PathBuf>,

    /// Log file, appended across runs
    #[arg(long, env = "CT_SCRAPER_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_step_with_date() {
        let cli = Cli::parse_from(["ct_scraper", "step2", "--date", "2024-02-01"]);
        assert_eq!(cli.step, Step::Step2);
        assert_eq!(cli.date.as_deref(), Some("2024-02-01"));
        assert!(cli.filepath.is_none());
    }

    #[test]
    fn test_cli_update_with_filepath() {
        let cli = Cli::parse_from(["ct_scraper", "update", "--filepath", "/tmp/result.csv"]);
        assert_eq!(cli.step, Step::Update);
        assert_eq!(cli.filepath, Some(PathBuf::from("/tmp/result.csv")));
    }

    #[test]
    fn test_cli_rejects_unknown_step() {
        assert!(Cli::try_parse_from(["ct_scraper", "step3"]).is_err());
    }

    #[test]
    fn test_cli_requires_step() {
        assert!(Cli::try_parse_from(["ct_scraper"]).is_err());
    }
}
