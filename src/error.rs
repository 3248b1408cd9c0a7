//! Error taxonomy shared by every stage of the scraper.
//!
//! Each variant belongs to an [`ErrorKind`], and each kind maps to its own
//! process exit code so that scripts driving the scraper can tell a bad
//! argument from a changed page layout without parsing log output.

use std::process::ExitCode;
use thiserror::Error;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A CLI argument failed validation before any work started.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// Bad date text or CSV shape.
    #[error("format error: {0}")]
    Format(String),

    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Browser transport failure (WebDriver session or command).
    #[error("browser error: {0}")]
    Browser(String),

    /// An expected browser UI control never showed up.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// An expected HTML element is missing from a fetched page.
    #[error("page structure changed: {0}")]
    Structure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Format,
    Network,
    ElementNotFound,
    Structure,
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Validation => 2,
            ErrorKind::Format => 3,
            ErrorKind::Network => 4,
            ErrorKind::ElementNotFound => 5,
            ErrorKind::Structure => 6,
            ErrorKind::Io => 7,
        }
    }
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::Validation(_) => ErrorKind::Validation,
            ScrapeError::Format(_) => ErrorKind::Format,
            ScrapeError::Network { .. } | ScrapeError::Browser(_) => ErrorKind::Network,
            ScrapeError::ElementNotFound(_) => ErrorKind::ElementNotFound,
            ScrapeError::Structure(_) => ErrorKind::Structure,
            ScrapeError::Io(_) | ScrapeError::Csv(_) => ErrorKind::Io,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.kind().exit_code())
    }

    pub(crate) fn network(url: &str, source: reqwest::Error) -> Self {
        ScrapeError::Network {
            url: url.to_string(),
            source,
        }
    }
}
