//! Files written and read by the pipeline.
//!
//! # Submodules
//!
//! - [`records`]: the per-run `urls.csv` / `result.csv` files and reading URLs back
//! - [`snapshot`]: the intermediate listing snapshot handed from step 1 to step 2
//!
//! # Output Structure
//!
//! ```text
//! source.html                          # overwritten by every step1
//! downloads/
//! └── resources_01-03-2024-10-05/
//!     ├── urls.csv                     # url,validity
//!     └── result.csv                   # url,title,author,views,shares,date,diff,tags
//! ```

pub mod records;
pub mod snapshot;

use crate::error::Result;
use crate::utils::run_dir_name;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

pub const URLS_CSV: &str = "urls.csv";
pub const RESULT_CSV: &str = "result.csv";

/// Timestamped output folder of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    /// Create `<downloads_dir>/resources_<dd-mm-YYYY-HH-MM>`. A folder left by
    /// an earlier run in the same minute is written into, not rejected.
    #[instrument(level = "debug", skip(downloads_dir), fields(downloads_dir = %downloads_dir.display()))]
    pub fn create(downloads_dir: &Path, now: NaiveDateTime) -> Result<Self> {
        let path = downloads_dir.join(run_dir_name(now));
        std::fs::create_dir_all(&path)?;
        debug!(path = %path.display(), "Created run directory");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn urls_csv(&self) -> PathBuf {
        self.path.join(URLS_CSV)
    }

    pub fn result_csv(&self) -> PathBuf {
        self.path.join(RESULT_CSV)
    }
}
