//! The listing snapshot that stage 1 hands to stage 2.

use crate::error::Result;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Overwrite the snapshot with freshly rendered listing markup.
pub async fn write_snapshot(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, html).await?;
    info!(path = %path.display(), bytes = html.len(), "Saved listing snapshot");
    Ok(())
}

pub async fn read_snapshot(path: &Path) -> Result<String> {
    let html = fs::read_to_string(path).await?;
    debug!(path = %path.display(), bytes = html.len(), "Read listing snapshot");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_is_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("source.html");
        write_snapshot(&path, "<html>first, longer run</html>").await.unwrap();
        write_snapshot(&path, "<html>second</html>").await.unwrap();
        assert_eq!(read_snapshot(&path).await.unwrap(), "<html>second</html>");
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_snapshot(&tmp.path().join("source.html")).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
