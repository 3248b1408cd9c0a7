//! Data models for scraped articles and URL audit rows.
//!
//! - [`Article`]: metadata extracted from one article page
//! - [`ArticleRow`]: the flat CSV shape of an [`Article`]
//! - [`UrlSet`]: candidate URLs split into valid and invalid by the URL rule
//! - [`UrlAuditRow`]: one line of the `urls.csv` audit file

use crate::utils::is_url_valid;
use serde::{Deserialize, Serialize};

/// Column order of `result.csv`.
pub const RESULT_HEADERS: [&str; 8] = [
    "url", "title", "author", "views", "shares", "date", "diff", "tags",
];

/// Sentinel stored in `views`/`shares` when the page shows no such counter.
pub const MISSING_COUNT: i64 = -1;

/// Metadata of a single article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// The article URL the page was fetched from.
    pub url: String,
    pub title: String,
    pub author: String,
    /// View counter, or [`MISSING_COUNT`].
    pub views: i64,
    /// Share counter, or [`MISSING_COUNT`].
    pub shares: i64,
    /// Machine-readable publish date exactly as found on the page.
    pub date: String,
    /// Human-readable relative age, e.g. "2 hours ago".
    pub diff: String,
    /// Tag names in page order.
    pub tags: Vec<String>,
}

/// One row of `result.csv`. Tags are stored as a JSON array string so the
/// column survives commas inside tag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRow {
    pub url: String,
    pub title: String,
    pub author: String,
    pub views: i64,
    pub shares: i64,
    pub date: String,
    pub diff: String,
    pub tags: String,
}

impl From<&Article> for ArticleRow {
    fn from(article: &Article) -> Self {
        // a Vec<String> always serialises
        let tags = serde_json::to_string(&article.tags).unwrap_or_default();
        ArticleRow {
            url: article.url.clone(),
            title: article.title.clone(),
            author: article.author.clone(),
            views: article.views,
            shares: article.shares,
            date: article.date.clone(),
            diff: article.diff.clone(),
            tags,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    Valid,
    Invalid,
}

/// One row of `urls.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlAuditRow {
    pub url: String,
    pub validity: Validity,
}

/// Candidate URLs in discovery order, partitioned by [`is_url_valid`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSet {
    all: Vec<String>,
}

impl UrlSet {
    pub fn new(all: Vec<String>) -> Self {
        Self { all }
    }

    /// URLs that pass the rule, relative order preserved.
    pub fn valid(&self) -> Vec<String> {
        self.all.iter().filter(|u| is_url_valid(u)).cloned().collect()
    }

    /// The last URL on the page that passes the rule, found by walking
    /// backward from the end of the listing.
    pub fn last_valid(&self) -> Option<&str> {
        self.all.iter().rev().find(|u| is_url_valid(u)).map(String::as_str)
    }

    pub fn invalid(&self) -> Vec<String> {
        self.all.iter().filter(|u| !is_url_valid(u)).cloned().collect()
    }

    /// Every discovered URL labelled with its validity, in discovery order.
    pub fn audit_rows(&self) -> Vec<UrlAuditRow> {
        self.all
            .iter()
            .map(|url| UrlAuditRow {
                url: url.clone(),
                validity: if is_url_valid(url) {
                    Validity::Valid
                } else {
                    Validity::Invalid
                },
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
