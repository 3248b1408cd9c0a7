//! Home page listing.
//!
//! The listing is a `ul.posts-listing__list` whose `article` entries each
//! carry a `header a[href]` link relative to the site root. Hrefs are
//! resolved to absolute URLs and returned in page order, valid and invalid
//! alike; callers partition them through [`UrlSet`].

use super::{PageExtractor, require_in, selector};
use crate::error::{Result, ScrapeError};
use crate::models::UrlSet;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

pub const LISTING_CONTAINER: &str = "ul.posts-listing__list";
/// Selector counting rendered entries, used by the crawler to notice growth.
pub const LISTING_ENTRY: &str = "ul.posts-listing__list article";

static CONTAINER: Lazy<Selector> = Lazy::new(|| selector(LISTING_CONTAINER));
static ENTRY: Lazy<Selector> = Lazy::new(|| selector("article"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("header a[href]"));

#[derive(Debug, Clone)]
pub struct ListingPage {
    site_root: Url,
}

impl ListingPage {
    pub fn new(site_root: &str) -> Result<Self> {
        let site_root = Url::parse(site_root)
            .map_err(|e| ScrapeError::Format(format!("invalid site root {site_root:?}: {e}")))?;
        Ok(Self { site_root })
    }

    fn absolute(&self, href: &str) -> Result<String> {
        self.site_root
            .join(href)
            .map(|u| u.to_string())
            .map_err(|e| ScrapeError::Format(format!("unusable listing href {href:?}: {e}")))
    }
}

impl PageExtractor for ListingPage {
    type Output = UrlSet;

    fn check(&self, document: &Html) -> Result<()> {
        require_in(document, &CONTAINER, "listing container ul.posts-listing__list").map(|_| ())
    }

    #[instrument(level = "debug", skip_all)]
    fn extract(&self, document: &Html) -> Result<UrlSet> {
        let container = require_in(document, &CONTAINER, "listing container ul.posts-listing__list")?;

        let mut urls = Vec::new();
        for (idx, entry) in container.select(&ENTRY).enumerate() {
            let href = entry
                .select(&LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .ok_or_else(|| {
                    ScrapeError::Structure(format!("listing entry {idx} has no header link"))
                })?;
            urls.push(self.absolute(href)?);
        }

        debug!(count = urls.len(), "Extracted listing URLs");
        Ok(UrlSet::new(urls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::listing_html;

    #[test]
    fn test_extracts_absolute_urls_in_order() {
        let html = listing_html(&["/news/a", "/news/b", "https://cointelegraph.com/news/c"]);
        let set = ListingPage::new("https://cointelegraph.com")
            .unwrap()
            .parse(&html)
            .unwrap();
        assert_eq!(
            set.valid(),
            vec![
                "https://cointelegraph.com/news/a",
                "https://cointelegraph.com/news/b",
                "https://cointelegraph.com/news/c",
            ]
        );
    }

    #[test]
    fn test_filters_invalid_entries() {
        // N = 5 entries, K = 2 invalid
        let html = listing_html(&[
            "/news/one",
            "/magazine/feature",
            "/news/two",
            "/press-releases/pr",
            "/news/three",
        ]);
        let set = ListingPage::new("https://cointelegraph.com")
            .unwrap()
            .parse(&html)
            .unwrap();
        assert_eq!(set.len(), 5);
        let valid = set.valid();
        assert_eq!(valid.len(), 3);
        assert_eq!(
            valid,
            vec![
                "https://cointelegraph.com/news/one",
                "https://cointelegraph.com/news/two",
                "https://cointelegraph.com/news/three",
            ]
        );
        assert_eq!(
            set.invalid(),
            vec![
                "https://cointelegraph.com/magazine/feature",
                "https://cointelegraph.com/press-releases/pr",
            ]
        );
    }

    #[test]
    fn test_missing_container_is_structure_error() {
        let err = ListingPage::new("https://cointelegraph.com")
            .unwrap()
            .parse("<html><body><main><div>nothing</div></main></body></html>")
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Structure(ref m) if m.contains("posts-listing__list")));
    }

    #[test]
    fn test_entry_without_link_is_structure_error() {
        let html = r#"<ul class="posts-listing__list"><article><header>no link</header></article></ul>"#;
        let err = ListingPage::new("https://cointelegraph.com")
            .unwrap()
            .parse(html)
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Structure(_)));
    }

    #[test]
    fn test_empty_listing_yields_no_urls() {
        let set = ListingPage::new("https://cointelegraph.com")
            .unwrap()
            .parse(&listing_html(&[]))
            .unwrap();
        assert_eq!(set.len(), 0);
        assert_eq!(set.last_valid(), None);
    }

    #[test]
    fn test_bad_site_root() {
        assert!(matches!(
            ListingPage::new("not a url"),
            Err(ScrapeError::Format(_))
        ));
    }
}
