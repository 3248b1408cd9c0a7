//! Page extractors for the Cointelegraph site.
//!
//! Every page type the scraper reads gets one [`PageExtractor`]
//! implementation. Extraction is a two-phase affair:
//!
//! 1. **Check**: confirm the containers the extractor relies on are present,
//!    failing fast with [`ScrapeError::Structure`] naming the missing
//!    selector when the site layout changed
//! 2. **Extract**: walk the containers and build the typed output
//!
//! | Page | Extractor | Output |
//! |------|-----------|--------|
//! | Home listing | [`listing::ListingPage`] | [`UrlSet`](crate::models::UrlSet) |
//! | Article | [`article::ArticlePage`] | [`Article`](crate::models::Article) |
//! | Article (date only) | [`article::PublishDateProbe`] | `NaiveDate` |

pub mod article;
pub mod listing;

use crate::error::{Result, ScrapeError};
use scraper::{ElementRef, Html, Selector};

pub trait PageExtractor {
    type Output;

    /// Fail with a structure error unless the page has the expected layout.
    fn check(&self, document: &Html) -> Result<()>;

    fn extract(&self, document: &Html) -> Result<Self::Output>;

    /// Parse markup, check it, then extract.
    fn parse(&self, markup: &str) -> Result<Self::Output> {
        let document = Html::parse_document(markup);
        self.check(&document)?;
        self.extract(&document)
    }
}

/// Compile a selector from a static string.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid static selector {css:?}: {e}"))
}

/// First match of `sel` under `scope`, or a structure error naming `what`.
pub(crate) fn require<'a>(
    scope: ElementRef<'a>,
    sel: &Selector,
    what: &str,
) -> Result<ElementRef<'a>> {
    scope
        .select(sel)
        .next()
        .ok_or_else(|| ScrapeError::Structure(format!("missing {what}")))
}

/// First match of `sel` in the whole document.
pub(crate) fn require_in<'a>(document: &'a Html, sel: &Selector, what: &str) -> Result<ElementRef<'a>> {
    document
        .select(sel)
        .next()
        .ok_or_else(|| ScrapeError::Structure(format!("missing {what}")))
}

/// All text under an element, trimmed.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
