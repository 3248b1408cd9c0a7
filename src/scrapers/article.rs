//! Article detail pages.
//!
//! All fields live under the page's `main article` element:
//!
//! | Field | Selector (inside the article) |
//! |-------|-------------------------------|
//! | title | first `h1` |
//! | author | `div.post-meta__author-name` |
//! | date / diff | `div.post-meta__publish-date time` (`datetime` attr / text) |
//! | views / shares | `div.post-actions__item_stat` items of the action bar |
//! | tags | `ul.tags-list__list li a` |
//!
//! A missing title, author, date, stats bar or tag list is a structure
//! error, as is a tag item without a link; there is no partial record. An
//! empty tag list is fine.

use super::{PageExtractor, require, require_in, selector, text_of};
use crate::error::{Result, ScrapeError};
use crate::models::{Article, MISSING_COUNT};
use crate::utils::parse_publish_date;
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("main article"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h1"));
static AUTHOR: Lazy<Selector> = Lazy::new(|| selector("div.post-meta__author-name"));
static PUBLISH_TIME: Lazy<Selector> = Lazy::new(|| selector("div.post-meta__publish-date time"));
static STATS: Lazy<Selector> =
    Lazy::new(|| selector("div.post-actions.post__block.post__block_post-actions"));
static STAT_ITEM: Lazy<Selector> =
    Lazy::new(|| selector("div.post-actions__item.post-actions__item_stat"));
static STAT_TITLE: Lazy<Selector> = Lazy::new(|| selector("span.post-actions__item-title"));
static STAT_COUNT: Lazy<Selector> = Lazy::new(|| selector("span.post-actions__item-count"));
static TAG_LIST: Lazy<Selector> = Lazy::new(|| selector("ul.tags-list__list"));
static TAG_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
static TAG_LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static POST_PAGE: Lazy<Selector> = Lazy::new(|| selector("main div.post-page__article"));

/// Extracts a full [`Article`] from the page served at `url`.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    url: String,
}

impl ArticlePage {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

impl PageExtractor for ArticlePage {
    type Output = Article;

    fn check(&self, document: &Html) -> Result<()> {
        let article = require_in(document, &ARTICLE, "article container `main article`")?;
        require(article, &TITLE, "title heading")?;
        require(article, &AUTHOR, "author name")?;
        require(article, &PUBLISH_TIME, "publish date element")?;
        require(article, &STATS, "stats container")?;
        require(article, &TAG_LIST, "tag list ul.tags-list__list")?;
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(url = %self.url))]
    fn extract(&self, document: &Html) -> Result<Article> {
        let article = require_in(document, &ARTICLE, "article container `main article`")?;

        let title = text_of(require(article, &TITLE, "title heading")?);
        debug!(%title, "Fetched title");

        let author = text_of(require(article, &AUTHOR, "author name")?);
        debug!(%author, "Fetched author");

        let time = require(article, &PUBLISH_TIME, "publish date element")?;
        let date = time
            .value()
            .attr("datetime")
            .ok_or_else(|| ScrapeError::Structure("publish date has no datetime attribute".into()))?
            .trim()
            .to_string();
        let diff = text_of(time);
        debug!(%date, %diff, "Fetched date and diff");

        let (views, shares) = read_stats(require(article, &STATS, "stats container")?)?;
        debug!(views, shares, "Fetched views and shares");

        let tags = read_tags(require(article, &TAG_LIST, "tag list ul.tags-list__list")?)?;
        debug!(tags = %tags.iter().join(" | "), "Fetched tags");

        Ok(Article {
            url: self.url.clone(),
            title,
            author,
            views,
            shares,
            date,
            diff,
            tags,
        })
    }
}

/// Walk the stats bar. An item whose label mentions "views" sets the view
/// count; any other labelled item is taken as the share count. Items
/// lacking a label or a count leave the sentinel untouched.
fn read_stats(stats: ElementRef<'_>) -> Result<(i64, i64)> {
    let mut views = MISSING_COUNT;
    let mut shares = MISSING_COUNT;
    for item in stats.select(&STAT_ITEM) {
        let (Some(label), Some(count)) = (
            item.select(&STAT_TITLE).next(),
            item.select(&STAT_COUNT).next(),
        ) else {
            debug!("Skipping stats item without label or count");
            continue;
        };
        let label = text_of(label).to_lowercase();
        let count = parse_count(&text_of(count))?;
        if label.contains("views") {
            views = count;
        } else {
            shares = count;
        }
    }
    Ok((views, shares))
}

/// Link text of every `li` in the tag list, in page order.
fn read_tags(list: ElementRef<'_>) -> Result<Vec<String>> {
    list.select(&TAG_ITEM)
        .map(|item| require(item, &TAG_LINK, "tag link").map(text_of))
        .collect()
}

/// Parse a displayed counter such as `1,234`.
fn parse_count(text: &str) -> Result<i64> {
    let digits: String = text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    digits
        .parse::<i64>()
        .map_err(|e| ScrapeError::Format(format!("invalid counter {text:?}: {e}")))
}

/// Reads only the canonical publish date of an article page. The crawler
/// uses it to decide whether the listing reaches back far enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishDateProbe;

impl PageExtractor for PublishDateProbe {
    type Output = NaiveDate;

    fn check(&self, document: &Html) -> Result<()> {
        let post = require_in(document, &POST_PAGE, "post container div.post-page__article")?;
        require(post, &PUBLISH_TIME, "publish date element").map(|_| ())
    }

    fn extract(&self, document: &Html) -> Result<NaiveDate> {
        let post = require_in(document, &POST_PAGE, "post container div.post-page__article")?;
        let time = require(post, &PUBLISH_TIME, "publish date element")?;
        let raw = time
            .value()
            .attr("datetime")
            .ok_or_else(|| ScrapeError::Structure("publish date has no datetime attribute".into()))?;
        parse_publish_date(raw)
    }
}
