//! Browser-driven listing crawler (stage 1).
//!
//! The home page only reveals older teasers when the "load more" button is
//! clicked, so the listing has to be rendered in a real browser. The
//! crawler moves through four states:
//!
//! ```text
//! Start ──accept cookies──▶ CookieAccepted ──listing visible──▶ Loading
//!   Loading ──oldest article >= cutoff──▶ click "load more", wait for growth, Loading
//!   Loading ──oldest article <  cutoff──▶ Loaded (page markup returned)
//! ```
//!
//! Waits poll the page for a condition (listing present, entry count grown)
//! under a [`WaitPolicy`] instead of sleeping for fixed periods.

use crate::config::{Settings, WaitPolicy};
use crate::error::{Result, ScrapeError};
use crate::fetcher::FetchText;
use crate::scrapers::PageExtractor;
use crate::scrapers::article::PublishDateProbe;
use crate::scrapers::listing::{LISTING_CONTAINER, LISTING_ENTRY, ListingPage};
use chrono::NaiveDate;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub const ACCEPT_COOKIES_BUTTON: &str = "button.btn.privacy-policy__accept-btn";
pub const LOAD_MORE_BUTTON: &str = "button.btn.posts-listing__more-btn";

/// The browser operations the crawler needs.
pub trait BrowserSession {
    async fn goto(&self, url: &str) -> Result<()>;

    /// Click the first element matching `css`; [`ScrapeError::ElementNotFound`]
    /// when nothing matches.
    async fn click(&self, css: &str) -> Result<()>;

    /// Number of elements currently matching `css`.
    async fn count(&self, css: &str) -> Result<usize>;

    async fn page_source(&self) -> Result<String>;

    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// A WebDriver session (geckodriver by default) driven through fantoccini.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    #[instrument(level = "info")]
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut caps = serde_json::Map::new();
        if headless {
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": ["-headless"] }));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": ["--headless"] }));
        }
        let mut builder = ClientBuilder::native();
        builder.capabilities(caps);
        let client = builder.connect(webdriver_url).await.map_err(|e| {
            ScrapeError::Browser(format!("cannot open session at {webdriver_url}: {e}"))
        })?;
        info!("Started automated browser session");
        Ok(Self { client })
    }
}

fn browser_err(action: &str, e: fantoccini::error::CmdError) -> ScrapeError {
    ScrapeError::Browser(format!("{action}: {e}"))
}

impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| browser_err("navigation failed", e))
    }

    async fn click(&self, css: &str) -> Result<()> {
        let element = self
            .client
            .find(Locator::Css(css))
            .await
            .map_err(|e| {
                if e.is_no_such_element() {
                    ScrapeError::ElementNotFound(css.to_string())
                } else {
                    browser_err("lookup failed", e)
                }
            })?;
        element
            .click()
            .await
            .map(|_| ())
            .map_err(|e| browser_err("click failed", e))
    }

    async fn count(&self, css: &str) -> Result<usize> {
        self.client
            .find_all(Locator::Css(css))
            .await
            .map(|found| found.len())
            .map_err(|e| browser_err("lookup failed", e))
    }

    async fn page_source(&self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| browser_err("reading page source failed", e))
    }

    async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| browser_err("closing session failed", e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlState {
    Start,
    CookieAccepted,
    Loading { rounds: usize },
}

pub struct ListingCrawler {
    site_root: String,
    listing: ListingPage,
    wait: WaitPolicy,
}

impl ListingCrawler {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            site_root: settings.site_root.clone(),
            listing: ListingPage::new(&settings.site_root)?,
            wait: settings.wait,
        })
    }

    /// Run [`crawl`](Self::crawl) and close the session whatever the outcome.
    ///
    /// # Arguments
    ///
    /// * `session` - The browser session; consumed and always closed
    /// * `fetcher` - Used to read publish dates of listed articles
    /// * `cutoff` - Oldest publish date the listing must reach back to
    ///
    /// # Returns
    ///
    /// The rendered listing markup. A failed close is only logged, so a
    /// finished crawl is never lost to cleanup; a crawl error wins over a
    /// close error.
    pub async fn crawl_and_close<S, F>(&self, session: S, fetcher: &F, cutoff: NaiveDate) -> Result<String>
    where
        S: BrowserSession,
        F: FetchText,
    {
        let result = self.crawl(&session, fetcher, cutoff).await;
        let closed = session.close().await;
        if let Err(close_err) = closed {
            warn!(error = %close_err, "Browser session did not close cleanly");
        }
        result
    }

    /// Load listing pages until the oldest shown article predates `cutoff`,
    /// then return the rendered markup.
    #[instrument(level = "info", skip_all, fields(%cutoff))]
    pub async fn crawl<S, F>(&self, session: &S, fetcher: &F, cutoff: NaiveDate) -> Result<String>
    where
        S: BrowserSession,
        F: FetchText,
    {
        let mut state = CrawlState::Start;
        loop {
            state = match state {
                CrawlState::Start => {
                    session.goto(&self.site_root).await?;
                    session.click(ACCEPT_COOKIES_BUTTON).await?;
                    debug!("Clicked accept button");
                    CrawlState::CookieAccepted
                }
                CrawlState::CookieAccepted => {
                    sleep(self.wait.initial_settle()).await;
                    self.wait_for_count(session, LISTING_CONTAINER, 1).await?;
                    CrawlState::Loading { rounds: 0 }
                }
                CrawlState::Loading { rounds } => {
                    let html = session.page_source().await?;
                    let last_date = self.last_article_date(&html, fetcher).await?;
                    debug!(%last_date, rounds, "Last article date");

                    if last_date < cutoff {
                        info!(rounds, "Article too old; not loading any more articles");
                        return Ok(html);
                    }

                    debug!("Article under limit; loading more articles");
                    let shown = session.count(LISTING_ENTRY).await?;
                    session.click(LOAD_MORE_BUTTON).await?;
                    debug!(shown, "Pressed load more button");
                    self.wait_for_count(session, LISTING_ENTRY, shown + 1).await?;
                    CrawlState::Loading { rounds: rounds + 1 }
                }
            };
        }
    }

    /// Publish date of the last valid article in the rendered listing, read
    /// from the article's own page.
    async fn last_article_date<F: FetchText>(&self, html: &str, fetcher: &F) -> Result<NaiveDate> {
        let urls = self.listing.parse(html)?;
        let url = urls.last_valid().ok_or_else(|| {
            ScrapeError::Structure("listing shows no valid article".to_string())
        })?;
        debug!(%url, "Fetching last article data");
        PublishDateProbe.parse(&fetcher.fetch_text(url).await?)
    }

    /// Poll until at least `at_least` elements match `css`.
    async fn wait_for_count<S: BrowserSession>(&self, session: &S, css: &str, at_least: usize) -> Result<()> {
        let t0 = Instant::now();
        loop {
            let found = session.count(css).await?;
            if found >= at_least {
                debug!(css, found, waited_ms = t0.elapsed().as_millis() as u64, "Wait satisfied");
                return Ok(());
            }
            if t0.elapsed() >= self.wait.timeout() {
                return Err(ScrapeError::ElementNotFound(format!(
                    "{css} (wanted {at_least}, saw {found} after {:?})",
                    self.wait.timeout()
                )));
            }
            sleep(self.wait.poll_interval()).await;
        }
    }
}

/// Stage 1 entry point: open a browser, crawl, always close it.
///
/// # Arguments
///
/// * `settings` - Site root, WebDriver endpoint, headless flag and wait policy
/// * `fetcher` - HTTP client for the publish date lookups
/// * `cutoff` - Stop loading once the last listed article is older than this
///
/// # Returns
///
/// The rendered listing markup, ready to be saved as the snapshot.
pub async fn collect_listing<F: FetchText>(settings: &Settings, fetcher: &F, cutoff: NaiveDate) -> Result<String> {
    let crawler = ListingCrawler::new(settings)?;
    let session = WebDriverSession::connect(&settings.webdriver_url, settings.headless).await?;
    crawler.crawl_and_close(session, fetcher, cutoff).await
}
