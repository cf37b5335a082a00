use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::{Duration, Instant},
};

use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::page_scrapers::{scrape_page, CompiledSelectors, RankEntry, RankingPage, RankingSelectors, ScraperState};

mod chrome;

pub(crate) use chrome::ChromeProvider;


#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: Url, reason: String },
    #[error("Ranking view at {url} was not ready within {timeout:?}: {reason}")]
    NotReady { url: Url, timeout: Duration, reason: String },
    #[error("Could not read rendered content of {url}: {reason}")]
    Content { url: Url, reason: String },
}


/// An open browser session that can render pages one at a time.
pub(crate) trait PageSession {
    /// Navigates to `url`, waits up to `timeout` for `ready_selector` to match and
    /// returns the rendered markup.
    fn load(&mut self, url: &Url, ready_selector: &str, timeout: Duration) -> Result<String, LoadError>;

    fn close(&mut self);
}


/// Something that can start a [`PageSession`], e.g. a headless browser.
pub(crate) trait ContentProvider {
    const NAME: &'static str;
    type Session: PageSession;

    fn launch(&self) -> anyhow::Result<Self::Session>;
}


/// Closes the wrapped session when dropped, including while unwinding.
struct SessionGuard<S: PageSession>(S);


impl<S: PageSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.0
    }
}


impl<S: PageSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.0
    }
}


impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.0.close();
    }
}


pub(crate) struct RankingFetcher<P> {
    provider: P,
    selectors: CompiledSelectors,
    ready_timeout: Duration,
}


impl<P: ContentProvider> RankingFetcher<P> {
    /// Fails only if a selector does not parse.
    pub(crate) fn new(provider: P, selectors: &RankingSelectors, ready_timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self { provider, selectors: CompiledSelectors::new(selectors)?, ready_timeout })
    }

    /// Visits every url in order with one session and returns all rows found.
    ///
    /// Urls that fail to load are skipped with a warning. If the session cannot be
    /// started at all the result is empty.
    #[instrument(skip_all, fields(provider = P::NAME, urls = urls.len()))]
    pub(crate) fn fetch(&self, urls: &[Url]) -> Vec<RankEntry> {
        let session = match self.provider.launch() {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not start a browser session, continuing without ranking data: {e:#}");
                return Vec::new();
            }
        };
        let mut session = SessionGuard(session);

        let mut pages = Vec::with_capacity(urls.len());
        for url in urls {
            info!("Moving to: {url}");
            let start = Instant::now();

            let html = match session.load(url, &self.selectors.ready, self.ready_timeout) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping {url}: {e}");
                    continue;
                }
            };

            let page = scrape_page(&ScraperState { html, url: Arc::new(url.clone()), selectors: &self.selectors });
            info!(
                "Fetched {} items from {} in {:.2} sec",
                page.entries.len(),
                page.url,
                start.elapsed().as_secs_f64()
            );
            pages.push(page);
        }

        pages
            .into_iter()
            .reduce(|all: RankingPage, page| all + page)
            .map(|all| all.entries)
            .unwrap_or_default()
    }
}
