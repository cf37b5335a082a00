use std::{ops::Add, sync::Arc};

use anyhow::anyhow;
use scraper::Selector;
use serde::Deserialize;
use url::Url;

mod leaderboard;


/// One scraped leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RankEntry {
    pub(crate) user_id: String,
    pub(crate) points: u64,
}


impl RankEntry {
    pub(crate) fn new(user_id: impl Into<String>, points: u64) -> Self {
        Self { user_id: user_id.into(), points }
    }
}


/// CSS selectors describing the structure of a ranking page.
///
/// The defaults match the mixch event ranking tab.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct RankingSelectors {
    /// Appears once the ranking tab has finished rendering client side
    pub(crate) ready: String,
    /// One match per leaderboard row
    pub(crate) row: String,
    /// Profile link inside a row, the last path segment of its href is the user id
    pub(crate) user_link: String,
    /// Points node inside a row, comma grouped digits
    pub(crate) points: String,
}


impl Default for RankingSelectors {
    fn default() -> Self {
        Self {
            ready: "a.nav-link.active[data-rr-ui-event-key='#ranking']".into(),
            row: "ul.list li".into(),
            user_link: "a.user-name".into(),
            points: "span.css-kidsya span.num".into(),
        }
    }
}


/// Selectors parsed once up front so a typo fails before the browser starts.
#[derive(Debug, Clone)]
pub(crate) struct CompiledSelectors {
    pub(crate) ready: String,
    pub(crate) row: Selector,
    pub(crate) user_link: Selector,
    pub(crate) points: Selector,
}


fn compile(kind: &str, selector: &str) -> anyhow::Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid {kind} selector {selector:?}: {e}"))
}


impl CompiledSelectors {
    pub(crate) fn new(selectors: &RankingSelectors) -> anyhow::Result<Self> {
        // only validated here, the browser waits on the raw string
        compile("ready", &selectors.ready)?;
        Ok(Self {
            ready: selectors.ready.clone(),
            row: compile("row", &selectors.row)?,
            user_link: compile("user link", &selectors.user_link)?,
            points: compile("points", &selectors.points)?,
        })
    }
}


/// Every row gathered from one ranking page
#[derive(Debug, Clone)]
pub(crate) struct RankingPage {
    pub(crate) url: Arc<Url>,
    pub(crate) entries: Vec<RankEntry>,
}


impl Add for RankingPage {
    type Output = Self;

    /// Appends `rhs` rows after our own, keeping the url of the first page.
    fn add(mut self, rhs: Self) -> Self::Output {
        self.entries.extend(rhs.entries);
        self
    }
}


pub(crate) struct ScraperState<'a> {
    pub(crate) html: String,
    pub(crate) url: Arc<Url>,
    pub(crate) selectors: &'a CompiledSelectors,
}


impl ScraperState<'_> {
    pub(crate) fn get_scraper(&self) -> scraper::Html {
        scraper::Html::parse_document(&self.html)
    }

    pub(crate) fn create_ranking_page(&self) -> RankingPage {
        RankingPage { url: self.url.clone(), entries: Vec::new() }
    }
}


/// Extracts every leaderboard row from the rendered markup.
///
/// Never fails: rows with a missing link or points node fall back to
/// `"N/A"` and `0` respectively.
pub(crate) fn scrape_page(state: &ScraperState) -> RankingPage {
    let mut page = state.create_ranking_page();
    let document = state.get_scraper();
    page.entries = leaderboard::extract_rows(&document, state.selectors);
    page
}
