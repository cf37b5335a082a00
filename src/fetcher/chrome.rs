use std::{ffi::OsStr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;
use url::Url;

use super::{ContentProvider, LoadError, PageSession};

const CHROME_ARGS: [&str; 2] = ["--disable-dev-shm-usage", "--disable-extensions"];


/// Renders pages with a local headless Chrome.
pub(crate) struct ChromeProvider {
    chrome_path: Option<PathBuf>,
    navigation_timeout: Duration,
}


impl ChromeProvider {
    pub(crate) fn new(chrome_path: Option<PathBuf>, navigation_timeout: Duration) -> Self {
        Self { chrome_path, navigation_timeout }
    }
}


pub(crate) struct ChromeSession {
    // Dropping the browser kills the chrome process
    _browser: Browser,
    tab: Arc<Tab>,
}


impl ContentProvider for ChromeProvider {
    const NAME: &'static str = "headless_chrome";
    type Session = ChromeSession;

    fn launch(&self) -> anyhow::Result<ChromeSession> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .path(self.chrome_path.clone())
            .args(CHROME_ARGS.into_iter().map(OsStr::new).collect())
            .build()
            .map_err(|e| anyhow!("Invalid browser launch options: {e}"))?;

        let browser = Browser::new(options).context("Failed to launch headless Chrome. Is Chrome or Chromium installed?")?;
        let tab = browser.new_tab().context("Failed to open a browser tab")?;
        tab.set_default_timeout(self.navigation_timeout);
        debug!("Launched headless Chrome");

        Ok(ChromeSession { _browser: browser, tab })
    }
}


impl PageSession for ChromeSession {
    fn load(&mut self, url: &Url, ready_selector: &str, timeout: Duration) -> Result<String, LoadError> {
        self.tab
            .navigate_to(url.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| LoadError::Navigation { url: url.clone(), reason: format!("{e:#}") })?;

        self.tab
            .wait_for_element_with_custom_timeout(ready_selector, timeout)
            .map_err(|e| LoadError::NotReady { url: url.clone(), timeout, reason: format!("{e:#}") })?;

        self.tab
            .get_content()
            .map_err(|e| LoadError::Content { url: url.clone(), reason: format!("{e:#}") })
    }

    fn close(&mut self) {
        if let Err(e) = self.tab.close(false) {
            debug!("Closing the browser tab failed: {e:#}");
        }
        debug!("Browser session closed");
    }
}
