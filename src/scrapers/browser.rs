use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info};

use super::error::{Result, ScrapeError};
use super::traits::Navigator;

/// Navigator backed by a headless Chrome instance.
///
/// Every call launches its own browser and tears it down before returning,
/// whether navigation succeeded or not: the `Browser` handle kills the
/// Chrome process when dropped.
#[derive(Debug, Default)]
pub struct ChromeNavigator;

impl ChromeNavigator {
    pub fn new() -> Self {
        Self
    }

    fn launch(url: &str) -> Result<Browser> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| navigation_error(url, e))?;

        Browser::new(options).map_err(|e| navigation_error(url, e))
    }
}

impl Navigator for ChromeNavigator {
    fn resolve(&self, url: &str) -> Result<String> {
        let browser = Self::launch(url)?;
        let tab = browser.new_tab().map_err(|e| navigation_error(url, e))?;

        debug!("Navigating to {}", url);
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| navigation_error(url, e))?;

        let landed = tab.get_url();
        debug!("Browser settled on {}", landed);
        Ok(landed)
    }
}

fn navigation_error(url: &str, err: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Navigation {
        url: url.to_string(),
        message: err.to_string(),
    }
}
