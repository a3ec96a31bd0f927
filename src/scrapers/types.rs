use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{Result, ScrapeError};

pub const DEFAULT_START_URL: &str =
    "https://www.kijiji.ca/b-appartement-condo/ville-de-montreal/c37l1700281";

/// Page number sent to the site when probing for the last page
pub const DEFAULT_PROBE_CEILING: u32 = 1000;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Search-results URL to start from
    pub start_url: String,
    /// Out-of-range page number used to discover the last page
    pub probe_ceiling: u32,
    /// Fetch each listing's detail page for size and bathroom count
    pub full_detail: bool,
    /// Stop walking after this many pages
    pub page_limit: Option<usize>,
    /// Where the collected listings are written
    pub output_path: PathBuf,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub detail_labels: DetailLabels,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            probe_ceiling: DEFAULT_PROBE_CEILING,
            full_detail: true,
            page_limit: None,
            output_path: PathBuf::from("scraped_listings.json"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            detail_labels: DetailLabels::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    /// Read a JSON config file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config_error = |reason: String| ScrapeError::Config {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| config_error(e.to_string()))
    }
}

/// How labelled fields are located on a listing's detail page.
///
/// Labels are matched by prefix against the text of each element matched by
/// `selector`, so the order of fields on the page does not matter. The
/// defaults are the French labels served to Montréal searches; pages served
/// in another language need other labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailLabels {
    pub selector: String,
    pub size: String,
    pub bathrooms: String,
}

impl Default for DetailLabels {
    fn default() -> Self {
        Self {
            selector: r#"span[class^="noLabelValue"]"#.to_string(),
            size: "Pièces".to_string(),
            bathrooms: "Salles de bain".to_string(),
        }
    }
}

impl DetailLabels {
    pub(crate) fn parsed_selector(&self) -> Result<scraper::Selector> {
        scraper::Selector::parse(&self.selector)
            .map_err(|_| ScrapeError::Selector(self.selector.clone()))
    }
}
