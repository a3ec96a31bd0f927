//! In-memory collaborators for tests.

use std::cell::RefCell;
use std::collections::HashMap;

use super::error::{Result, ScrapeError};
use super::pages::page_number;
use super::traits::{DocumentFetcher, Navigator};

pub const SAMPLE_ITEM: &str = r#"<item>
      <title>Grand 4 1/2 Plateau</title>
      <link>https://www.kijiji.ca/v-appartement-condo/ville-de-montreal/grand-4-1-2/1700000001</link>
      <description>Lumineux &amp; proche du métro &lt;b&gt;libre&lt;/b&gt;</description>
      <enclosure url="https://media.kijiji.ca/api/v1/images/1.jpg" length="0" type="image/jpeg"/>
      <pubDate>Wed, 02 Oct 2024 13:45:00 GMT</pubDate>
      <guid>https://www.kijiji.ca/v-appartement-condo/ville-de-montreal/grand-4-1-2/1700000001</guid>
      <geo:lat>45.5231</geo:lat>
      <geo:long>-73.5817</geo:long>
      <g-core:price>$1,200</g-core:price>
    </item>"#;

pub const SAMPLE_LINK: &str =
    "https://www.kijiji.ca/v-appartement-condo/ville-de-montreal/grand-4-1-2/1700000001";

/// Detail page with its labelled fields out of their usual order
pub const SAMPLE_DETAIL: &str = r#"<html><body>
    <ul>
      <li><span class="noLabelValue-3861810455">Salles de bain: 1.5</span></li>
      <li><span class="noLabelValue-3861810455">Meublé: Non</span></li>
      <li><span class="noLabelValue-3861810455">Pièces: 4 1/2</span></li>
    </ul>
</body></html>"#;

/// Wrap items in an RSS channel the way the site serves them
pub fn feed_document(items: &[&str]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:geo="http://www.w3.org/2003/01/geo/wgs84_pos#" xmlns:g-core="http://base.google.com/ns/1.0">
  <channel>
    <title>Appartements, condos dans Ville de Montréal</title>
    <link>https://www.kijiji.ca/b-appartement-condo/ville-de-montreal/c37l1700281</link>
    {}
  </channel>
</rss>"#,
        items.join("\n    ")
    )
}

/// Serves documents from a map and records every requested URL
#[derive(Default)]
pub struct MapFetcher {
    documents: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<String>) -> Self {
        self.documents.insert(url.to_string(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl DocumentFetcher for MapFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Mimics the site's redirect: any page past `max_page` lands on `max_page`
pub struct ClampingNavigator {
    max_page: Option<u32>,
    drop_first_page: bool,
    requests: RefCell<Vec<String>>,
}

impl ClampingNavigator {
    pub fn new(max_page: u32) -> Self {
        Self {
            max_page: Some(max_page),
            drop_first_page: false,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Navigation that always fails, like a browser that cannot start
    pub fn failing() -> Self {
        Self {
            max_page: None,
            drop_first_page: false,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Land on the bare search URL instead of `page-1`
    pub fn dropping_first_page(mut self) -> Self {
        self.drop_first_page = true;
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Navigator for ClampingNavigator {
    fn resolve(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());

        let max_page = self.max_page.ok_or_else(|| ScrapeError::Navigation {
            url: url.to_string(),
            message: "Chrome exited".to_string(),
        })?;

        let requested = page_number(url)?;
        let landed = requested.min(max_page);
        let from = format!("page-{requested}");

        if self.drop_first_page && landed == 1 {
            Ok(url.replace(&format!("/{from}"), ""))
        } else {
            Ok(url.replace(&from, &format!("page-{landed}")))
        }
    }
}
