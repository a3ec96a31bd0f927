use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::Html;
use tracing::{debug, info};

use super::error::{Result, ScrapeError};
use super::feed::{feed_url, parse_entries, EntryField, FeedEntry};
use super::traits::DocumentFetcher;
use super::types::DetailLabels;
use crate::models::{Image, Listing, Location};

/// Format of `<pubDate>` without its zone, e.g. "Wed, 02 Oct 2024 13:45:00"
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Zone names accepted after the timestamp; both mean UTC
pub const PUB_DATE_ZONES: [&str; 2] = ["GMT", "UTC"];

/// The listings of one search-results page, read from its feed.
///
/// Entries are fetched once, at construction, and never refreshed.
pub struct ListingWalker {
    url: String,
    feed_url: String,
    entries: Vec<FeedEntry>,
    labels: DetailLabels,
}

impl ListingWalker {
    /// Fetch the feed of the page at `url`.
    pub fn open(url: &str, fetcher: &dyn DocumentFetcher) -> Result<Self> {
        Self::with_labels(url, DetailLabels::default(), fetcher)
    }

    pub fn with_labels(url: &str, labels: DetailLabels, fetcher: &dyn DocumentFetcher) -> Result<Self> {
        let feed_url = feed_url(url)?;
        let document = fetcher.fetch(&feed_url)?;
        let entries = parse_entries(&document)?;

        info!("Found {} listings in {}", entries.len(), feed_url);

        Ok(Self {
            url: url.to_string(),
            feed_url,
            entries,
            labels,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Iterate over records, fetching each listing's detail page.
    pub fn iter<'a>(&'a self, fetcher: &'a dyn DocumentFetcher) -> Listings<'a> {
        Listings {
            walker: self,
            fetcher: Some(fetcher),
            index: 0,
        }
    }

    /// Iterate over records built from feed entries alone.
    pub fn snippets(&self) -> Listings<'_> {
        Listings {
            walker: self,
            fetcher: None,
            index: 0,
        }
    }
}

/// Records of a [`ListingWalker`] in feed order.
///
/// Each record is built when yielded. Running off the end resets the index,
/// so the next call to `next` starts over from the first entry.
pub struct Listings<'a> {
    walker: &'a ListingWalker,
    fetcher: Option<&'a dyn DocumentFetcher>,
    index: usize,
}

impl<'a> Iterator for Listings<'a> {
    type Item = Result<ListingRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(entry) = self.walker.entries.get(self.index) else {
            self.index = 0;
            return None;
        };
        self.index += 1;
        Some(ListingRecord::new(entry, &self.walker.labels, self.fetcher))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.walker.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// Read-through view of one feed entry, plus its detail page when fetched.
///
/// Accessors re-read the held documents on every call and report missing or
/// malformed fields at that point.
pub struct ListingRecord<'a> {
    entry: &'a FeedEntry,
    labels: &'a DetailLabels,
    detail: Option<Html>,
}

impl<'a> ListingRecord<'a> {
    /// Build a record; with a fetcher, the detail page at the entry's link
    /// is fetched right away and a failure is returned as is.
    pub fn new(
        entry: &'a FeedEntry,
        labels: &'a DetailLabels,
        fetcher: Option<&dyn DocumentFetcher>,
    ) -> Result<Self> {
        let mut record = Self {
            entry,
            labels,
            detail: None,
        };

        if let Some(fetcher) = fetcher {
            let link = record.link()?.to_string();
            debug!("Fetching detail page {}", link);
            let html = fetcher.fetch(&link)?;
            record.detail = Some(Html::parse_document(&html));
        }

        Ok(record)
    }

    /// Whether the detail page was fetched
    pub fn has_detail(&self) -> bool {
        self.detail.is_some()
    }

    fn required(&self, name: &str) -> Result<&'a EntryField> {
        self.entry.field(name).ok_or_else(|| ScrapeError::missing(name))
    }

    fn text(&self, name: &str) -> Result<&'a str> {
        self.required(name).map(|f| f.text.as_str())
    }

    fn enclosure_attribute(&self, attribute: &str) -> Result<&'a str> {
        self.required("enclosure")?
            .attribute(attribute)
            .ok_or_else(|| ScrapeError::MissingAttribute {
                element: "enclosure".to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn coordinate(&self, name: &str) -> Result<f64> {
        let value = self.text(name)?;
        value
            .trim()
            .parse::<f64>()
            .map_err(|source| ScrapeError::InvalidNumber {
                element: name.to_string(),
                value: value.to_string(),
                source,
            })
    }

    pub fn title(&self) -> Result<&'a str> {
        self.text("title")
    }

    /// URL of the listing, taken from `<guid>` when `<link>` is blank
    pub fn link(&self) -> Result<&'a str> {
        match self.entry.text("link") {
            Some(link) if !link.trim().is_empty() => Ok(link),
            _ => self.guid(),
        }
    }

    pub fn description(&self) -> Result<&'a str> {
        self.text("description")
    }

    pub fn image_url(&self) -> Result<&'a str> {
        self.enclosure_attribute("url")
    }

    pub fn image_type(&self) -> Result<&'a str> {
        self.enclosure_attribute("type")
    }

    /// Publish time, e.g. "Wed, 02 Oct 2024 13:45:00 GMT". Any other zone,
    /// numeric offsets included, is rejected.
    pub fn pub_date(&self) -> Result<DateTime<Utc>> {
        let value = self.text("pubDate")?;
        let (stamp, zone) = value
            .trim()
            .rsplit_once(' ')
            .ok_or_else(|| ScrapeError::invalid_date(value, "missing time zone"))?;

        if !PUB_DATE_ZONES.contains(&zone) {
            return Err(ScrapeError::invalid_date(
                value,
                format!("unsupported time zone {zone:?}"),
            ));
        }

        NaiveDateTime::parse_from_str(stamp, PUB_DATE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| ScrapeError::invalid_date(value, e.to_string()))
    }

    /// Unique id of the listing; Kijiji uses the listing URL
    pub fn guid(&self) -> Result<&'a str> {
        self.text("guid")
    }

    pub fn latitude(&self) -> Result<f64> {
        self.coordinate("geo:lat")
    }

    pub fn longitude(&self) -> Result<f64> {
        self.coordinate("geo:long")
    }

    /// Rent exactly as the feed shows it
    pub fn price(&self) -> Result<&'a str> {
        self.text("g-core:price")
    }

    /// Room count from the detail page ("Pièces"), `None` without one
    pub fn size(&self) -> Result<Option<String>> {
        self.labelled(&self.labels.size)
    }

    pub fn bathrooms(&self) -> Result<Option<String>> {
        self.labelled(&self.labels.bathrooms)
    }

    /// Value of the first labelled element whose text starts with `label`,
    /// e.g. "1.5" from "Salles de bain: 1.5".
    fn labelled(&self, label: &str) -> Result<Option<String>> {
        let Some(detail) = &self.detail else {
            return Ok(None);
        };
        let selector = self.labels.parsed_selector()?;

        detail
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .find(|text| text.trim_start().starts_with(label))
            .map(|text| {
                let value = text.rsplit(": ").next().unwrap_or_default();
                Some(value.trim().to_string())
            })
            .ok_or_else(|| ScrapeError::MissingLabel {
                label: label.to_string(),
            })
    }

    /// Read every field into an owned snapshot. A listing without a photo
    /// gets no image; any other missing field is an error.
    pub fn to_listing(&self) -> Result<Listing> {
        let image = match (self.image_url(), self.image_type()) {
            (Ok(url), Ok(mime_type)) => Some(Image {
                url: url.to_string(),
                mime_type: mime_type.to_string(),
            }),
            (Err(ScrapeError::MissingElement { .. }), _) => None,
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };

        Ok(Listing {
            id: self.guid()?.to_string(),
            title: self.title()?.trim().to_string(),
            url: self.link()?.trim().to_string(),
            description: self.description()?.trim().to_string(),
            image,
            published_at: self.pub_date()?,
            location: Location {
                latitude: self.latitude()?,
                longitude: self.longitude()?,
            },
            price: self.price()?.to_string(),
            size: self.size()?,
            bathrooms: self.bathrooms()?,
            scraped_at: Utc::now(),
        })
    }
}
