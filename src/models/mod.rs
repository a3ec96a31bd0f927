use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coordinates of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Photo attached to a listing's feed entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub url: String,
    pub mime_type: String,
}

/// Snapshot of every field of one apartment listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Kijiji's guid, which is the listing's own URL
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub image: Option<Image>,
    pub published_at: DateTime<Utc>,
    pub location: Location,
    /// Monthly rent as displayed, e.g. "$1,200"
    pub price: String,
    /// Only known when the detail page was fetched
    pub size: Option<String>,
    pub bathrooms: Option<String>,
    pub scraped_at: DateTime<Utc>,
}
