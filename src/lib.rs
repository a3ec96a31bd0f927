//! Apartment listings from Kijiji search results.
//!
//! [`PageLocator`] turns a search URL into one URL per results page;
//! [`ListingWalker`] reads the listings of a single page from its feed.
//! The two are independent and composed by the caller.

pub mod models;
pub mod scrapers;

pub use models::Listing;
pub use scrapers::{
    ChromeNavigator, DocumentFetcher, HttpFetcher, ListingRecord, ListingWalker, Navigator,
    PageLocator, ScrapeConfig, ScrapeError,
};
