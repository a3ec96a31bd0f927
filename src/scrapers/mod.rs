pub mod browser;
pub mod error;
pub mod feed;
pub mod http;
pub mod kijiji;
pub mod pages;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::ChromeNavigator;
pub use error::{Result, ScrapeError};
pub use http::HttpFetcher;
pub use kijiji::{ListingRecord, ListingWalker, Listings};
pub use pages::{PageLocator, Pages};
pub use traits::{DocumentFetcher, Navigator};
pub use types::{DetailLabels, ScrapeConfig};
