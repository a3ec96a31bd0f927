use super::error::Result;

/// Retrieves a document's text by URL.
///
/// Used for feed documents and listing detail pages. Implementations must
/// fail on non-success responses rather than return the error page body.
pub trait DocumentFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Drives a browser to a URL and reports where it ended up after redirects.
pub trait Navigator {
    fn resolve(&self, url: &str) -> Result<String>;
}
