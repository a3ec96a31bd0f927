use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Everything that can go wrong while locating pages or reading listings.
///
/// Nothing is retried or recovered: each variant surfaces at the call that
/// triggered it.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// URL lacks the path structure we rely on (page segment, category marker)
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Browser driver failed to launch or navigate
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("malformed feed document: {0}")]
    Feed(String),

    #[error("entry has no <{element}> element")]
    MissingElement { element: String },

    #[error("<{element}> has no `{attribute}` attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("invalid publish date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("<{element}> is not a number: {value:?}")]
    InvalidNumber {
        element: String,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("no detail field labelled {label:?}")]
    MissingLabel { label: String },

    #[error("cannot load config {path}: {reason}")]
    Config { path: String, reason: String },
}

impl ScrapeError {
    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_date(value: &str, reason: impl Into<String>) -> Self {
        ScrapeError::InvalidDate {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(element: &str) -> Self {
        ScrapeError::MissingElement {
            element: element.to_string(),
        }
    }
}
