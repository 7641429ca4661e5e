use thiserror::Error;

/// Invalid extraction configuration. These are the only fatal errors the
/// engine raises; a page that simply lacks a figure is never an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid {context} pattern \"{pattern}\": {source}")]
    InvalidPattern {
        context: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid {context} selector \"{selector}\": {reason}")]
    InvalidSelector {
        context: String,
        selector: String,
        reason: String,
    },

    #[error("{context} locator has no strategies")]
    EmptyLocator { context: String },
}

/// Failures while fetching a page over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} is not HTML")]
    NotHtml { url: String },

    #[error("invalid page URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
