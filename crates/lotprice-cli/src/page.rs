//! Reading a lot page from disk or over HTTP.

use std::path::PathBuf;

use anyhow::Context;
use lotprice_core::AppConfig;
use lotprice_scraper::PageClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageSource {
    File(PathBuf),
    Url(String),
}

impl std::fmt::Display for PageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageSource::File(path) => write!(f, "{}", path.display()),
            PageSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Loads the current HTML of one page. Files are re-read on every call so a
/// saved page can be edited while `watch` runs.
pub(crate) struct PageLoader {
    source: PageSource,
    client: Option<PageClient>,
}

impl PageLoader {
    pub(crate) fn new(source: PageSource, config: &AppConfig) -> anyhow::Result<Self> {
        let client = match source {
            PageSource::File(_) => None,
            PageSource::Url(_) => Some(PageClient::new(
                config.request_timeout_secs,
                &config.user_agent,
                config.max_retries,
                config.retry_backoff_base_secs,
            )?),
        };
        Ok(Self { source, client })
    }

    pub(crate) fn source(&self) -> &PageSource {
        &self.source
    }

    pub(crate) async fn load(&self) -> anyhow::Result<String> {
        match (&self.source, &self.client) {
            (PageSource::File(path), _) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read page file {}", path.display())),
            (PageSource::Url(url), Some(client)) => client
                .fetch_page(url)
                .await
                .with_context(|| format!("failed to fetch {url}")),
            (PageSource::Url(url), None) => anyhow::bail!("no HTTP client configured for {url}"),
        }
    }
}
