mod document;
mod error;
mod fetcher;

pub use document::{ElementFeed, FeedDocument, FeedEntry, FeedSource, FetchLogEntry, FetchStatus};
pub use error::FeedError;
pub use fetcher::{extract_tle_pair, fetch_targets, FeedFetcher, FetchTarget, CELESTRAK_GP_URL};

/// Load the feed from `url` or `path`, in that order. Any failure degrades
/// to an empty feed so embedded element sets still apply.
pub async fn load_feed(
    path: Option<&std::path::Path>,
    url: Option<&str>,
    timeout: std::time::Duration,
) -> ElementFeed {
    if let Some(url) = url {
        match fetch_document(url, timeout).await {
            Ok(doc) => return ElementFeed::new(doc),
            Err(e) => log::warn!("Failed to fetch element feed from {}: {}", url, e),
        }
    }
    if let Some(path) = path {
        match FeedDocument::load(path) {
            Ok(doc) => return ElementFeed::new(doc),
            Err(e) => log::warn!("Failed to read element feed {}: {}", path.display(), e),
        }
    }
    ElementFeed::empty()
}

async fn fetch_document(url: &str, timeout: std::time::Duration) -> Result<FeedDocument, FeedError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(FeedError::Status(response.status().as_u16()));
    }
    Ok(response.json::<FeedDocument>().await?)
}
