use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Feed decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Feed returned status {0}")]
    Status(u16),
    #[error("No usable element set in response for {0}")]
    InvalidTle(String),
}
