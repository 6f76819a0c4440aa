use thiserror::Error;

/// User input failed a precondition. Reported inline, never forwarded
/// to the network layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Transport or upstream-shape failure while talking to the backend
/// or the quote provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    DataShape(String),

    #[error("missing bearer token")]
    Unauthorized,

    #[error("backend rejected request with status {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}
