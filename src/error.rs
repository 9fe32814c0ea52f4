use thiserror::Error;

/// Main error type for the advert engine
#[derive(Error, Debug)]
pub enum MarketError {
    /// Demo store database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration errors
    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file could not be read
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    /// Store errors that are not plain SQLite failures
    #[error("Store error: {0}")]
    Store(String),

    /// Rejected advert input
    #[error("Invalid advert: {0}")]
    Validation(String),

    /// Advert not found
    #[error("Advert not found: {0}")]
    NotFound(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for MarketError {
    fn from(s: String) -> Self {
        MarketError::Other(s)
    }
}

impl From<&str> for MarketError {
    fn from(s: &str) -> Self {
        MarketError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MarketError>;
