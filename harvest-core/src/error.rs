use crate::types::TimeFilter;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reddit client not initialized. Call connect() first.")]
    NotConnected,

    #[error("Failed to fetch posts for '{keyword}' in r/{subreddit} (t={time_filter}): {source}")]
    FetchFailed {
        subreddit: String,
        keyword: String,
        time_filter: TimeFilter,
        #[source]
        source: Box<CoreError>,
    },

    #[error("No posts to export.")]
    EmptyResult,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl CoreError {
    /// True for any authentication failure raised while connecting.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. })
        )
    }
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
