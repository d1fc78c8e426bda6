use crate::error::*;
use tracing::{error, info};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::FetchFailed { source, .. } => {
                error!("Fetch failure cause: {:?}", source);
            }
            _ => {}
        }
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::NotConnected => {
                "The Reddit client is not connected. Connect before fetching posts.".to_string()
            }
            CoreError::FetchFailed {
                subreddit,
                keyword,
                source,
                ..
            } => format!(
                "Searching '{}' in r/{} failed: {}",
                keyword,
                subreddit,
                source.user_friendly_message()
            ),
            CoreError::EmptyResult => {
                "No posts were collected, so there is nothing to export.".to_string()
            }
            CoreError::Io(_) | CoreError::Csv(_) => {
                "Failed to write the output file. Please check the path and permissions."
                    .to_string()
            }
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            CoreError::NotConnected => "NOT_CONNECTED".to_string(),
            CoreError::FetchFailed { .. } => "FETCH_FAILED".to_string(),
            CoreError::EmptyResult => "EMPTY_RESULT".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Csv(_) => "CSV".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { reason } => format!(
                "Reddit authentication failed ({}). Please check REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET and REDDIT_USER_AGENT.",
                reason
            ),
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Reddit rate limit reached. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => {
                format!("Access to {} is forbidden.", resource)
            }
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit r/{} does not exist or is private.", subreddit)
            }
            RedditApiError::InvalidToken => {
                "Your Reddit authentication token is invalid. Please reconnect.".to_string()
            }
            RedditApiError::RequestTimeout => {
                "The request to Reddit timed out. Please try again.".to_string()
            }
            RedditApiError::InvalidResponse { .. } => {
                "Reddit returned an unexpected response.".to_string()
            }
            RedditApiError::ServerError { .. } => {
                "Reddit servers are having trouble. Please try again later.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMITED".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs a fatal error with its code and operator-facing message.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }
}
