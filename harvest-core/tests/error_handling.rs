use harvest_core::{ConfigError, CoreError, ErrorExt, ErrorReporter, RedditApiError, TimeFilter};
use std::error::Error;

#[test]
fn test_error_codes() {
    let auth_error = CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: "invalid_grant".to_string(),
    });
    assert_eq!(auth_error.error_code(), "REDDIT_AUTH_FAILED");

    assert_eq!(CoreError::NotConnected.error_code(), "NOT_CONNECTED");
    assert_eq!(CoreError::EmptyResult.error_code(), "EMPTY_RESULT");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_ID".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG_MISSING_ENV_VAR");
}

#[test]
fn test_fetch_failure_keeps_cause() {
    let error = CoreError::FetchFailed {
        subreddit: "samsunggalaxy".to_string(),
        keyword: "battery issue".to_string(),
        time_filter: TimeFilter::Week,
        source: Box::new(CoreError::RedditApi(RedditApiError::RateLimitExceeded {
            retry_after: 60,
        })),
    };

    assert_eq!(error.error_code(), "FETCH_FAILED");
    let message = error.to_string();
    assert!(message.contains("battery issue"));
    assert!(message.contains("r/samsunggalaxy"));
    assert!(message.contains("t=week"));

    let cause = error.source().expect("fetch failure should expose its cause");
    assert!(cause.to_string().contains("Rate limit exceeded"));
}

#[test]
fn test_authentication_failure_detection() {
    let auth_error = CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: "401 Unauthorized".to_string(),
    });
    assert!(auth_error.is_authentication_failure());
    assert!(!CoreError::RedditApi(RedditApiError::InvalidToken).is_authentication_failure());
    assert!(!CoreError::NotConnected.is_authentication_failure());
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_USER_AGENT".to_string(),
    });
    assert!(config_error
        .user_friendly_message()
        .contains("REDDIT_USER_AGENT"));

    assert!(CoreError::EmptyResult
        .user_friendly_message()
        .contains("nothing to export"));
}

#[test]
fn test_error_display_matches_operator_messages() {
    assert_eq!(
        CoreError::NotConnected.to_string(),
        "Reddit client not initialized. Call connect() first."
    );
    assert_eq!(CoreError::EmptyResult.to_string(), "No posts to export.");
}

#[test]
fn test_error_reporter() {
    let error = CoreError::FetchFailed {
        subreddit: "iphone".to_string(),
        keyword: "issue".to_string(),
        time_filter: TimeFilter::Day,
        source: Box::new(CoreError::RedditApi(RedditApiError::InvalidToken)),
    };

    // Logging only; must not panic on nested errors.
    ErrorReporter::new().report_error(&error);
}
