//! Application-only OAuth2 (client credentials grant) against Reddit.

use harvest_core::{CoreError, RedditApiError};
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, error};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

// Reddit issues one-hour tokens and always reports it, but don't rely on that.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Scopes requested for the app-only token. Session verification and search
/// both need `read`.
pub const APP_SCOPES: &[&str] = &["read"];

#[derive(Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }

    fn from_response(response: &BasicTokenResponse) -> Self {
        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        Self {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
            scope: response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Debug for RedditToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Exchange the app credentials for a read-only access token.
pub async fn request_app_token(
    http: &Client,
    client_id: &str,
    client_secret: &str,
) -> Result<RedditToken, CoreError> {
    let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(invalid_endpoint)?;
    let token_url = TokenUrl::new(REDDIT_TOKEN_URL.to_string()).map_err(invalid_endpoint)?;

    let oauth_client = BasicClient::new(
        ClientId::new(client_id.to_string()),
        Some(ClientSecret::new(client_secret.to_string())),
        auth_url,
        Some(token_url),
    )
    .set_auth_type(AuthType::BasicAuth);

    let http = http.clone();
    let response = oauth_client
        .exchange_client_credentials()
        .add_scopes(APP_SCOPES.iter().map(|scope| Scope::new(scope.to_string())))
        .request_async(move |request| send_oauth_request(http, request))
        .await
        .map_err(|e| {
            let reason = describe_token_error(e);
            error!("Token request rejected: {}", reason);
            RedditApiError::AuthenticationFailed { reason }
        })?;

    let token = RedditToken::from_response(&response);
    debug!("Obtained access token with scope {:?}", token.scope);
    Ok(token)
}

// Routes the token exchange through our reqwest client so Reddit sees the
// configured user agent.
async fn send_oauth_request(
    http: Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn invalid_endpoint(e: impl fmt::Display) -> RedditApiError {
    RedditApiError::AuthenticationFailed {
        reason: format!("invalid OAuth endpoint: {}", e),
    }
}

fn describe_token_error(error: RequestTokenError<reqwest::Error, BasicErrorResponse>) -> String {
    match error {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Request(e) => format!("token request failed: {}", e),
        RequestTokenError::Parse(e, _) => format!("unexpected token response: {}", e),
        RequestTokenError::Other(message) => message,
    }
}
