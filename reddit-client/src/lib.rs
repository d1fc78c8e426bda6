pub mod api;
pub mod auth;
pub mod metrics;
pub mod search;

#[cfg(test)]
mod test_server;

pub use api::{RedditApiClient, RedditPostData};
pub use auth::RedditToken;
pub use metrics::ApiMetrics;
pub use search::{Connector, PostSearch, SearchQuery, SearchSort};

use async_trait::async_trait;
use harvest_core::{CoreError, RedditApiError, RedditCredentials};
use tracing::{debug, info, warn};

/// Builds authenticated [`RedditSession`]s from app credentials.
#[derive(Debug, Clone)]
pub struct RedditClient {
    credentials: RedditCredentials,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Self {
        Self { credentials }
    }

    async fn establish_session(&self) -> Result<RedditSession, CoreError> {
        let client_id = self.credentials.require_client_id()?;
        let client_secret = self.credentials.require_client_secret()?;
        let user_agent = self.credentials.require_user_agent()?;

        let api = RedditApiClient::new(user_agent.to_string())?;
        let token = auth::request_app_token(api.http_client(), client_id, client_secret).await?;
        api.verify_session(&token.access_token).await?;

        info!("Authenticated with Reddit as {}", user_agent);
        Ok(RedditSession { api, token })
    }
}

#[async_trait]
impl Connector for RedditClient {
    type Session = RedditSession;

    async fn connect(&self) -> Result<RedditSession, CoreError> {
        self.establish_session().await.map_err(|e| {
            if e.is_authentication_failure() {
                e
            } else {
                RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                }
                .into()
            }
        })
    }
}

/// A verified token plus the API client that uses it.
#[derive(Debug, Clone)]
pub struct RedditSession {
    api: RedditApiClient,
    token: RedditToken,
}

impl RedditSession {
    pub async fn get_api_metrics(&self) -> ApiMetrics {
        self.api.get_metrics().await
    }
}

#[async_trait]
impl PostSearch for RedditSession {
    async fn search(&self, query: &SearchQuery<'_>) -> Result<Vec<RedditPostData>, CoreError> {
        if self.token.is_expired() {
            warn!("Access token expired before searching r/{}", query.subreddit);
            return Err(RedditApiError::InvalidToken.into());
        }

        debug!(
            "Searching '{}' in r/{} (sort={}, t={}, limit={})",
            query.keyword, query.subreddit, query.sort, query.time_filter, query.limit
        );
        self.api
            .search_subreddit(&self.token.access_token, query)
            .await
    }
}
