use crate::metrics::{ApiMetrics, MetricsCollector, RequestMetrics};
use crate::search::SearchQuery;
use harvest_core::{CoreError, PostRecord, RedditApiError};
use reqwest::header::HeaderValue;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Reddit caps a listing page at 100 children.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Listing used to check a fresh token. Must be reachable with the `read` scope.
pub const VERIFY_ENDPOINT: &str = "/subreddits/popular";
pub const VERIFY_SCOPE: &str = "read";

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListing<T> {
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingChild<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub subreddit: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub upvote_ratio: f64,
}

#[derive(Debug, Clone)]
pub struct RedditApiClient {
    http_client: Client,
    metrics: MetricsCollector,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, CoreError> {
        Ok(Self {
            http_client: http_client_builder(&user_agent).build()?,
            metrics: MetricsCollector::new(),
            base_url: REDDIT_API_BASE.to_string(),
        })
    }

    /// Client pointed at a local server instead of Reddit.
    #[cfg(test)]
    pub(crate) fn with_base_url(user_agent: &str, base_url: &str) -> Result<Self, CoreError> {
        Ok(Self {
            http_client: http_client_builder(user_agent).no_proxy().build()?,
            metrics: MetricsCollector::new(),
            base_url: base_url.to_string(),
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let start_time = Instant::now();

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token);

        if !query_params.is_empty() {
            request_builder = request_builder.query(query_params);
        }

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let outcome: Result<Response, CoreError> = match request_builder.send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Request successful: {} {}", response.status(), endpoint);
                Ok(response)
            }
            Ok(response) => {
                error!(
                    "Request failed with status: {} for {}",
                    response.status(),
                    endpoint
                );
                Err(error_for_status(
                    response.status(),
                    endpoint,
                    response.headers().get("retry-after"),
                )
                .into())
            }
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    Err(RedditApiError::RequestTimeout.into())
                } else {
                    Err(CoreError::Network(e))
                }
            }
        };

        let status_code = match &outcome {
            Ok(response) => Some(response.status().as_u16()),
            Err(CoreError::RedditApi(RedditApiError::RateLimitExceeded { .. })) => Some(429),
            Err(CoreError::RedditApi(RedditApiError::ServerError { status_code })) => {
                Some(*status_code)
            }
            Err(_) => None,
        };

        self.metrics
            .record_request(RequestMetrics {
                status_code,
                response_time: start_time.elapsed(),
                success: outcome.is_ok(),
            })
            .await;

        outcome
    }

    /// Lightweight `read`-scoped call used to confirm a fresh token is accepted.
    pub async fn verify_session(&self, access_token: &str) -> Result<(), CoreError> {
        let response = self
            .make_request(Method::GET, VERIFY_ENDPOINT, access_token, &[("limit", "1")])
            .await?;

        let listing: RedditListing<serde_json::Value> = response.json().await.map_err(|e| {
            error!("Failed to parse verification response: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse {} listing", VERIFY_ENDPOINT),
            })
        })?;

        debug!(
            "Session verified ({} item(s) from {})",
            listing.data.children.len(),
            VERIFY_ENDPOINT
        );
        Ok(())
    }

    /// Search one subreddit, following the `after` cursor until `query.limit`
    /// posts are collected or the listing runs out.
    pub async fn search_subreddit(
        &self,
        access_token: &str,
        query: &SearchQuery<'_>,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/search", query.subreddit);
        let limit = query.limit as usize;
        let mut posts = Vec::with_capacity(limit.min(MAX_PAGE_SIZE as usize));
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let page_size = (limit - posts.len()).min(MAX_PAGE_SIZE as usize) as u32;
            let response = {
                let params = search_params(query, page_size, after.as_deref());
                let borrowed: Vec<(&str, &str)> =
                    params.iter().map(|(k, v)| (*k, v.as_str())).collect();
                self.make_request(Method::GET, &endpoint, access_token, &borrowed)
                    .await?
            };

            let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
                error!("Failed to parse search results: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse search results for r/{}", query.subreddit),
                })
            })?;

            let page_len = listing.data.children.len();
            posts.extend(listing.data.children.into_iter().map(|child| child.data));
            debug!(
                "Page of {} results for '{}' in r/{} (t={})",
                page_len, query.keyword, query.subreddit, query.time_filter
            );

            match listing.data.after {
                Some(cursor) if page_len > 0 => after = Some(cursor),
                _ => break,
            }
        }

        posts.truncate(limit);
        info!(
            "Retrieved {} posts for '{}' in r/{} (t={})",
            posts.len(),
            query.keyword,
            query.subreddit,
            query.time_filter
        );
        Ok(posts)
    }

    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.get_metrics().await
    }
}

fn http_client_builder(user_agent: &str) -> ClientBuilder {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
}

/// Query string for one page of a subreddit search. Searches of r/all are
/// site-wide, so they are not restricted to the subreddit.
pub fn search_params(
    query: &SearchQuery<'_>,
    page_size: u32,
    after: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![("q", query.keyword.to_string())];
    if !query.subreddit.eq_ignore_ascii_case("all") {
        params.push(("restrict_sr", "on".to_string()));
    }
    params.extend([
        ("sort", query.sort.as_str().to_string()),
        ("t", query.time_filter.as_str().to_string()),
        ("syntax", "lucene".to_string()),
        ("limit", page_size.to_string()),
        ("raw_json", "1".to_string()),
    ]);
    if let Some(cursor) = after {
        params.push(("after", cursor.to_string()));
    }
    params
}

/// Map a non-success status to the matching API error.
pub fn error_for_status(
    status: StatusCode,
    endpoint: &str,
    retry_after: Option<&HeaderValue>,
) -> RedditApiError {
    match status.as_u16() {
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => match endpoint.strip_prefix("/r/") {
            Some(rest) => RedditApiError::SubredditNotFound {
                subreddit: rest.split('/').next().unwrap_or(rest).to_string(),
            },
            None => RedditApiError::InvalidResponse {
                details: format!("Resource not found: {}", endpoint),
            },
        },
        429 => {
            let retry_after = retry_after
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil() as u64)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    }
}

impl From<RedditPostData> for PostRecord {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            selftext: post_data.selftext,
            score: post_data.score,
            num_comments: post_data.num_comments,
            view_count: post_data.view_count,
            upvote_ratio: post_data.upvote_ratio,
            subreddit: post_data.subreddit,
            created_utc: post_data.created_utc,
        }
    }
}
