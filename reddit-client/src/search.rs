//! The search capability the harvester drives.
//!
//! [`Connector`] authenticates and hands back a session; the session answers
//! [`PostSearch`] queries. The Reddit implementations live in this crate and
//! tests substitute their own.

use crate::api::RedditPostData;
use async_trait::async_trait;
use harvest_core::{CoreError, TimeFilter};
use std::fmt;

/// Ordering Reddit applies to search results. The sweep only ranks by score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    Top,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSort::Top => "top",
        }
    }
}

impl fmt::Display for SearchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchQuery<'a> {
    pub subreddit: &'a str,
    pub keyword: &'a str,
    pub sort: SearchSort,
    pub limit: u32,
    pub time_filter: TimeFilter,
}

impl<'a> SearchQuery<'a> {
    /// Top posts in `subreddit` matching `keyword` within `time_filter`.
    pub fn top(subreddit: &'a str, keyword: &'a str, limit: u32, time_filter: TimeFilter) -> Self {
        Self {
            subreddit,
            keyword,
            sort: SearchSort::Top,
            limit,
            time_filter,
        }
    }
}

#[async_trait]
pub trait PostSearch: Send + Sync {
    /// Run one search. At most `query.limit` posts come back.
    async fn search(&self, query: &SearchQuery<'_>) -> Result<Vec<RedditPostData>, CoreError>;
}

#[async_trait]
pub trait Connector: Send + Sync {
    type Session: PostSearch;

    /// Authenticate and verify the credentials with one lightweight call.
    async fn connect(&self) -> Result<Self::Session, CoreError>;
}
