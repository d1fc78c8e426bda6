use serde::Deserialize;
use std::fmt;

/// Time window used to scope a "top posts" search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFilter {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    /// Every time filter, in sweep order.
    pub const ALL: [TimeFilter; 5] = [
        TimeFilter::Day,
        TimeFilter::Week,
        TimeFilter::Month,
        TimeFilter::Year,
        TimeFilter::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DEFAULT_LIMIT: u32 = 100;

const DEFAULT_SUBREDDITS: &[&str] = &["samsunggalaxy"];

const DEFAULT_KEYWORDS: &[&str] = &[
    "honest review",
    "first impression",
    "user experience",
    "worst thing about",
    "why I returned it",
    "issue",
    "pros and cons",
    "is it worth it",
    "regret buying",
    "it keeps crashing",
    "battery issue",
    "buggy update",
    "customer service",
    "I wish it had",
    "feature request",
    "missing feature",
    "they should add",
    "improvement idea",
];

/// The subreddits and keywords to sweep. Every (subreddit, keyword) pair is
/// searched once per [`TimeFilter`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfiguration {
    subreddits: Vec<String>,
    keywords: Vec<String>,
    limit: u32,
}

impl SearchConfiguration {
    pub fn new<S, K>(subreddits: S, keywords: K) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            subreddits: subreddits.into_iter().map(Into::into).collect(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn subreddits(&self) -> &[String] {
        &self.subreddits
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn time_filters(&self) -> &'static [TimeFilter] {
        &TimeFilter::ALL
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of search calls a full sweep issues.
    pub fn query_count(&self) -> usize {
        self.subreddits.len() * self.keywords.len() * TimeFilter::ALL.len()
    }
}

impl Default for SearchConfiguration {
    fn default() -> Self {
        Self::new(
            DEFAULT_SUBREDDITS.iter().copied(),
            DEFAULT_KEYWORDS.iter().copied(),
        )
    }
}

/// One fetched post, flattened to the exported column set.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub score: i64,
    pub num_comments: u64,
    /// Reddit only reports views for some post types.
    pub view_count: Option<u64>,
    pub upvote_ratio: f64,
    pub subreddit: String,
    pub created_utc: f64,
}

impl PostRecord {
    pub const COLUMNS: [&'static str; 9] = [
        "id",
        "title",
        "selftext",
        "score",
        "num_comments",
        "view_count",
        "upvote_ratio",
        "subreddit",
        "created_utc",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_filter_order_and_wire_values() {
        let values: Vec<&str> = TimeFilter::ALL.iter().map(TimeFilter::as_str).collect();
        assert_eq!(values, vec!["day", "week", "month", "year", "all"]);
    }

    #[test]
    fn test_default_search_configuration() {
        let config = SearchConfiguration::default();
        assert_eq!(config.subreddits(), &["samsunggalaxy".to_string()]);
        assert_eq!(config.keywords().len(), 18);
        assert_eq!(config.keywords()[0], "honest review");
        assert_eq!(config.limit(), 100);
        assert_eq!(config.query_count(), 18 * 5);
    }

    #[test]
    fn test_search_configuration_keeps_order() {
        let config = SearchConfiguration::new(["b", "a"], ["z", "y", "x"]).with_limit(25);
        assert_eq!(config.subreddits(), &["b".to_string(), "a".to_string()]);
        assert_eq!(
            config.keywords(),
            &["z".to_string(), "y".to_string(), "x".to_string()]
        );
        assert_eq!(config.limit(), 25);
        assert_eq!(config.query_count(), 30);
    }
}
