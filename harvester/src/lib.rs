pub mod export;


pub use export::{export, ResultTable};

use harvest_core::{CoreError, PostRecord, SearchConfiguration};
use reddit_client::{Connector, PostSearch, SearchQuery};
use tracing::{error, info};

/// Drives the connect → fetch → export sweep over one [`SearchConfiguration`].
pub struct Harvester<C: Connector> {
    connector: C,
    config: SearchConfiguration,
    session: Option<C::Session>,
}

impl<C: Connector> Harvester<C> {
    pub fn new(connector: C, config: SearchConfiguration) -> Self {
        Self {
            connector,
            config,
            session: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&C::Session> {
        self.session.as_ref()
    }

    pub async fn connect(&mut self) -> Result<(), CoreError> {
        match self.connector.connect().await {
            Ok(session) => {
                self.session = Some(session);
                info!("Reddit client initialized successfully.");
                Ok(())
            }
            Err(e) => {
                error!("Failed to initialize Reddit client: {}", e);
                Err(e)
            }
        }
    }

    /// Run the full sweep, appending every result to `accumulator`.
    ///
    /// Order is subreddit, then keyword, then time filter. Results are kept
    /// as returned, duplicates included. The first failed search aborts the
    /// sweep; whatever was appended before it stays in `accumulator`.
    ///
    /// Returns how many records this call appended.
    pub async fn fetch(&self, accumulator: &mut Vec<PostRecord>) -> Result<usize, CoreError> {
        let session = self.session.as_ref().ok_or(CoreError::NotConnected)?;
        let start_len = accumulator.len();

        for subreddit in self.config.subreddits() {
            for keyword in self.config.keywords() {
                info!("Searching '{}' in r/{}...", keyword, subreddit);

                for &time_filter in self.config.time_filters() {
                    let query =
                        SearchQuery::top(subreddit, keyword, self.config.limit(), time_filter);

                    let posts = session.search(&query).await.map_err(|source| {
                        let e = CoreError::FetchFailed {
                            subreddit: subreddit.clone(),
                            keyword: keyword.clone(),
                            time_filter,
                            source: Box::new(source),
                        };
                        error!("Failed to fetch posts: {}", e);
                        e
                    })?;

                    accumulator.extend(posts.into_iter().map(PostRecord::from));
                }
            }
        }

        info!("Fetched {} posts.", accumulator.len());
        Ok(accumulator.len() - start_len)
    }
}
