use harvest_core::{CoreError, ErrorReporter, HarvestConfig, RedditCredentials};
use harvester::{export, Harvester};
use reddit_client::RedditClient;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH_VAR: &str = "HARVEST_CONFIG";
const PREVIEW_ROWS: usize = 5;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("reddit_harvest=info,harvester=info,reddit_client=info,harvest_core=info")
        }))
        .init();

    info!("Starting Reddit Harvest");

    run().await.map_err(|e| {
        ErrorReporter::new().report_error(&e);
        e
    })
}

async fn run() -> Result<(), CoreError> {
    let credentials = RedditCredentials::from_env();
    let config_path = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    let config = HarvestConfig::load(config_path.as_deref())?;

    info!(
        "Sweeping {} subreddit(s) x {} keyword(s) x {} time filters ({} searches, limit {})",
        config.search.subreddits().len(),
        config.search.keywords().len(),
        config.search.time_filters().len(),
        config.search.query_count(),
        config.search.limit()
    );

    let mut harvester = Harvester::new(RedditClient::new(credentials), config.search);
    harvester.connect().await?;

    let mut posts = Vec::new();
    let fetched = harvester.fetch(&mut posts).await;
    if let Some(session) = harvester.session() {
        info!("Reddit API usage: {}", session.get_api_metrics().await.summary());
    }
    fetched?;

    let table = export(posts)?;
    table.write_csv_targets(&config.output.targets)?;

    for (index, row) in table.head(PREVIEW_ROWS).iter().enumerate() {
        info!(
            "{:>3} {} r/{} score={} comments={} {}",
            index, row.id, row.subreddit, row.score, row.num_comments, row.title
        );
    }

    Ok(())
}
