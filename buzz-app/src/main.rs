use std::path::PathBuf;

use anyhow::Result;
use buzz_common::OutputFormat;
use buzz_common::observability::init_logging;
use buzz_config::{BuzzConfig, BuzzConfigLoader};
use buzz_realtime::SortMode;
use clap::{Args, Parser, Subcommand};

mod commands;

const DEFAULT_CONFIG_FILE: &str = "buzz.yaml";

#[derive(Parser)]
#[command(name = "buzz", about = "Yahoo! JAPAN realtime search from the terminal", version)]
pub(crate) struct Cli {
    /// Config file (default: ./buzz.yaml when present)
    #[arg(long, global = true, env = "BUZZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output encoding
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Search tweets, optionally paging further back
    Search(SearchArgs),
    /// Poll a query for tweets newer than the first page
    Latest(LatestArgs),
    /// Replies to a tweet
    Replies(RepliesArgs),
    /// A single tweet by id
    Tweet(TweetArgs),
    /// Trending terms, popular tweets and rising terms
    Trend,
    /// Tweet volume over time for a query
    Transition(TransitionArgs),
}

#[derive(Args)]
pub(crate) struct QueryArgs {
    pub query: String,

    /// Only tweets with images
    #[arg(long)]
    pub media: bool,

    /// recency | popularity (default from config)
    #[arg(long)]
    pub sort: Option<SortMode>,
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Extra pages of older results to fetch
    #[arg(long, default_value_t = 0)]
    pub more: usize,
}

#[derive(Args)]
pub(crate) struct LatestArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Number of polls
    #[arg(long, default_value_t = 1)]
    pub polls: usize,

    /// Seconds between polls
    #[arg(long, default_value_t = 30)]
    pub every: u64,
}

#[derive(Args)]
pub(crate) struct RepliesArgs {
    pub tweet_id: String,

    /// Pages of replies to fetch
    #[arg(long, default_value_t = 1)]
    pub times: usize,
}

#[derive(Args)]
pub(crate) struct TweetArgs {
    pub tweet_id: String,
}

#[derive(Args)]
pub(crate) struct TransitionArgs {
    pub query: String,

    /// Bucket size in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Window length in seconds
    #[arg(long)]
    pub span: Option<u64>,

    /// Only tweets with images
    #[arg(long)]
    pub media: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<BuzzConfig> {
    let loader = match path {
        Some(p) => BuzzConfigLoader::new().with_file(p),
        None => BuzzConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    Ok(loader.load()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;

    let log_path = init_logging(cfg.logging.log_config("buzz"))?;
    tracing::debug!(log_path = %log_path.display(), "buzz.start");

    commands::run(cli, cfg).await
}
