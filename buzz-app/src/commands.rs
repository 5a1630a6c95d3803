use std::time::Duration;

use anyhow::Result;
use buzz_common::OutputFormat;
use buzz_config::BuzzConfig;
use buzz_realtime::{
    RealtimeClient, ReplyCursor, SearchCursor, SearchOptions, TrendSnapshot, Tweet,
};
use serde::Serialize;

use crate::{Cli, Commands, QueryArgs};

#[derive(Serialize)]
struct SearchReport<'a> {
    query: &'a str,
    results: Vec<Tweet>,
    trend: &'a TrendSnapshot,
    cursor: &'a SearchCursor,
}

#[derive(Serialize)]
struct PollReport<'a> {
    poll: usize,
    results: Vec<Tweet>,
    cursor: &'a SearchCursor,
}

#[derive(Serialize)]
struct ThreadReport<'a> {
    parent: &'a Tweet,
    replies: Vec<Tweet>,
    cursor: ReplyCursor,
}

fn search_options(args: &QueryArgs, cfg: &BuzzConfig) -> SearchOptions {
    SearchOptions {
        media_only: args.media || cfg.search.media_only,
        sort: args.sort.unwrap_or(cfg.search.sort),
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
    })
}

fn emit<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

pub(crate) async fn run(cli: Cli, cfg: BuzzConfig) -> Result<()> {
    let client = RealtimeClient::new(&cfg.realtime.client_settings())?;
    let format = cli.format;

    match cli.command {
        Commands::Search(args) => {
            let opts = search_options(&args.query, &cfg);
            let mut search = client.search(&args.query.query, opts).await?;
            let mut results = search.results().to_vec();
            if args.more > 0 {
                results.extend(search.fetch_more(args.more).await?);
            }
            tracing::info!(
                query = %args.query.query,
                results = results.len(),
                "buzz.search.done"
            );
            emit(
                &SearchReport {
                    query: search.query(),
                    results,
                    trend: search.trend(),
                    cursor: search.cursor(),
                },
                format,
            )
        }
        Commands::Latest(args) => {
            let opts = search_options(&args.query, &cfg);
            let mut search = client.search(&args.query.query, opts).await?;
            for poll in 0..args.polls {
                if poll > 0 {
                    tokio::time::sleep(Duration::from_secs(args.every)).await;
                }
                let results = search.fetch_latest().await?;
                tracing::info!(poll, new = results.len(), "buzz.latest.poll");
                emit(
                    &PollReport {
                        poll,
                        results,
                        cursor: search.cursor(),
                    },
                    format,
                )?;
            }
            Ok(())
        }
        Commands::Replies(args) => {
            let parent = client.tweet(&args.tweet_id).await?;
            let mut thread = client.thread(parent);
            let replies = thread.fetch_replies(args.times).await?;
            emit(
                &ThreadReport {
                    parent: thread.parent(),
                    replies,
                    cursor: thread.cursor(),
                },
                format,
            )
        }
        Commands::Tweet(args) => emit(&client.tweet(&args.tweet_id).await?, format),
        Commands::Trend => emit(&client.trend().await?, format),
        Commands::Transition(args) => {
            let mut opts = cfg.transition.options(args.media || cfg.search.media_only);
            if let Some(interval) = args.interval {
                opts.interval_secs = interval;
            }
            if let Some(span) = args.span {
                opts.span_secs = span;
            }
            emit(&client.transition(&args.query, opts).await?, format)
        }
    }
}
