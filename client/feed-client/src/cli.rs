//! Command-line front-end
//!
//! echo-feed [feed]
//! echo-feed post <text> [--media <url>]
//! echo-feed react <post-id> <symbol>
//! echo-feed watch
//! echo-feed healthcheck

use anyhow::{anyhow, bail, Context, Result};
use echo_common::PostId;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::diagnostics::ErrorLog;
use crate::services::{start_realtime, FeedStore, RealtimeHandle, SyncClient};
use crate::session::{FeedSession, PublishOutcome};
use crate::theme::ThemeSettings;
use crate::views::PostCard;

pub const USAGE: &str = "usage: echo-feed [feed | post <text> [--media <url>] | react <post-id> <symbol> | watch | healthcheck]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Feed,
    Post { text: String, media: Option<String> },
    React { post_id: PostId, symbol: String },
    Watch,
    Healthcheck,
}

/// Parse arguments, binary name excluded
pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();

    let command = match args.next().as_deref() {
        None | Some("feed") => Command::Feed,
        Some("post") => {
            let mut text = None;
            let mut media = None;
            while let Some(arg) = args.next() {
                if arg == "--media" {
                    media = Some(args.next().ok_or_else(|| anyhow!("--media needs a URL"))?);
                } else if text.is_none() {
                    text = Some(arg);
                } else {
                    bail!("unexpected argument: {arg}");
                }
            }
            Command::Post {
                text: text.ok_or_else(|| anyhow!("post needs text\n{USAGE}"))?,
                media,
            }
        }
        Some("react") => {
            let post_id = args
                .next()
                .ok_or_else(|| anyhow!("react needs a post id\n{USAGE}"))?
                .parse::<PostId>()
                .context("post id must be a number")?;
            let symbol = args
                .next()
                .ok_or_else(|| anyhow!("react needs a reaction symbol\n{USAGE}"))?;
            Command::React { post_id, symbol }
        }
        Some("watch") => Command::Watch,
        Some("healthcheck") => Command::Healthcheck,
        Some(other) => bail!("unknown command: {other}\n{USAGE}"),
    };

    if let Some(extra) = args.next() {
        bail!("unexpected argument: {extra}\n{USAGE}");
    }

    Ok(command)
}

pub async fn run(command: Command, config: &Config, error_log: ErrorLog) -> Result<()> {
    let client = Arc::new(
        SyncClient::from_config(config, error_log.clone())
            .context("Failed to build feed API client")?,
    );

    let store = Arc::new(FeedStore::new(client.clone(), &config.author_name));
    let mut session = FeedSession::new(
        store.clone(),
        ThemeSettings::from_system(config.color_scheme),
    );

    match command {
        Command::Healthcheck => healthcheck(&client).await?,
        Command::Feed => {
            session.refresh().await;
            println!("{}", session.feed_view().await);
        }
        Command::Post { text, media } => {
            session.open_composer();
            session.composer_mut().text = text;
            session.composer_mut().media = media;

            match session.publish().await {
                PublishOutcome::Skipped => bail!("post text is empty"),
                PublishOutcome::Failed => {
                    bail!("post was not published, see {}", error_log.path().display())
                }
                PublishOutcome::Published(_) => println!("{}", session.feed_view().await),
            }
        }
        Command::React { post_id, symbol } => {
            session.refresh().await;
            let post = store.react_symbol(post_id, &symbol).await?;
            println!("{}", PostCard::from(&post));
        }
        Command::Watch => {
            session.refresh().await;
            println!("{}", session.feed_view().await);

            let handle = start_realtime(config, store.clone(), error_log)
                .ok_or_else(|| anyhow!("realtime is disabled, set ECHO_REALTIME_ENABLED=true"))?;

            watch_until(handle, tokio::signal::ctrl_c()).await?;
        }
    }

    Ok(())
}

/// Keep refreshing until `stop` resolves. A closed or failed socket ends the
/// watch with an error.
async fn watch_until<F>(mut handle: RealtimeHandle, stop: F) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let outcome = tokio::select! {
        signal = stop => {
            info!("Stopping realtime refresh");
            signal.context("Failed to listen for Ctrl-C")
        }
        closed = handle.closed() => match closed {
            Ok(()) => Err(anyhow!("realtime connection closed by server")),
            Err(e) => Err(anyhow::Error::new(e).context("realtime connection failed")),
        },
    };

    handle.shutdown();
    outcome
}

async fn healthcheck(client: &SyncClient) -> Result<()> {
    if client.health_check().await {
        info!(base_url = %client.base_url(), "Healthcheck passed");
        Ok(())
    } else {
        bail!("healthcheck failed: {}/posts is not reachable", client.base_url())
    }
}
