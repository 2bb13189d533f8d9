//! Lorekeep Engine - preview entry point.
//!
//! `lorekeep-engine preview <campaign-id> <user-id>` prints the campaign as
//! that user would see it.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lorekeep_domain::{CampaignId, UserId};
use lorekeep_engine::infrastructure::config::{load_dotenv_from_repo_root, EngineConfig};
use lorekeep_engine::infrastructure::snapshot::SnapshotStore;
use lorekeep_engine::App;

#[derive(Parser)]
#[command(name = "lorekeep-engine")]
#[command(about = "Campaign snapshot tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the campaign overview as one user would see it.
    Preview {
        campaign_id: CampaignId,
        user_id: UserId,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment from repo root when run from `crates/engine`.
    load_dotenv_from_repo_root();
    let config = EngineConfig::from_env().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Preview {
            campaign_id,
            user_id,
        } => preview(&config, campaign_id, &user_id).await,
    }
}

async fn preview(
    config: &EngineConfig,
    campaign_id: CampaignId,
    user_id: &UserId,
) -> anyhow::Result<()> {
    let path = config.require_snapshot_path()?;
    tracing::info!(path = %path.display(), "Loading snapshot");
    let store = SnapshotStore::load(path)
        .await
        .with_context(|| format!("Failed to load snapshot from {}", path.display()))?;
    let app = App::with_snapshot(Arc::new(store));

    let overview = app
        .queries
        .campaign_overview(campaign_id, user_id)
        .await
        .with_context(|| format!("Cannot preview campaign {} as {}", campaign_id, user_id))?;

    let rendered = if config.pretty {
        serde_json::to_string_pretty(&overview)?
    } else {
        serde_json::to_string(&overview)?
    };
    println!("{}", rendered);
    Ok(())
}
