use anyhow::{Context, Result};
use std::env;
use tracing::info;

use common::GameId;
use server::Services;
use server::config::ServerConfig;

/// Print a leaderboard as JSON: `server [global|<game-id>]`.
#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;
    server::telemetry::init_tracing();

    let board = env::args().nth(1).unwrap_or_else(|| "global".to_string());
    info!("Reading {} leaderboard for app {}", board, config.app_id);

    let services = Services::from_config(&config).await?;
    let json = if board == "global" {
        serde_json::to_string_pretty(&services.ranker.get_global_leaderboard().await?)?
    } else {
        let game: GameId = board.parse().context("Expected `global` or a game id")?;
        serde_json::to_string_pretty(&services.ranker.get_leaderboard(game).await?)?
    };

    println!("{}", json);
    Ok(())
}
