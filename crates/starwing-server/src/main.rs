//! Server binary entry point.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use starwing_server::{config, GameServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = config::parse_or_exit();
    tracing::info!(
        port = args.port,
        hostname = %args.hostname,
        game = %args.game,
        "starting server"
    );

    let server = GameServer::new(&args.hostname, args.port, args.game)
        .await
        .context("server startup failed")?;
    server.run().await?;
    Ok(())
}
