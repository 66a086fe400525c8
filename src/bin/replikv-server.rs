use clap::Parser;
use replikv::cli::long_flags;
use replikv::{Config, Server, DEFAULT_CONFIG};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct App {
    /// Path to the JSON node configuration.
    #[clap(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[clap(long, default_value = "info", env = "REPLIKV_LOG")]
    log_level: tracing_subscriber::filter::LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse_from(long_flags(std::env::args_os(), &["config", "log-level"]));
    tracing_subscriber::fmt()
        .with_max_level(app.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_file(&app.config)?;
    info!(
        "replikv-server version: {}, config: {}",
        env!("CARGO_PKG_VERSION"),
        app.config.display()
    );

    match config.peer()? {
        Some(peer) => info!(
            node = peer.base_url(),
            interval = ?peer.sync_interval,
            "Starting as replica"
        ),
        None => info!("Starting single node store"),
    }

    let server = Server::bind(&config).await?;
    server.run().await?;
    Ok(())
}
