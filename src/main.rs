use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songs_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use songs_catalog_server::server::run_server;
use songs_catalog_server::{RequestsLoggingLevel, SqliteSongStore};

#[derive(Parser, Debug)]
#[command(version, about = "Songs catalog REST API server")]
struct CliArgs {
    /// Optional TOML config file. Values in it override command line values.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Database location, either `sqlite://<path>` or a plain path.
    #[clap(long, env = "DATABASE_URL", default_value = "sqlite://songs.db")]
    pub database_url: String,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = 4)]
    pub read_pool_size: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            database_url: Some(self.database_url.clone()),
            port: self.port,
            bind_address: self.bind_address.clone(),
            logging_level: self.logging_level.clone(),
            read_pool_size: self.read_pool_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening songs database at {:?}...", config.database_path);
    let song_store = SqliteSongStore::new(&config.database_path, config.read_pool_size)
        .context("Failed to open songs database")?;

    info!(
        "Starting server on {}:{} (requests logging: {})",
        config.bind_address, config.port, config.logging_level
    );
    run_server(config.server_config(), Arc::new(song_store)).await
}
