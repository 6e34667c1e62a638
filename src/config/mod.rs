mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

const SQLITE_URL_PREFIX: &str = "sqlite://";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database_url: Option<String>,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub read_pool_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        CliConfig {
            database_url: None,
            port: server.port,
            bind_address: server.bind_address,
            logging_level: server.requests_logging_level,
            read_pool_size: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub read_pool_size: usize,
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let database_url = file
            .database_url
            .or_else(|| cli.database_url.clone())
            .ok_or_else(|| {
                anyhow!(
                    "database url must be specified via --database-url, DATABASE_URL or in config file"
                )
            })?;
        let database_path = parse_database_url(&database_url)?;

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = match file.logging_level {
            Some(level) => parse_logging_level(&level)
                .ok_or_else(|| anyhow!("Invalid logging_level {:?} in config file", level))?,
            None => cli.logging_level.clone(),
        };

        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        let max_body_bytes = match file.max_body_size {
            Some(size) => parse_body_size(&size)?,
            None => ServerConfig::default().max_body_bytes,
        };

        Ok(AppConfig {
            database_path,
            port,
            bind_address,
            logging_level,
            read_pool_size,
            max_body_bytes,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            bind_address: self.bind_address.clone(),
            port: self.port,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Accepts `sqlite://<path>` or a bare filesystem path.
pub fn parse_database_url(url: &str) -> Result<PathBuf> {
    let url = url.trim();
    let path = match url.strip_prefix(SQLITE_URL_PREFIX) {
        Some(path) => path,
        None if url.contains("://") => {
            bail!("Unsupported database url {:?}, expected sqlite://<path>", url)
        }
        None => url,
    };
    if path.is_empty() {
        bail!("Database url {:?} does not name a file", url);
    }
    Ok(PathBuf::from(path))
}

fn parse_body_size(s: &str) -> Result<usize> {
    let bytes = byte_unit::Byte::parse_str(s, true)
        .map_err(|e| anyhow!("Invalid max_body_size {:?}: {}", s, e))?
        .as_u64();
    if bytes == 0 {
        bail!("max_body_size must be greater than zero");
    }
    usize::try_from(bytes).map_err(|_| anyhow!("max_body_size {:?} is too large", s))
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
