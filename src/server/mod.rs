pub mod config;
pub mod error;
mod http_layers;
pub mod server;
mod songs_routes;
pub mod state;
mod stats_routes;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use http_layers::*;
pub use server::{make_app, run_server};
