//! ChainCast IDS server: HTTP ingestion and query API plus the realtime
//! WebSocket channel, built on `ids-lib`.

pub mod api;
pub mod config;
pub mod error;
pub mod ws;

pub use api::{create_router, serve, AppState};
pub use config::ServerConfig;
