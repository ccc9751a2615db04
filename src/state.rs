use reqwest::Client;
use sqlx::PgPool;

use crate::cache::RedisCache;
use crate::config::Config;

/// Central application state shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,

    /// Redis-backed cache for listing search pages.
    pub cache: RedisCache,

    /// Shared HTTP client for the remote storage backends.
    pub http: Client,

    /// Application configuration loaded from environment variables or `.env`.
    pub config: Config,
}
