use std::sync::Arc;

use crate::config::ServerConfig;
use crate::throttle::PreviewThrottle;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wardrobe_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Price preview throttle.
    pub throttle: Arc<PreviewThrottle>,
}

impl AppState {
    pub fn new(pool: wardrobe_db::DbPool, config: ServerConfig) -> Self {
        let throttle = Arc::new(PreviewThrottle::with_max_keys(
            config.preview_rate_limit_per_min,
            config.preview_throttle_max_keys,
        ));
        Self {
            pool,
            config: Arc::new(config),
            throttle,
        }
    }
}
