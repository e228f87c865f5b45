/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Price previews allowed per caller per minute (default: `60`, `0` disables).
    pub preview_rate_limit_per_min: u32,
    /// Most distinct callers the preview throttle tracks at once (default: `10000`).
    pub preview_throttle_max_keys: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                       |
    /// | `PREVIEW_RATE_LIMIT_PER_MIN`  | `60`                       |
    /// | `PREVIEW_THROTTLE_MAX_KEYS`   | `10000`                    |
    ///
    /// `DATABASE_URL` is required and read separately at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let preview_rate_limit_per_min: u32 = std::env::var("PREVIEW_RATE_LIMIT_PER_MIN")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("PREVIEW_RATE_LIMIT_PER_MIN must be a valid u32");

        let preview_throttle_max_keys: usize = std::env::var("PREVIEW_THROTTLE_MAX_KEYS")
            .unwrap_or_else(|_| "10000".into())
            .parse()
            .expect("PREVIEW_THROTTLE_MAX_KEYS must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            preview_rate_limit_per_min,
            preview_throttle_max_keys,
        }
    }
}
