//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL URL; when absent the in-memory store is
///   used
/// - `JWT_SECRET` — HS256 signing key (a dev default is used, with a
///   warning, when absent)
/// - `JWT_EXPIRY_HOURS` — token lifetime (default: `168`, one week)
/// - `UPLOAD_BASE_URL` — base for placeholder upload URLs
/// - `PRUNE_INTERVAL_HOURS` — notification pruner cadence (default: `24`)
/// - `NOTIFICATION_RETENTION_DAYS` — how long read notifications live
///   (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub upload_base_url: String,
    pub prune_interval_hours: u64,
    pub notification_retention_days: i64,
}

const DEV_JWT_SECRET: &str = "dev-secret-change-me-at-least-32-chars";

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            jwt_secret,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(168),
            upload_base_url: std::env::var("UPLOAD_BASE_URL")
                .unwrap_or_else(|_| "https://uploads.invalid".to_string()),
            prune_interval_hours: std::env::var("PRUNE_INTERVAL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            notification_retention_days: std::env::var("NOTIFICATION_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiry_hours: 168,
            upload_base_url: "https://uploads.invalid".to_string(),
            prune_interval_hours: 24,
            notification_retention_days: 30,
        }
    }
}
