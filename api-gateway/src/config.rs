//! Application configuration

use std::env;

/// Application configuration
pub struct AppConfig {
    /// Listening address
    pub addr: String,
    /// Database URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Seed the in-memory store with sample data
    pub demo: bool,
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn new() -> Self {
        Self {
            addr: env::var("API_ADDR").unwrap_or_else(|_| {
                let port = env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse::<u16>().ok())
                    .unwrap_or(8080);
                format!("127.0.0.1:{}", port)
            }),
            database_url: env::var("DATABASE_URL").ok(),
            demo: env::var("DEMO").map(|v| v == "true" || v == "1").unwrap_or(false),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
