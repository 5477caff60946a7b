//! Configuration management for the Ridepool server.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Booking policy knobs
    pub booking: BookingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Booking policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Upper bound on seats in a single booking request, enforced at the
    /// HTTP boundary (the ledger itself only requires seats > 0)
    pub max_seats_per_booking: u32,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("RIDEPOOL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("RIDEPOOL_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            },
            booking: BookingConfig {
                max_seats_per_booking: env::var("RIDEPOOL_MAX_SEATS_PER_BOOKING")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8),
            },
        }
    }

    /// Socket address string the server binds to
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8080,
                log_level: "info".into(),
            },
            booking: BookingConfig {
                max_seats_per_booking: 8,
            },
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
