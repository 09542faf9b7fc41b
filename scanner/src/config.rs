//! Scan client configuration, loaded from `.env` and the environment.

use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Base URL that `jemaat` and `kehadiran/scan` are resolved against.
    pub api_url: Url,
    pub timeout: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            api_url: default_url(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn default_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL")
}

impl ScannerConfig {
    /// Reads `KEHADIRAN_API_URL` and `KEHADIRAN_TIMEOUT_SECS`.
    ///
    /// Malformed values fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = match env::var("KEHADIRAN_API_URL") {
            Ok(raw) => Url::parse(raw.trim()).unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "invalid KEHADIRAN_API_URL, using default");
                default_url()
            }),
            Err(_) => default_url(),
        };

        let timeout_secs = match env::var("KEHADIRAN_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid KEHADIRAN_TIMEOUT_SECS, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }

    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }
}
