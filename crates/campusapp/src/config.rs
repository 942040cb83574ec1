//! # Configuration
//!
//! Campus configuration is managed by [`clapfig`], which handles layered
//! loading from TOML files, environment variables, and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Command line**: `--api-url`, applied by [`crate::init::initialize`].
//! 2. **Environment variables**: `CAMPUS_API_URL`, and `CAMPUS__<KEY>` for any key.
//! 3. **Data dir config**: `<data dir>/campus.toml`.
//! 4. **Global config**: OS-appropriate config directory (via `directories`).
//! 5. **Compiled defaults**: built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `api_url` | `http://localhost:3000` | Base URL of the school site |
//! | `timeout_secs` | `30` | Per-request timeout |
//! | `user_agent` | `campus/<version>` | Sent with every request |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_user_agent() -> String {
    format!("campus/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration for campus, stored in `campus.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CampusConfig {
    /// Base URL of the school site; API paths are joined onto it.
    #[config(default = "http://localhost:3000")]
    pub api_url: String,

    /// Seconds before a request is abandoned.
    #[config(default = 30)]
    pub timeout_secs: u64,

    /// When absent, defaults to `campus/<version>`.
    pub user_agent: Option<String>,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl CampusConfig {
    /// The request timeout. Zero is treated as the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(default_user_agent)
    }

    /// Base URL without trailing slashes.
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CampusConfig::default();
        assert_eq!(config.api_url(), "http://localhost:3000");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent().starts_with("campus/"));
    }

    #[test]
    fn test_zero_timeout_falls_back() {
        let config = CampusConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = CampusConfig {
            api_url: "https://school.test/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://school.test");
    }

    #[test]
    fn test_blank_user_agent_uses_default() {
        let config = CampusConfig {
            user_agent: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.user_agent().starts_with("campus/"));
    }

    #[test]
    fn test_parses_from_toml() {
        let config: CampusConfig =
            toml::from_str("api_url = \"https://hillcrest.test\"\ntimeout_secs = 5\n").unwrap();
        assert_eq!(config.api_url(), "https://hillcrest.test");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent, None);
    }
}
