use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_MAINNET_API_URL, DEFAULT_TESTNET_API_URL, DEFAULT_UPSTREAM_TIMEOUT_SECS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Upstream provider
    pub testnet_api_url: String,
    pub mainnet_api_url: String,
    pub upstream_timeout_secs: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            testnet_api_url: env::var("TESTNET_API_URL")
                .unwrap_or_else(|_| DEFAULT_TESTNET_API_URL.to_string()),
            mainnet_api_url: env::var("MAINNET_API_URL")
                .unwrap_or_else(|_| DEFAULT_MAINNET_API_URL.to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.testnet_api_url.trim().is_empty() {
            anyhow::bail!("TESTNET_API_URL is empty");
        }
        if self.mainnet_api_url.trim().is_empty() {
            anyhow::bail!("MAINNET_API_URL is empty");
        }
        for raw in [&self.testnet_api_url, &self.mainnet_api_url] {
            if url::Url::parse(raw).is_err() {
                anyhow::bail!("Upstream API URL is not a valid URL: {}", raw);
            }
        }

        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be > 0");
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3001,
            environment: "development".to_string(),
            testnet_api_url: DEFAULT_TESTNET_API_URL.to_string(),
            mainnet_api_url: DEFAULT_MAINNET_API_URL.to_string(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn malformed_upstream_url_is_rejected() {
        let mut config = base_config();
        config.mainnet_api_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = base_config();
        config.upstream_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
