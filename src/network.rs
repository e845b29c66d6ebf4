use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    constants::{COIN_MAINNET, COIN_TESTNET},
    error::{AppError, Result},
};

/// Upstream network selector. The upstream provider runs separate test and
/// production deployments with distinct coin identifiers; every proxied call
/// carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Tlnbtc,
    Lnbtc,
}

impl Network {
    /// Resolves the optional `network` query parameter. An absent selector
    /// defaults to testnet; an explicitly invalid one is rejected before any
    /// upstream call is made.
    pub fn from_selector(raw: Option<&str>) -> Result<Self> {
        match raw {
            None => Ok(Network::Tlnbtc),
            Some("tlnbtc") => Ok(Network::Tlnbtc),
            Some("lnbtc") => Ok(Network::Lnbtc),
            Some(other) => Err(AppError::InvalidNetwork(other.to_string())),
        }
    }

    /// Coin identifier used in upstream path construction.
    pub fn coin(&self) -> &'static str {
        match self {
            Network::Tlnbtc => COIN_TESTNET,
            Network::Lnbtc => COIN_MAINNET,
        }
    }

    pub fn base_url<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            Network::Tlnbtc => &config.testnet_api_url,
            Network::Lnbtc => &config.mainnet_api_url,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Tlnbtc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_MAINNET_API_URL, DEFAULT_TESTNET_API_URL};

    fn config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3001,
            environment: "development".to_string(),
            testnet_api_url: DEFAULT_TESTNET_API_URL.to_string(),
            mainnet_api_url: DEFAULT_MAINNET_API_URL.to_string(),
            upstream_timeout_secs: 30,
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[test]
    fn absent_selector_defaults_to_testnet() {
        assert_eq!(Network::from_selector(None).unwrap(), Network::Tlnbtc);
    }

    #[test]
    fn explicit_selectors_resolve() {
        assert_eq!(
            Network::from_selector(Some("tlnbtc")).unwrap(),
            Network::Tlnbtc
        );
        assert_eq!(
            Network::from_selector(Some("lnbtc")).unwrap(),
            Network::Lnbtc
        );
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let err = Network::from_selector(Some("lnltc")).unwrap_err();
        assert!(matches!(err, AppError::InvalidNetwork(_)));
    }

    #[test]
    fn networks_select_distinct_coin_and_base_url() {
        let config = config();
        assert_ne!(Network::Tlnbtc.coin(), Network::Lnbtc.coin());
        assert_ne!(
            Network::Tlnbtc.base_url(&config),
            Network::Lnbtc.base_url(&config)
        );
        assert_eq!(Network::Tlnbtc.coin(), "tlnbtc");
        assert_eq!(Network::Lnbtc.coin(), "lnbtc");
    }
}
