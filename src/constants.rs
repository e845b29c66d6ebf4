/// Application constants

pub const API_VERSION: &str = "v1";

// Upstream provider environments
pub const DEFAULT_TESTNET_API_URL: &str = "https://app.bitgo-test.com";
pub const DEFAULT_MAINNET_API_URL: &str = "https://app.bitgo.com";

// Coin identifiers used in upstream path construction
pub const COIN_TESTNET: &str = "tlnbtc";
pub const COIN_MAINNET: &str = "lnbtc";

// Wallet identifiers are 32 lowercase hex characters
pub const WALLET_ID_HEX_LEN: usize = 32;

// List pagination
pub const DEFAULT_LIST_LIMIT: u32 = 10;
pub const MAX_LIST_LIMIT: u32 = 500;

// Invoice defaults
pub const DEFAULT_INVOICE_EXPIRY_SECS: u64 = 3600;

// Upstream HTTP timeouts
pub const UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 4;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

// Diagnostic logging caps; secrets are truncated harder than payloads
pub const LOG_SECRET_PREFIX_LEN: usize = 10;
pub const LOG_INVOICE_PREFIX_LEN: usize = 20;
pub const LOG_BODY_MAX_LEN: usize = 600;
