// Utility modules

use crate::{
    constants::{LOG_SECRET_PREFIX_LEN, MAX_LIST_LIMIT, WALLET_ID_HEX_LEN},
    error::{AppError, Result},
};

/// Strips an optional case-insensitive `Bearer ` prefix so a raw token and a
/// full Authorization header value normalize to the same credential.
pub fn clean_bearer_token(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => {
            trimmed[7..].trim_start().to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Validates and canonicalizes a wallet identifier: trimmed, lower-cased,
/// exactly 32 hex characters. Fails locally before any upstream call.
pub fn normalize_wallet_id(raw: &str) -> Result<String> {
    let wallet_id = raw.trim().to_ascii_lowercase();
    if wallet_id.len() != WALLET_ID_HEX_LEN || hex::decode(&wallet_id).is_err() {
        return Err(AppError::Validation(format!(
            "Invalid wallet ID format. Should be a {}-character hex string",
            WALLET_ID_HEX_LEN
        )));
    }
    Ok(wallet_id)
}

/// Basic guard for list/query limits to avoid expensive upstream queries.
pub fn ensure_list_limit(limit: u32) -> Result<u32> {
    if limit == 0 || limit > MAX_LIST_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_LIST_LIMIT
        )));
    }
    Ok(limit)
}

/// First few characters of a secret plus an ellipsis, for diagnostics.
pub fn redact_secret(secret: &str) -> String {
    truncate_for_log(secret, LOG_SECRET_PREFIX_LEN)
}

pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{}...", prefix)
}
