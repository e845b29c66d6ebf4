use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::Result,
    models::{GenerateWalletRequest, Wallet},
    services::normalizer,
    utils::normalize_wallet_id,
};

use super::{upstream_client, AppJson, AppState, ProxyQuery};

/// POST /api/v1/wallet/generate
///
/// Relays the created wallet and keychain material exactly as the upstream
/// sent it; keychains are opaque to this proxy.
pub async fn generate_wallet(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: ProxyQuery,
    AppJson(body): AppJson<GenerateWalletRequest>,
) -> Result<Json<Value>> {
    let (client, network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let payload = json!({
        "label": body.label,
        "passphrase": body.passphrase,
        "enterprise": body.enterprise,
        "passcodeEncryptionCode": body.passcode_encryption_code,
        "subType": "lightningCustody",
    });

    let created = client.generate_wallet(network.coin(), &payload).await?;
    tracing::info!(
        wallet_id = created["wallet"]["id"].as_str().unwrap_or("unknown"),
        coin = network.coin(),
        "wallet created"
    );
    Ok(Json(created))
}

/// GET /api/v1/wallet/{wallet_id}
pub async fn get_wallet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
    query: ProxyQuery,
) -> Result<Json<Wallet>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let raw = client.get_wallet(&wallet_id).await?;
    Ok(Json(normalizer::normalize_wallet(&raw)))
}
