use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use crate::{
    constants::DEFAULT_LIST_LIMIT,
    error::Result,
    services::normalizer,
    utils::{ensure_list_limit, normalize_wallet_id},
};

use super::{upstream_client, AppState, ProxyQuery};

// Transactions have no canonical shape of their own; they are relayed raw.

/// GET /api/v1/wallet/{wallet_id}/transaction?limit=N
pub async fn list_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
    query: ProxyQuery,
) -> Result<Json<Vec<Value>>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let limit = ensure_list_limit(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let payload = client.list_transactions(&wallet_id, limit).await?;
    Ok(Json(normalizer::records(&payload, "transactions")))
}

/// GET /api/v1/wallet/{wallet_id}/transaction/{tx_id}
pub async fn get_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((wallet_id, tx_id)): Path<(String, String)>,
    query: ProxyQuery,
) -> Result<Json<Value>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let raw = client.get_transaction(&wallet_id, &tx_id).await?;
    Ok(Json(raw))
}
