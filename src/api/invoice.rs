use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::json;

use crate::{
    constants::DEFAULT_LIST_LIMIT,
    error::Result,
    models::{CreateInvoiceRequest, Invoice},
    services::normalizer,
    utils::{ensure_list_limit, normalize_wallet_id},
};

use super::{upstream_client, AppJson, AppState, ProxyQuery};

/// POST /api/v1/wallet/{wallet_id}/invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
    query: ProxyQuery,
    AppJson(body): AppJson<CreateInvoiceRequest>,
) -> Result<Json<Invoice>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let payload = invoice_payload(&body);
    let raw = client.create_invoice(&wallet_id, &payload).await?;
    Ok(Json(normalizer::normalize_invoice(&raw)))
}

/// Upstream expects the amount as a decimal string and a concrete expiry.
fn invoice_payload(body: &CreateInvoiceRequest) -> serde_json::Value {
    json!({
        "valueMsat": body.value_msat.to_string(),
        "memo": body.memo.clone().unwrap_or_default(),
        "expiry": body.expiry_secs(),
    })
}

/// GET /api/v1/wallet/{wallet_id}/invoice?limit=N
pub async fn list_invoices(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
    query: ProxyQuery,
) -> Result<Json<Vec<Invoice>>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let limit = ensure_list_limit(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let payload = client.list_invoices(&wallet_id, limit).await?;
    let records = normalizer::records(&payload, "invoices");
    Ok(Json(normalizer::normalize_invoices(&records)))
}

/// GET /api/v1/wallet/{wallet_id}/invoice/{payment_hash}
pub async fn get_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((wallet_id, payment_hash)): Path<(String, String)>,
    query: ProxyQuery,
) -> Result<Json<Invoice>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let raw = client.get_invoice(&wallet_id, &payment_hash).await?;
    Ok(Json(normalizer::normalize_invoice(&raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoice_payload_stringifies_amount_and_defaults_expiry() {
        let body: CreateInvoiceRequest = serde_json::from_value(json!({
            "valueMsat": 50000,
            "memo": "Test invoice"
        }))
        .unwrap();
        let payload = invoice_payload(&body);
        assert_eq!(payload["valueMsat"], json!("50000"));
        assert_eq!(payload["memo"], json!("Test invoice"));
        assert_eq!(payload["expiry"], json!(3600));
    }

    #[test]
    fn invoice_payload_defaults_memo_to_empty() {
        let body: CreateInvoiceRequest =
            serde_json::from_value(json!({ "valueMsat": "1000", "expiry": 600 })).unwrap();
        let payload = invoice_payload(&body);
        assert_eq!(payload["memo"], json!(""));
        assert_eq!(payload["expiry"], json!(600));
    }
}
