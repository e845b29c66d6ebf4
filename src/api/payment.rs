use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};

use crate::{
    constants::DEFAULT_LIST_LIMIT,
    error::{AppError, Result},
    models::{PayInvoiceRequest, Payment},
    services::normalizer,
    utils::{ensure_list_limit, normalize_wallet_id, truncate_for_log},
};

use super::{upstream_client, AppJson, AppState, ProxyQuery};

/// POST /api/v1/wallet/{wallet_id}/payment
///
/// The upstream response is authoritative: a submitted payment is reported
/// back even while still in flight, and callers poll for the final status.
pub async fn pay_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
    query: ProxyQuery,
    AppJson(body): AppJson<PayInvoiceRequest>,
) -> Result<Json<Payment>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let (client, network) = upstream_client(&state, &headers, query.network.as_deref())?;

    tracing::info!(
        %wallet_id,
        coin = network.coin(),
        invoice = %truncate_for_log(&body.invoice, 20),
        "submitting payment"
    );

    let payload = json!({
        "invoice": body.invoice,
        "passphrase": body.passphrase,
    });

    let raw = client.pay_invoice(&wallet_id, &payload).await?;
    Ok(Json(normalizer::normalize_payment(&raw)))
}

/// GET /api/v1/wallet/{wallet_id}/payment?limit=N
pub async fn list_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
    query: ProxyQuery,
) -> Result<Json<Vec<Payment>>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let limit = ensure_list_limit(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let payload = client.list_payments(&wallet_id, limit).await?;
    let records = normalizer::records(&payload, "payments");
    Ok(Json(normalizer::normalize_payments(&records)))
}

/// GET /api/v1/wallet/{wallet_id}/payment/{payment_hash}
///
/// Direct lookup first; if the upstream rejects it (some deployments do not
/// expose the single-payment route), fall back to one list call and scan for
/// the hash.
pub async fn get_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((wallet_id, payment_hash)): Path<(String, String)>,
    query: ProxyQuery,
) -> Result<Json<Payment>> {
    let wallet_id = normalize_wallet_id(&wallet_id)?;
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;

    let raw = match client.get_payment(&wallet_id, &payment_hash).await {
        Ok(raw) => raw,
        Err(err) => {
            tracing::debug!(%err, %payment_hash, "direct payment lookup failed; scanning list");
            let payload = client.list_payments(&wallet_id, DEFAULT_LIST_LIMIT).await?;
            find_by_hash(&payload, &payment_hash).ok_or_else(|| {
                AppError::Upstream(format!("Payment {} not found", payment_hash))
            })?
        }
    };

    Ok(Json(normalizer::normalize_payment(&raw)))
}

// Hash location varies by shape (top-level vs `paymentStatus.paymentHash`),
// so compare against the normalizer's view instead of probing fields here.
fn find_by_hash(payload: &Value, payment_hash: &str) -> Option<Value> {
    normalizer::records(payload, "payments")
        .into_iter()
        .find(|record| normalizer::normalize_payment(record).payment_hash == payment_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_scan_finds_matching_hash() {
        let payload = json!({
            "payments": [
                { "paymentHash": "aaa", "status": "settled" },
                { "paymentHash": "bbb", "status": "failed" }
            ]
        });
        let found = find_by_hash(&payload, "bbb").unwrap();
        assert_eq!(found["status"], json!("failed"));
    }

    #[test]
    fn list_scan_finds_nested_shape_hash() {
        let payload = json!({
            "payments": [
                { "paymentHash": "aaa", "status": "settled" },
                { "paymentStatus": { "paymentHash": "ccc", "status": "settled" } }
            ]
        });
        let found = find_by_hash(&payload, "ccc").unwrap();
        assert_eq!(found["paymentStatus"]["status"], json!("settled"));
    }

    #[test]
    fn list_scan_misses_absent_hash() {
        let payload = json!({ "payments": [ { "paymentHash": "aaa" } ] });
        assert!(find_by_hash(&payload, "zzz").is_none());
    }
}
