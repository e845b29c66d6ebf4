//! Response normalization.
//!
//! The upstream provider does not version its responses and has shipped at
//! least two structurally different payment representations: a "flat" shape
//! with a top-level `status`, and a "nested" shape with a `paymentStatus`
//! sub-object plus a `transfer` sub-object carrying ledger entries. This
//! module dispatches on those structural markers and maps every variant onto
//! the canonical records in [`crate::models::lightning`].
//!
//! A malformed record never aborts a batch: it degrades to a zeroed PENDING
//! record and the remaining records are processed normally. Everything here
//! is pure and stateless.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Invoice, InvoiceStatus, Payment, PaymentStatus, Wallet};

#[derive(Debug, Error)]
enum MappingError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("unrecognized payment shape")]
    UnrecognizedShape,
}

// ==================== PAYMENTS ====================

/// Maps one upstream payment record onto the canonical shape, degrading to
/// the zeroed/PENDING fallback instead of failing.
pub fn normalize_payment(raw: &Value) -> Payment {
    match try_normalize_payment(raw) {
        Ok(payment) => payment,
        Err(err) => {
            tracing::warn!(%err, "payment record failed normalization; degrading to fallback");
            fallback_payment(raw)
        }
    }
}

/// 1:1, order-preserving batch mapping. Malformed items surface as fallback
/// records, never as gaps.
pub fn normalize_payments(records: &[Value]) -> Vec<Payment> {
    records.iter().map(normalize_payment).collect()
}

/// Pulls the record array out of a list payload; a missing or non-array key
/// is an empty list, not an error.
pub fn records(payload: &Value, key: &str) -> Vec<Value> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn try_normalize_payment(raw: &Value) -> Result<Payment, MappingError> {
    let object = raw.as_object().ok_or(MappingError::NotAnObject)?;
    // Structural dispatch: the upstream carries no version field, so the
    // presence of `paymentStatus` vs a top-level `status` is the only marker.
    if object.contains_key("paymentStatus") {
        Ok(normalize_nested_payment(raw))
    } else if object.contains_key("status") {
        Ok(normalize_flat_payment(raw))
    } else {
        Err(MappingError::UnrecognizedShape)
    }
}

/// Flat shape: `status`, `amountMsat`, `feeMsat`/`feeLimitMsat` at top level.
fn normalize_flat_payment(raw: &Value) -> Payment {
    let status = raw
        .get("status")
        .and_then(Value::as_str)
        .map(PaymentStatus::from_upstream)
        .unwrap_or(PaymentStatus::Pending);

    build_payment(
        status,
        string_field(raw, &["paymentHash"]),
        msat_field(raw, &["amountMsat", "valueMsat"]).unwrap_or_default(),
        msat_field(raw, &["feeMsat", "feeLimitMsat"]).unwrap_or_default(),
        string_field(raw, &["failureReason"]),
        string_field(raw, &["destination"]),
        string_field(raw, &["preimage", "paymentPreimage"]),
        string_field(raw, &["invoice"]),
        timestamp_field(raw, &["createdAt", "updatedAt"]),
    )
}

/// Nested shape: `paymentStatus` sub-object plus a `transfer` sub-object
/// whose ledger entries carry the destination and base-unit amounts.
fn normalize_nested_payment(raw: &Value) -> Payment {
    let empty = Value::Null;
    let payment_status = raw.get("paymentStatus").unwrap_or(&empty);
    let transfer = raw.get("transfer").unwrap_or(&empty);

    let status = payment_status
        .get("status")
        .and_then(Value::as_str)
        .map(PaymentStatus::from_upstream)
        .unwrap_or(PaymentStatus::Pending);

    let payment_hash = string_field(payment_status, &["paymentHash"])
        .or_else(|| string_field(raw, &["paymentHash"]));

    // Prefer explicit msat fields; otherwise derive from the transfer's
    // base-unit string at 1000 msat per unit.
    let value_msat = msat_field(payment_status, &["amountMsat"])
        .or_else(|| msat_field(raw, &["amountMsat"]))
        .or_else(|| base_units_as_msat(transfer, &["valueString"]))
        .unwrap_or_default();
    let fee_msat = msat_field(payment_status, &["feeMsat", "feeLimitMsat"])
        .or_else(|| base_units_as_msat(transfer, &["feeString"]))
        .unwrap_or_default();

    build_payment(
        status,
        payment_hash,
        value_msat,
        fee_msat,
        string_field(payment_status, &["failureReason"]),
        transfer_destination(transfer),
        string_field(payment_status, &["preimage", "paymentPreimage"])
            .or_else(|| string_field(raw, &["preimage", "paymentPreimage"])),
        string_field(raw, &["invoice"]),
        timestamp_field(raw, &["createdAt", "updatedAt"])
            .or_else(|| timestamp_field(transfer, &["date"])),
    )
}

#[allow(clippy::too_many_arguments)]
fn build_payment(
    status: PaymentStatus,
    payment_hash: Option<String>,
    value_msat: BigUint,
    fee_msat: BigUint,
    failure_reason: Option<String>,
    destination: Option<String>,
    preimage: Option<String>,
    invoice: Option<String>,
    timestamp: Option<DateTime<Utc>>,
) -> Payment {
    Payment {
        payment_hash: payment_hash.unwrap_or_default(),
        value_msat,
        fee_msat,
        status,
        // A failure reason only makes sense on a failed payment, and a
        // preimage is only revealed by settlement.
        failure_reason: failure_reason.filter(|_| status == PaymentStatus::Failed),
        destination,
        preimage: preimage.filter(|_| status == PaymentStatus::Succeeded),
        invoice,
        timestamp: timestamp.unwrap_or(DateTime::UNIX_EPOCH),
    }
}

/// "Show zero" over "show nothing": keep whatever hash is extractable and
/// zero everything else.
fn fallback_payment(raw: &Value) -> Payment {
    let payment_hash = string_field(raw, &["paymentHash"])
        .or_else(|| {
            raw.get("paymentStatus")
                .map(|ps| string_field(ps, &["paymentHash"]))
                .unwrap_or(None)
        })
        .unwrap_or_default();

    Payment {
        payment_hash,
        value_msat: BigUint::default(),
        fee_msat: BigUint::default(),
        status: PaymentStatus::Pending,
        failure_reason: None,
        destination: None,
        preimage: None,
        invoice: None,
        timestamp: DateTime::UNIX_EPOCH,
    }
}

/// Destination of a nested-shape payment: the first ledger entry that is
/// neither wallet-owned nor a change output. First match in entry order
/// wins; multiple externally-addressed entries are not disambiguated.
fn transfer_destination(transfer: &Value) -> Option<String> {
    let entries = transfer.get("entries").and_then(Value::as_array)?;
    entries
        .iter()
        .find(|entry| {
            let wallet_owned = entry
                .get("wallet")
                .map(|w| !w.is_null())
                .unwrap_or(false);
            let is_change = entry
                .get("isChange")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            !wallet_owned && !is_change
        })
        .and_then(|entry| string_field(entry, &["address"]))
}

// ==================== INVOICES ====================

pub fn normalize_invoice(raw: &Value) -> Invoice {
    Invoice {
        payment_hash: string_field(raw, &["paymentHash"]).unwrap_or_default(),
        wallet_id: string_field(raw, &["walletId"]).unwrap_or_default(),
        status: raw
            .get("status")
            .and_then(Value::as_str)
            .map(InvoiceStatus::from_upstream)
            .unwrap_or(InvoiceStatus::Open),
        invoice: string_field(raw, &["invoice"]).unwrap_or_default(),
        value_msat: msat_field(raw, &["valueMsat", "amountMsat"]).unwrap_or_default(),
        memo: string_field(raw, &["memo"]),
        created_at: timestamp_field(raw, &["createdAt"]),
        updated_at: timestamp_field(raw, &["updatedAt"]),
        expires_at: timestamp_field(raw, &["expiresAt"]),
    }
}

pub fn normalize_invoices(records: &[Value]) -> Vec<Invoice> {
    records.iter().map(normalize_invoice).collect()
}

// ==================== WALLETS ====================

pub fn normalize_wallet(raw: &Value) -> Wallet {
    Wallet {
        id: string_field(raw, &["id"]).unwrap_or_default(),
        label: string_field(raw, &["label"]),
        inbound_balance: balance_string(raw, "inboundBalance"),
        inbound_pending_balance: balance_string(raw, "inboundPendingBalance"),
        inbound_unsettled_balance: balance_string(raw, "inboundUnsettledBalance"),
        outbound_balance: balance_string(raw, "outboundBalance"),
        outbound_pending_balance: balance_string(raw, "outboundPendingBalance"),
        outbound_unsettled_balance: balance_string(raw, "outboundUnsettledBalance"),
        balance_string: balance_string(raw, "balanceString"),
        confirmed_balance_string: balance_string(raw, "confirmedBalanceString"),
        spendable_balance_string: balance_string(raw, "spendableBalanceString"),
    }
}

// ==================== FIELD HELPERS ====================

fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        raw.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Integer amount sent either as a JSON number or as a decimal string.
/// A leading sign is dropped: ledger entries report outbound transfers as
/// negative, but canonical amounts are magnitudes.
fn parse_amount(value: &Value) -> Option<BigUint> {
    match value {
        Value::Number(n) => n.as_u64().map(BigUint::from).or_else(|| {
            n.as_i64()
                .map(|signed| BigUint::from(signed.unsigned_abs()))
        }),
        Value::String(s) => s.trim().trim_start_matches('-').parse::<BigUint>().ok(),
        _ => None,
    }
}

fn msat_field(raw: &Value, keys: &[&str]) -> Option<BigUint> {
    keys.iter().find_map(|key| raw.get(*key).and_then(parse_amount))
}

/// Base-unit amount converted to millisatoshis. Arbitrary-precision all the
/// way: no floating point at satoshi boundaries.
fn base_units_as_msat(raw: &Value, keys: &[&str]) -> Option<BigUint> {
    msat_field(raw, keys).map(|units| units * BigUint::from(1000_u32))
}

fn timestamp_field(raw: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| match raw.get(*key) {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// Balance fields relay as integer strings; anything unusable becomes "0".
fn balance_string(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(parse_amount)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat_payment(status: &str) -> Value {
        json!({
            "paymentHash": "f1e2d3c4",
            "status": status,
            "amountMsat": "250000",
            "feeLimitMsat": 1000,
            "destination": "03abcdef",
            "preimage": "aa55aa55",
            "createdAt": "2024-06-01T12:00:00Z"
        })
    }

    fn nested_payment(status: &str) -> Value {
        json!({
            "paymentHash": "9a8b7c6d",
            "invoice": "lntbs500n1pnxyz",
            "createdAt": "2024-06-02T08:30:00Z",
            "paymentStatus": {
                "status": status,
                "preimage": "beefcafe",
                "failureReason": "no route",
                "feeMsat": "2000"
            },
            "transfer": {
                "valueString": "-500",
                "entries": [
                    { "address": "tb1qchange", "wallet": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4", "isChange": false },
                    { "address": "tb1qalsochange", "isChange": true },
                    { "address": "tb1qexternal", "isChange": false },
                    { "address": "tb1qsecond", "isChange": false }
                ]
            }
        })
    }

    #[test]
    fn flat_status_mapping() {
        assert_eq!(
            normalize_payment(&flat_payment("settled")).status,
            PaymentStatus::Succeeded
        );
        assert_eq!(
            normalize_payment(&flat_payment("failed")).status,
            PaymentStatus::Failed
        );
        assert_eq!(
            normalize_payment(&flat_payment("in_flight")).status,
            PaymentStatus::Pending
        );
        assert_eq!(
            normalize_payment(&flat_payment("anything_else")).status,
            PaymentStatus::Pending
        );
    }

    #[test]
    fn nested_status_mapping() {
        assert_eq!(
            normalize_payment(&nested_payment("settled")).status,
            PaymentStatus::Succeeded
        );
        assert_eq!(
            normalize_payment(&nested_payment("failed")).status,
            PaymentStatus::Failed
        );
        assert_eq!(
            normalize_payment(&nested_payment("in_flight")).status,
            PaymentStatus::Pending
        );
    }

    #[test]
    fn flat_amounts_prefer_explicit_msat_fields() {
        let payment = normalize_payment(&flat_payment("settled"));
        assert_eq!(payment.value_msat, BigUint::from(250_000_u64));
        assert_eq!(payment.fee_msat, BigUint::from(1000_u64));
        assert_eq!(payment.destination.as_deref(), Some("03abcdef"));
        assert_eq!(payment.preimage.as_deref(), Some("aa55aa55"));
    }

    #[test]
    fn nested_value_derives_from_base_units_times_1000() {
        // No explicit amountMsat: valueString "-500" base units -> 500000 msat
        let payment = normalize_payment(&nested_payment("settled"));
        assert_eq!(payment.value_msat, BigUint::from(500_000_u64));
        assert_eq!(payment.fee_msat, BigUint::from(2000_u64));
        assert!(!payment.preimage.as_deref().unwrap_or("").is_empty());
    }

    #[test]
    fn nested_destination_skips_wallet_owned_and_change_entries() {
        let payment = normalize_payment(&nested_payment("settled"));
        // first non-wallet, non-change entry wins; tb1qsecond is ignored
        assert_eq!(payment.destination.as_deref(), Some("tb1qexternal"));
    }

    #[test]
    fn nested_destination_unset_when_all_entries_internal() {
        let raw = json!({
            "paymentStatus": { "status": "settled" },
            "transfer": {
                "entries": [
                    { "address": "tb1qown", "wallet": "deadbeef" },
                    { "address": "tb1qchange", "isChange": true }
                ]
            }
        });
        assert!(normalize_payment(&raw).destination.is_none());
    }

    #[test]
    fn preimage_only_surfaces_on_settled_payments() {
        assert!(normalize_payment(&nested_payment("settled")).preimage.is_some());
        assert!(normalize_payment(&nested_payment("in_flight")).preimage.is_none());
        assert!(normalize_payment(&nested_payment("failed")).preimage.is_none());
        assert!(normalize_payment(&flat_payment("in_flight")).preimage.is_none());
    }

    #[test]
    fn failure_reason_only_surfaces_on_failed_payments() {
        assert_eq!(
            normalize_payment(&nested_payment("failed"))
                .failure_reason
                .as_deref(),
            Some("no route")
        );
        assert!(normalize_payment(&nested_payment("settled"))
            .failure_reason
            .is_none());
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let raw = json!({ "paymentHash": "abc", "status": "in_flight" });
        let payment = normalize_payment(&raw);
        assert_eq!(payment.value_msat, BigUint::default());
        assert_eq!(payment.fee_msat, BigUint::default());
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn unrecognized_shape_degrades_to_pending_fallback() {
        let raw = json!({ "paymentHash": "keepme", "somethingElse": true });
        let payment = normalize_payment(&raw);
        assert_eq!(payment.payment_hash, "keepme");
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.value_msat, BigUint::default());
    }

    #[test]
    fn batch_normalization_is_one_to_one_and_order_preserving() {
        let batch = vec![
            flat_payment("settled"),
            json!("not even an object"),
            nested_payment("failed"),
            json!({}),
            flat_payment("in_flight"),
        ];
        let payments = normalize_payments(&batch);
        assert_eq!(payments.len(), batch.len());
        assert_eq!(payments[0].status, PaymentStatus::Succeeded);
        assert_eq!(payments[1].status, PaymentStatus::Pending);
        assert_eq!(payments[2].status, PaymentStatus::Failed);
        assert_eq!(payments[3].status, PaymentStatus::Pending);
        assert_eq!(payments[4].status, PaymentStatus::Pending);
    }

    #[test]
    fn list_payload_extraction_tolerates_missing_key() {
        assert!(records(&json!({}), "payments").is_empty());
        assert!(records(&json!({ "payments": "nope" }), "payments").is_empty());
        assert_eq!(
            records(&json!({ "payments": [flat_payment("settled")] }), "payments").len(),
            1
        );
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = nested_payment("settled");
        let first = serde_json::to_value(normalize_payment(&raw)).unwrap();
        let second = serde_json::to_value(normalize_payment(&raw)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invoice_normalization_uppercases_status_and_stringifies_value() {
        let raw = json!({
            "paymentHash": "1234abcd",
            "walletId": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4",
            "status": "open",
            "invoice": "lntbs500n1pn",
            "valueMsat": 50000,
            "memo": "Test invoice",
            "expiresAt": "2024-06-01T13:00:00Z"
        });
        let invoice = normalize_invoice(&raw);
        assert_eq!(invoice.status, InvoiceStatus::Open);
        assert_eq!(invoice.value_msat, BigUint::from(50_000_u64));
        let wire = serde_json::to_value(&invoice).unwrap();
        assert_eq!(wire["status"], json!("OPEN"));
        assert_eq!(wire["valueMsat"], json!("50000"));
    }

    #[test]
    fn malformed_invoice_degrades_to_zeroed_record() {
        let invoice = normalize_invoice(&json!({ "valueMsat": "garbage" }));
        assert_eq!(invoice.value_msat, BigUint::default());
        assert_eq!(invoice.status, InvoiceStatus::Open);
        assert!(invoice.payment_hash.is_empty());
    }

    #[test]
    fn wallet_balances_default_to_zero_strings() {
        let wallet = normalize_wallet(&json!({
            "id": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4",
            "label": "demo",
            "inboundBalance": "150000",
            "balanceString": 42
        }));
        assert_eq!(wallet.inbound_balance, "150000");
        assert_eq!(wallet.balance_string, "42");
        assert_eq!(wallet.outbound_balance, "0");
        assert_eq!(wallet.spendable_balance_string, "0");
    }
}
