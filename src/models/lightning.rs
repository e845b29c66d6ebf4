use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_INVOICE_EXPIRY_SECS;

/// Serde adapter for millisatoshi amounts: arbitrary-precision integers on
/// the inside, decimal strings on the wire. Accepts plain JSON numbers on
/// input since the upstream is inconsistent about which it sends.
pub mod msat_string {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => s
                .trim()
                .parse::<BigUint>()
                .map_err(|_| de::Error::custom("amount must be a non-negative integer string")),
            Value::Number(n) => n
                .as_u64()
                .map(BigUint::from)
                .ok_or_else(|| de::Error::custom("amount must be a non-negative integer")),
            other => Err(de::Error::custom(format!(
                "invalid amount representation: {other}"
            ))),
        }
    }
}

// ==================== STATUS ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Open,
    Settled,
    Canceled,
}

impl InvoiceStatus {
    /// Upstream sends lower-case status strings; casing is not trusted.
    pub fn from_upstream(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "settled" => InvoiceStatus::Settled,
            "canceled" | "cancelled" => InvoiceStatus::Canceled,
            _ => InvoiceStatus::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    /// `settled` and `failed` are terminal; `in_flight` and anything the
    /// upstream invents later count as pending.
    pub fn from_upstream(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "settled" => PaymentStatus::Succeeded,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::Failed)
    }
}

// ==================== CANONICAL RECORDS ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub payment_hash: String,
    pub wallet_id: String,
    pub status: InvoiceStatus,
    pub invoice: String,
    #[serde(with = "msat_string")]
    pub value_msat: BigUint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_hash: String,
    #[serde(with = "msat_string")]
    pub value_msat: BigUint,
    #[serde(with = "msat_string")]
    pub fee_msat: BigUint,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preimage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Live balance snapshot; disposable, re-fetched on demand. Balance fields
/// stay integer strings end to end so no precision is lost at the
/// serialization boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    // Lightning channel balances, msat
    pub inbound_balance: String,
    pub inbound_pending_balance: String,
    pub inbound_unsettled_balance: String,
    pub outbound_balance: String,
    pub outbound_pending_balance: String,
    pub outbound_unsettled_balance: String,
    // On-chain balances, base units
    pub balance_string: String,
    pub confirmed_balance_string: String,
    pub spendable_balance_string: String,
}

// ==================== REQUEST BODIES ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWalletRequest {
    pub label: String,
    pub passphrase: String,
    pub enterprise: String,
    pub passcode_encryption_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    #[serde(with = "msat_string")]
    pub value_msat: BigUint,
    pub memo: Option<String>,
    pub expiry: Option<u64>,
}

impl CreateInvoiceRequest {
    pub fn expiry_secs(&self) -> u64 {
        self.expiry.unwrap_or(DEFAULT_INVOICE_EXPIRY_SECS)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayInvoiceRequest {
    pub invoice: String,
    pub passphrase: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_status_upstream_vocabulary() {
        assert_eq!(PaymentStatus::from_upstream("settled"), PaymentStatus::Succeeded);
        assert_eq!(PaymentStatus::from_upstream("failed"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::from_upstream("in_flight"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_upstream("something_new"), PaymentStatus::Pending);
        // casing from upstream is not trusted
        assert_eq!(PaymentStatus::from_upstream("SETTLED"), PaymentStatus::Succeeded);
    }

    #[test]
    fn invoice_status_normalizes_casing() {
        assert_eq!(InvoiceStatus::from_upstream("open"), InvoiceStatus::Open);
        assert_eq!(InvoiceStatus::from_upstream("Settled"), InvoiceStatus::Settled);
        assert_eq!(InvoiceStatus::from_upstream("CANCELED"), InvoiceStatus::Canceled);
        assert_eq!(InvoiceStatus::from_upstream("cancelled"), InvoiceStatus::Canceled);
    }

    #[test]
    fn statuses_serialize_upper_case() {
        assert_eq!(serde_json::to_value(InvoiceStatus::Open).unwrap(), json!("OPEN"));
        assert_eq!(
            serde_json::to_value(PaymentStatus::Succeeded).unwrap(),
            json!("SUCCEEDED")
        );
    }

    #[test]
    fn msat_amounts_serialize_as_decimal_strings() {
        let invoice = Invoice {
            payment_hash: "abc".to_string(),
            wallet_id: "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4".to_string(),
            status: InvoiceStatus::Open,
            invoice: "lntbs1...".to_string(),
            value_msat: BigUint::from(50_000_u64),
            memo: Some("Test invoice".to_string()),
            created_at: None,
            updated_at: None,
            expires_at: None,
        };
        let value = serde_json::to_value(&invoice).unwrap();
        assert_eq!(value["valueMsat"], json!("50000"));
        assert_eq!(value["status"], json!("OPEN"));
    }

    #[test]
    fn create_invoice_request_accepts_number_or_string_amount() {
        let from_number: CreateInvoiceRequest =
            serde_json::from_value(json!({"valueMsat": 50000})).unwrap();
        let from_string: CreateInvoiceRequest =
            serde_json::from_value(json!({"valueMsat": "50000"})).unwrap();
        assert_eq!(from_number.value_msat, from_string.value_msat);
        assert_eq!(from_number.expiry_secs(), DEFAULT_INVOICE_EXPIRY_SECS);
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(serde_json::from_value::<CreateInvoiceRequest>(json!({"valueMsat": -5})).is_err());
    }
}
