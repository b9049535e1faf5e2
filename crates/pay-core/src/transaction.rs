//! # Transaction Types
//!
//! Amounts and the transaction record kept for each checkout session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monetary amount in minor units (cents for EUR)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// ISO 4217 currency code (e.g. "EUR")
    pub currency: String,
    /// Amount in the smallest currency unit
    pub value: i64,
}

impl Amount {
    pub fn new(currency: impl Into<String>, value: i64) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }

    /// Format for display (e.g. "10.00 EUR")
    pub fn display(&self) -> String {
        let sign = if self.value < 0 { "-" } else { "" };
        let abs = self.value.unsigned_abs();
        format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, self.currency)
    }
}

/// Status of a transaction as seen by this backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Session created, awaiting the processor's verdict
    Pending,
    /// Authorisation succeeded
    Authorized,
    /// Authorisation failed
    Refused,
    /// Payment cancelled before capture
    Cancelled,
    /// Payment refunded
    Refunded,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Pending
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Authorized => "Authorized",
            TransactionStatus::Refused => "Refused",
            TransactionStatus::Cancelled => "Cancelled",
            TransactionStatus::Refunded => "Refunded",
        };
        f.write_str(s)
    }
}

/// A transaction tracked between session creation and webhook confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Amount requested for the session
    pub amount: Amount,

    /// Merchant order reference
    pub payment_reference: String,

    /// Current status
    #[serde(default)]
    pub status: TransactionStatus,

    /// Processor reference, known once a notification arrives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psp_reference: Option<String>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a pending transaction
    pub fn pending(payment_reference: impl Into<String>, amount: Amount) -> Self {
        Self {
            amount,
            payment_reference: payment_reference.into(),
            status: TransactionStatus::Pending,
            psp_reference: None,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::new("EUR", 1000).display(), "10.00 EUR");
        assert_eq!(Amount::new("EUR", 1999).display(), "19.99 EUR");
        assert_eq!(Amount::new("EUR", -5).display(), "-0.05 EUR");
        assert_eq!(Amount::new("EUR", -1250).display(), "-12.50 EUR");
    }

    #[test]
    fn test_pending_transaction_serializes_camel_case() {
        let tx = Transaction::pending("order-1", Amount::new("EUR", 1000));
        assert_eq!(tx.status, TransactionStatus::Pending);

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["paymentReference"], "order-1");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["amount"]["currency"], "EUR");
        assert_eq!(json["amount"]["value"], 1000);
        assert!(json.get("pspReference").is_none());
    }
}
