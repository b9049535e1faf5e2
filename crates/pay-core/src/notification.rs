//! # Notification Types
//!
//! Asynchronous payment notifications delivered by the processor.
//!
//! ```text
//! {
//!   "live": "false",
//!   "notificationItems": [
//!     { "NotificationRequestItem": { "eventCode": "AUTHORISATION", ... } }
//!   ]
//! }
//! ```

use crate::transaction::{Amount, TransactionStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Notification envelope as posted to the webhook endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// "true" for live notifications, "false" for test
    #[serde(default)]
    pub live: Option<String>,

    #[serde(default)]
    pub notification_items: Vec<NotificationItemWrapper>,
}

impl NotificationRequest {
    /// Iterate over the contained notification items
    pub fn items(&self) -> impl Iterator<Item = &NotificationRequestItem> {
        self.notification_items
            .iter()
            .map(|wrapper| &wrapper.notification_request_item)
    }

    pub fn is_live(&self) -> bool {
        self.live.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationItemWrapper {
    #[serde(rename = "NotificationRequestItem")]
    pub notification_request_item: NotificationRequestItem,
}

/// A single notification item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequestItem {
    #[serde(default)]
    pub additional_data: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub amount: Option<Amount>,

    #[serde(default)]
    pub event_code: String,

    #[serde(default)]
    pub event_date: Option<String>,

    #[serde(default)]
    pub merchant_account_code: String,

    #[serde(default)]
    pub merchant_reference: String,

    #[serde(default)]
    pub original_reference: Option<String>,

    #[serde(default)]
    pub psp_reference: String,

    #[serde(default)]
    pub reason: Option<String>,

    /// "true" or "false"
    #[serde(default)]
    pub success: String,
}

impl NotificationRequestItem {
    pub fn is_success(&self) -> bool {
        self.success == "true"
    }

    /// Signature attached by the processor, if present
    pub fn hmac_signature(&self) -> Option<&str> {
        self.additional_data
            .get("hmacSignature")
            .and_then(|v| v.as_str())
    }

    /// The status this notification moves the transaction to.
    ///
    /// `None` for events that do not change the transaction.
    pub fn resulting_status(&self) -> Option<TransactionStatus> {
        match (self.event_code.as_str(), self.is_success()) {
            ("AUTHORISATION", true) => Some(TransactionStatus::Authorized),
            ("AUTHORISATION", false) => Some(TransactionStatus::Refused),
            ("CANCELLATION", true) | ("CANCEL_OR_REFUND", true) => {
                Some(TransactionStatus::Cancelled)
            }
            ("REFUND", true) => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "live": "false",
            "notificationItems": [{
                "NotificationRequestItem": {
                    "additionalData": { "hmacSignature": "abc=" },
                    "amount": { "currency": "EUR", "value": 1000 },
                    "eventCode": "AUTHORISATION",
                    "eventDate": "2024-01-01T12:00:00+01:00",
                    "merchantAccountCode": "TestMerchant",
                    "merchantReference": "order-1",
                    "pspReference": "PSP123",
                    "reason": "",
                    "success": "true"
                }
            }]
        })
    }

    #[test]
    fn test_parse_notification() {
        let request: NotificationRequest = serde_json::from_value(sample()).unwrap();
        assert!(!request.is_live());

        let item = request.items().next().unwrap();
        assert_eq!(item.merchant_reference, "order-1");
        assert_eq!(item.psp_reference, "PSP123");
        assert_eq!(item.hmac_signature(), Some("abc="));
        assert_eq!(item.amount.as_ref().unwrap().value, 1000);
        assert!(item.original_reference.is_none());
        assert!(item.is_success());
    }

    #[test]
    fn test_resulting_status() {
        let mut item = NotificationRequestItem {
            event_code: "AUTHORISATION".into(),
            success: "true".into(),
            ..Default::default()
        };
        assert_eq!(item.resulting_status(), Some(TransactionStatus::Authorized));

        item.success = "false".into();
        assert_eq!(item.resulting_status(), Some(TransactionStatus::Refused));

        item.event_code = "REFUND".into();
        assert_eq!(item.resulting_status(), None);

        item.success = "true".into();
        assert_eq!(item.resulting_status(), Some(TransactionStatus::Refunded));

        item.event_code = "REPORT_AVAILABLE".into();
        assert_eq!(item.resulting_status(), None);
    }

    #[test]
    fn test_missing_items_parse_as_empty() {
        let request: NotificationRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.items().count(), 0);
    }
}
