//! # Adyen Notification Verification
//!
//! Standard notifications carry an HMAC-SHA256 signature in
//! `additionalData.hmacSignature`. The signed payload is the colon-joined
//! list of:
//!
//! ```text
//! pspReference:originalReference:merchantAccountCode:merchantReference:value:currency:eventCode:success
//! ```
//!
//! Missing fields are signed as empty strings. The key is configured in the
//! Customer Area as a hex string.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use pay_core::{NotificationRequest, NotificationRequestItem, PaymentError, PaymentResult};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Verifies notification signatures with the merchant's HMAC key
#[derive(Clone)]
pub struct HmacValidator {
    key: Vec<u8>,
}

impl HmacValidator {
    /// Create a validator from the hex-encoded key
    pub fn new(hex_key: &str) -> PaymentResult<Self> {
        let key = hex::decode(hex_key.trim()).map_err(|e| {
            PaymentError::Configuration(format!("HMAC key is not valid hex: {}", e))
        })?;
        Ok(Self { key })
    }

    /// Build the string that Adyen signs for a notification item
    pub fn signing_string(item: &NotificationRequestItem) -> String {
        let (value, currency) = match &item.amount {
            Some(amount) => (amount.value.to_string(), amount.currency.clone()),
            None => (String::new(), String::new()),
        };

        [
            item.psp_reference.as_str(),
            item.original_reference.as_deref().unwrap_or(""),
            item.merchant_account_code.as_str(),
            item.merchant_reference.as_str(),
            value.as_str(),
            currency.as_str(),
            item.event_code.as_str(),
            item.success.as_str(),
        ]
        .join(":")
    }

    /// Compute the base64 signature for a notification item
    pub fn calculate(&self, item: &NotificationRequestItem) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(Self::signing_string(item).as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Check a single item's signature
    pub fn is_valid(&self, item: &NotificationRequestItem) -> bool {
        match item.hmac_signature() {
            Some(signature) => constant_time_compare(signature, &self.calculate(item)),
            None => false,
        }
    }

    /// Verify every item of a notification.
    ///
    /// Fails with `WebhookParseError` when there are no items and with
    /// `WebhookVerificationFailed` when any signature does not match.
    pub fn verify<'a>(
        &self,
        request: &'a NotificationRequest,
    ) -> PaymentResult<Vec<&'a NotificationRequestItem>> {
        let items: Vec<_> = request.items().collect();
        if items.is_empty() {
            return Err(PaymentError::WebhookParseError(
                "Notification contains no items".to_string(),
            ));
        }

        for item in &items {
            if !self.is_valid(item) {
                warn!(
                    "Invalid HMAC signature: pspReference={}, merchantReference={}",
                    item.psp_reference, item.merchant_reference
                );
                return Err(PaymentError::WebhookVerificationFailed(
                    "Invalid HMAC signature".to_string(),
                ));
            }
        }

        debug!("Verified {} notification item(s)", items.len());
        Ok(items)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::Amount;
    use serde_json::json;

    const KEY: &str = "44782DEF547AAA06C910C43932B1EB0C71FC68D9D0C057550C48EC2ACF6BA056";
    const EXPECTED: &str = "coqCmt/IZ4E3CzPvMY8zTjQVL5hYJUiBRg8UU+iCWo0=";

    fn item() -> NotificationRequestItem {
        NotificationRequestItem {
            amount: Some(Amount::new("EUR", 1130)),
            event_code: "AUTHORISATION".into(),
            merchant_account_code: "TestMerchant".into(),
            merchant_reference: "TestPayment-1407325143704".into(),
            psp_reference: "7914073381342284".into(),
            success: "true".into(),
            ..Default::default()
        }
    }

    fn signed_item() -> NotificationRequestItem {
        let mut item = item();
        item.additional_data
            .insert("hmacSignature".into(), json!(EXPECTED));
        item
    }

    #[test]
    fn test_signing_string() {
        assert_eq!(
            HmacValidator::signing_string(&item()),
            "7914073381342284::TestMerchant:TestPayment-1407325143704:1130:EUR:AUTHORISATION:true"
        );
    }

    #[test]
    fn test_calculate_known_signature() {
        let validator = HmacValidator::new(KEY).unwrap();
        assert_eq!(validator.calculate(&item()), EXPECTED);
    }

    #[test]
    fn test_is_valid() {
        let validator = HmacValidator::new(KEY).unwrap();
        assert!(validator.is_valid(&signed_item()));

        let mut tampered = signed_item();
        tampered.amount = Some(Amount::new("EUR", 1));
        assert!(!validator.is_valid(&tampered));

        assert!(!validator.is_valid(&item()));
    }

    #[test]
    fn test_invalid_hex_key() {
        assert!(HmacValidator::new("not-hex").is_err());
    }

    #[test]
    fn test_verify_request() {
        let validator = HmacValidator::new(KEY).unwrap();

        let request: NotificationRequest = serde_json::from_value(json!({
            "live": "false",
            "notificationItems": [{ "NotificationRequestItem": signed_item() }]
        }))
        .unwrap();
        let items = validator.verify(&request).unwrap();
        assert_eq!(items.len(), 1);

        let empty: NotificationRequest =
            serde_json::from_value(json!({ "notificationItems": [] })).unwrap();
        assert_eq!(validator.verify(&empty).unwrap_err().status_code(), 400);

        let unsigned: NotificationRequest = serde_json::from_value(json!({
            "notificationItems": [{ "NotificationRequestItem": item() }]
        }))
        .unwrap();
        assert_eq!(validator.verify(&unsigned).unwrap_err().status_code(), 401);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
