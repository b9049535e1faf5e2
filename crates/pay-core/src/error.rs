//! # Payment Error Types
//!
//! Typed error handling for the checkout backend.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error reported by the payment processor, carrying its HTTP status
    #[error("Processor error [{status}]: {message}")]
    Processor {
        status: u16,
        error_code: Option<String>,
        message: String,
    },

    /// Network/HTTP error communicating with the processor
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Notification HMAC verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Notification payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Card data could not be encrypted
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error.
    ///
    /// Processor errors keep the status the processor reported.
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::Processor { status, .. } => match *status {
                400..=599 => *status,
                _ => 502,
            },
            PaymentError::NetworkError(_) => 503,
            PaymentError::WebhookVerificationFailed(_) => 401,
            PaymentError::WebhookParseError(_) => 400,
            PaymentError::Encryption(_) => 500,
            PaymentError::Internal(_) => 500,
            PaymentError::Serialization(_) => 500,
        }
    }

    /// Processor error code (e.g. Adyen's `errorCode`), if any
    pub fn error_code(&self) -> Option<&str> {
        match self {
            PaymentError::Processor { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(
            PaymentError::WebhookVerificationFailed("bad".into()).status_code(),
            401
        );
        assert_eq!(
            PaymentError::Processor {
                status: 422,
                error_code: Some("14_030".into()),
                message: "Return URL is missing".into()
            }
            .status_code(),
            422
        );
    }

    #[test]
    fn test_processor_status_out_of_range_maps_to_bad_gateway() {
        let err = PaymentError::Processor {
            status: 302,
            error_code: None,
            message: "redirected".into(),
        };
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.error_code(), None);
    }
}
