//! # Card Encryption
//!
//! Encrypts raw card fields into a JWE compact token that the Checkout API
//! accepts in place of client-side encrypted data.
//!
//! ```text
//! BASE64URL(header) . BASE64URL(RSA-OAEP-256(cek)) . BASE64URL(iv) . BASE64URL(ciphertext) . BASE64URL(tag)
//! ```
//!
//! Header: `{"alg":"RSA-OAEP-256","enc":"A256GCM","version":"1"}`. The content
//! key is a fresh 256-bit key per token and the header is the AAD.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{SecondsFormat, Utc};
use pay_core::{PaymentError, PaymentResult};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::Sha256;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

const GCM_TAG_LEN: usize = 16;

/// Raw card fields as submitted by the storefront
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    #[serde(deserialize_with = "string_or_number")]
    pub cvc: String,
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    /// Two digit month
    #[serde(deserialize_with = "string_or_number")]
    pub expiry_month: String,
    /// Four digit year
    #[serde(deserialize_with = "string_or_number")]
    pub expiry_year: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardPayload<'a> {
    cvc: &'a str,
    number: &'a str,
    expiry_month: &'a str,
    expiry_year: &'a str,
    generationtime: String,
}

#[derive(Serialize)]
struct ProtectedHeader {
    alg: &'static str,
    enc: &'static str,
    version: &'static str,
}

/// Encrypts card details with the processor's public key
#[derive(Clone)]
pub struct CardEncrypter {
    public_key: RsaPublicKey,
}

impl CardEncrypter {
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }

    /// Load the key from a PEM X.509 certificate or a PEM `PUBLIC KEY`
    pub fn from_pem(pem: &str) -> PaymentResult<Self> {
        let pem = pem.trim();

        let public_key = if pem.starts_with("-----BEGIN CERTIFICATE-----") {
            let cert = Certificate::from_pem(pem.as_bytes()).map_err(|e| {
                PaymentError::Configuration(format!("Invalid X.509 certificate: {}", e))
            })?;
            let spki = cert
                .tbs_certificate
                .subject_public_key_info
                .to_der()
                .map_err(|e| {
                    PaymentError::Configuration(format!("Invalid certificate key: {}", e))
                })?;
            RsaPublicKey::from_public_key_der(&spki)
        } else {
            RsaPublicKey::from_public_key_pem(pem)
        }
        .map_err(|e| PaymentError::Configuration(format!("Certificate key is not RSA: {}", e)))?;

        Ok(Self::new(public_key))
    }

    /// Encrypt card details into a JWE compact token.
    ///
    /// `generationtime` is set to the current UTC time.
    pub fn encrypt_card(&self, card: &CardDetails) -> PaymentResult<String> {
        let payload = CardPayload {
            cvc: &card.cvc,
            number: &card.number,
            expiry_month: &card.expiry_month,
            expiry_year: &card.expiry_year,
            generationtime: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let plaintext = serde_json::to_vec(&payload)?;
        self.encrypt(&plaintext)
    }

    /// Encrypt arbitrary bytes into a JWE compact token
    pub fn encrypt(&self, plaintext: &[u8]) -> PaymentResult<String> {
        let header = serde_json::to_vec(&ProtectedHeader {
            alg: "RSA-OAEP-256",
            enc: "A256GCM",
            version: "1",
        })?;
        let encoded_header = URL_SAFE_NO_PAD.encode(header);

        let mut cek = [0u8; 32];
        let mut iv = [0u8; 12];
        OsRng.fill_bytes(&mut cek);
        OsRng.fill_bytes(&mut iv);

        let encrypted_key = self
            .public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &cek)
            .map_err(|e| PaymentError::Encryption(format!("Key wrapping failed: {}", e)))?;

        let cipher = Aes256Gcm::new_from_slice(&cek)
            .map_err(|e| PaymentError::Encryption(e.to_string()))?;
        let mut sealed = cipher
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: plaintext,
                    aad: encoded_header.as_bytes(),
                },
            )
            .map_err(|_| PaymentError::Encryption("Content encryption failed".to_string()))?;

        let tag = sealed.split_off(sealed.len() - GCM_TAG_LEN);

        Ok([
            encoded_header,
            URL_SAFE_NO_PAD.encode(encrypted_key),
            URL_SAFE_NO_PAD.encode(iv),
            URL_SAFE_NO_PAD.encode(sealed),
            URL_SAFE_NO_PAD.encode(tag),
        ]
        .join("."))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::RsaPrivateKey;
    use serde_json::json;

    const TEST_CERT: &str = include_str!("../tests/fixtures/test_cert.pem");

    fn keypair() -> (RsaPrivateKey, RsaPublicKey) {
        let private = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public = RsaPublicKey::from(&private);
        (private, public)
    }

    fn decrypt(private: &RsaPrivateKey, token: &str) -> (serde_json::Value, Vec<u8>) {
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 5);

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
        let cek = private
            .decrypt(
                Oaep::new::<Sha256>(),
                &URL_SAFE_NO_PAD.decode(parts[1]).unwrap(),
            )
            .unwrap();
        let iv = URL_SAFE_NO_PAD.decode(parts[2]).unwrap();
        let mut sealed = URL_SAFE_NO_PAD.decode(parts[3]).unwrap();
        sealed.extend(URL_SAFE_NO_PAD.decode(parts[4]).unwrap());

        let plaintext = Aes256Gcm::new_from_slice(&cek)
            .unwrap()
            .decrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: &sealed,
                    aad: parts[0].as_bytes(),
                },
            )
            .unwrap();
        (header, plaintext)
    }

    #[test]
    fn test_encrypt_card_decrypts_with_private_key() {
        let (private, public) = keypair();
        let encrypter = CardEncrypter::new(public);

        let card: CardDetails = serde_json::from_value(json!({
            "cvc": "737",
            "number": "4111111111111111",
            "expiryMonth": "03",
            "expiryYear": 2030
        }))
        .unwrap();
        let token = encrypter.encrypt_card(&card).unwrap();

        let (header, plaintext) = decrypt(&private, &token);
        assert_eq!(
            header,
            json!({ "alg": "RSA-OAEP-256", "enc": "A256GCM", "version": "1" })
        );

        let payload: serde_json::Value = serde_json::from_slice(&plaintext).unwrap();
        assert_eq!(payload["number"], "4111111111111111");
        assert_eq!(payload["cvc"], "737");
        assert_eq!(payload["expiryMonth"], "03");
        assert_eq!(payload["expiryYear"], "2030");

        let generated = payload["generationtime"].as_str().unwrap();
        assert!(generated.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(generated).is_ok());
    }

    #[test]
    fn test_tokens_use_fresh_keys() {
        let (_, public) = keypair();
        let encrypter = CardEncrypter::new(public);

        let a = encrypter.encrypt(b"same").unwrap();
        let b = encrypter.encrypt(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_public_key_pem() {
        let (_, public) = keypair();
        let pem = public.to_public_key_pem(LineEnding::LF).unwrap();
        assert!(CardEncrypter::from_pem(&pem).is_ok());
    }

    #[test]
    fn test_from_certificate_pem() {
        assert!(CardEncrypter::from_pem(TEST_CERT).is_ok());
    }

    #[test]
    fn test_from_garbage_pem() {
        let err = CardEncrypter::from_pem("-----BEGIN CERTIFICATE-----\nnope\n-----END CERTIFICATE-----")
            .err()
            .unwrap();
        assert_eq!(err.status_code(), 500);
    }
}
