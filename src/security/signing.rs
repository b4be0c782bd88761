//! Tamper-evident cookie values.
//!
//! A signed value is `base64(payload).base64(mac)` where the payload is a JSON
//! envelope holding the issue time and the data. The MAC is HMAC-SHA256 over
//! the signer's purpose followed by the payload, so a session cookie can never
//! be replayed as an authentication ticket even when both share a secret.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::errors::WikiError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    issued: i64,
    data: T,
}

/// Signs and verifies cookie payloads for one purpose.
#[derive(Clone)]
pub struct CookieSigner {
    secret: Arc<Vec<u8>>,
    purpose: &'static str,
    max_age: Option<Duration>,
}

impl CookieSigner {
    /// Create a new signer; `max_age` of `None` never expires values
    pub fn new(secret: &str, purpose: &'static str, max_age: Option<Duration>) -> Self {
        Self {
            secret: Arc::new(secret.as_bytes().to_vec()),
            purpose,
            max_age,
        }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Sign `data` as issued now
    pub fn sign<T: Serialize>(&self, data: &T) -> Result<String, WikiError> {
        self.sign_at(data, now())
    }

    /// Verify a signed value, returning its data if the signature holds and it has not expired
    pub fn verify<T: DeserializeOwned>(&self, value: &str) -> Option<T> {
        self.verify_at(value, now())
    }

    pub(crate) fn sign_at<T: Serialize>(&self, data: &T, issued: i64) -> Result<String, WikiError> {
        let payload = serde_json::to_vec(&Envelope { issued, data })
            .map_err(|e| WikiError::Signing(e.to_string()))?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();
        Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), URL_SAFE_NO_PAD.encode(tag)))
    }

    pub(crate) fn verify_at<T: DeserializeOwned>(&self, value: &str, now: i64) -> Option<T> {
        let (payload_b64, tag_b64) = value.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(&payload);
        if mac.verify_slice(&tag).is_err() {
            debug!("Rejected {} cookie: bad signature", self.purpose);
            return None;
        }

        let envelope: Envelope<T> = serde_json::from_slice(&payload).ok()?;
        if let Some(max_age) = self.max_age {
            let age = now.saturating_sub(envelope.issued);
            if age > max_age.as_secs() as i64 {
                debug!("Rejected {} cookie: expired {}s ago", self.purpose, age - max_age.as_secs() as i64);
                return None;
            }
        }
        Some(envelope.data)
    }

    fn mac(&self) -> Result<HmacSha256, WikiError> {
        let mut mac = <HmacSha256>::new_from_slice(&self.secret)
            .map_err(|e| WikiError::Signing(e.to_string()))?;
        mac.update(self.purpose.as_bytes());
        mac.update(&[0]);
        Ok(mac)
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(max_age: Option<u64>) -> CookieSigner {
        CookieSigner::new("seekrit", "auth", max_age.map(Duration::from_secs))
    }

    #[test]
    fn signed_value_verifies() {
        let s = signer(None);
        let value = s.sign(&"editor".to_string()).unwrap();
        assert_eq!(s.verify::<String>(&value).as_deref(), Some("editor"));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let s = signer(None);
        let value = s.sign(&"viewer".to_string()).unwrap();
        let (_, tag) = value.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"issued":0,"data":"editor"}"#);
        let forged = format!("{}.{}", forged_payload, tag);
        assert!(s.verify::<String>(&forged).is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        let s = signer(None);
        assert!(s.verify::<String>("").is_none());
        assert!(s.verify::<String>("no-dot").is_none());
        assert!(s.verify::<String>("!!!.???").is_none());
    }

    #[test]
    fn other_secret_or_purpose_is_rejected() {
        let value = signer(None).sign(&1u32).unwrap();
        let other_secret = CookieSigner::new("different", "auth", None);
        let other_purpose = CookieSigner::new("seekrit", "session", None);
        assert!(other_secret.verify::<u32>(&value).is_none());
        assert!(other_purpose.verify::<u32>(&value).is_none());
    }

    #[test]
    fn expiry_is_enforced() {
        let s = signer(Some(60));
        let value = s.sign_at(&"editor".to_string(), 1_000).unwrap();
        assert!(s.verify_at::<String>(&value, 1_060).is_some());
        assert!(s.verify_at::<String>(&value, 1_061).is_none());
    }
}
