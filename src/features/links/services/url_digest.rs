use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::core::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// One-way reference to a signed URL, safe to list and log
///
/// Plain SHA-256 by default. With a key configured the digest is
/// HMAC-SHA256, so a leaked listing cannot be matched against guessed URLs.
#[derive(Clone)]
pub enum UrlDigester {
    Sha256,
    HmacSha256 { mac: HmacSha256 },
}

impl UrlDigester {
    pub fn from_key(key: Option<&str>) -> Result<Self, AppError> {
        match key {
            Some(key) => {
                let mac = HmacSha256::new_from_slice(key.as_bytes())
                    .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
                Ok(UrlDigester::HmacSha256 { mac })
            }
            None => Ok(UrlDigester::Sha256),
        }
    }

    /// Hex-encoded digest of `signed_url`
    pub fn digest(&self, signed_url: &str) -> String {
        match self {
            UrlDigester::Sha256 => hex::encode(Sha256::digest(signed_url.as_bytes())),
            UrlDigester::HmacSha256 { mac } => {
                let mut mac = mac.clone();
                mac.update(signed_url.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            UrlDigester::Sha256 => "sha256",
            UrlDigester::HmacSha256 { .. } => "hmac-sha256",
        }
    }
}
