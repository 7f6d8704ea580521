//! Verification of svix-signed deliveries.
//!
//! The sender signs `{svix-id}.{svix-timestamp}.{raw body}` with HMAC-SHA256
//! keyed by the base64 part of a `whsec_` secret. `svix-signature` carries one
//! or more space-separated `v1,<base64>` entries so secrets can be rotated.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SECRET_PREFIX: &str = "whsec_";

/// How far a delivery's timestamp may drift from our clock, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing secret is missing or malformed")]
    InvalidSecret,

    #[error("timestamp header is not a unix timestamp")]
    InvalidTimestamp,

    #[error("timestamp is outside the accepted window")]
    TimestampOutOfTolerance,

    #[error("no signature matched")]
    NoMatchingSignature,
}

/// Raw key bytes of a `whsec_` secret.
pub fn decode_secret(secret: &str) -> Option<Vec<u8>> {
    let encoded = secret.strip_prefix(SECRET_PREFIX)?;
    BASE64_STANDARD.decode(encoded).ok().filter(|key| !key.is_empty())
}

fn mac_for(msg_id: &str, timestamp: &str, payload: &[u8], key: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(msg_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produce a `v1,<base64>` signature entry.
pub fn sign_payload(msg_id: &str, timestamp: &str, payload: &[u8], secret: &str) -> Result<String, SignatureError> {
    let key = decode_secret(secret).ok_or(SignatureError::InvalidSecret)?;
    let signature = mac_for(msg_id, timestamp, payload, &key)?.finalize().into_bytes();
    Ok(format!("v1,{}", BASE64_STANDARD.encode(signature)))
}

/// Check a delivery against the secret at time `now` (unix seconds).
pub fn verify_signature(
    msg_id: &str,
    timestamp: &str,
    signature_header: &str,
    payload: &[u8],
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let key = decode_secret(secret).ok_or(SignatureError::InvalidSecret)?;

    let sent_at: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;
    let skew = now
        .checked_sub(sent_at)
        .map(i64::unsigned_abs)
        .ok_or(SignatureError::TimestampOutOfTolerance)?;
    if skew > TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let expected = mac_for(msg_id, timestamp.trim(), payload, &key)?;
    let matched = signature_header
        .split_whitespace()
        .filter_map(|entry| entry.strip_prefix("v1,"))
        .filter_map(|encoded| BASE64_STANDARD.decode(encoded).ok())
        // verify_slice compares in constant time
        .any(|candidate| expected.clone().verify_slice(&candidate).is_ok());

    if matched {
        Ok(())
    } else {
        Err(SignatureError::NoMatchingSignature)
    }
}
