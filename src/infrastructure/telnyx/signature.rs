//! Webhook signature verification
//!
//! Every webhook carries a detached Ed25519 signature over
//! `"{timestamp}|{raw body}"` plus the timestamp itself. Both are checked
//! before the body is trusted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use ring::signature::{UnparsedPublicKey, ED25519};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "telnyx-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "telnyx-timestamp";

const ED25519_PUBLIC_KEY_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Timestamp {timestamp} outside tolerance (now {now})")]
    TimestampOutOfTolerance { timestamp: i64, now: i64 },

    #[error("Signature verification failed")]
    VerificationFailed,
}

impl SignatureError {
    /// Short label used for metrics
    pub fn label(&self) -> &'static str {
        match self {
            SignatureError::MissingHeader(_) => "missing_header",
            SignatureError::InvalidPublicKey(_) => "invalid_public_key",
            SignatureError::MalformedSignature(_) => "malformed_signature",
            SignatureError::MalformedTimestamp(_) => "malformed_timestamp",
            SignatureError::TimestampOutOfTolerance { .. } => "stale_timestamp",
            SignatureError::VerificationFailed => "bad_signature",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    public_key: Vec<u8>,
    tolerance_secs: u64,
}

impl WebhookVerifier {
    /// Build a verifier from the base64 public key published by the provider
    pub fn from_base64(public_key: &str, tolerance_secs: u64) -> Result<Self, SignatureError> {
        let public_key = STANDARD
            .decode(public_key.trim())
            .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;
        if public_key.len() != ED25519_PUBLIC_KEY_LEN {
            return Err(SignatureError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                ED25519_PUBLIC_KEY_LEN,
                public_key.len()
            )));
        }

        Ok(Self {
            public_key,
            tolerance_secs,
        })
    }

    /// Verify a webhook body against its signature and timestamp headers
    pub fn verify(
        &self,
        body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<(), SignatureError> {
        self.verify_at(body, signature, timestamp, Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
        now: i64,
    ) -> Result<(), SignatureError> {
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;

        let signature = STANDARD
            .decode(signature.trim())
            .map_err(|e| SignatureError::MalformedSignature(e.to_string()))?;

        let timestamp = timestamp.trim();
        let issued_at: i64 = timestamp
            .parse()
            .map_err(|_| SignatureError::MalformedTimestamp(timestamp.to_string()))?;

        // Header is untrusted, so the difference must not overflow
        if now.abs_diff(issued_at) > self.tolerance_secs {
            return Err(SignatureError::TimestampOutOfTolerance {
                timestamp: issued_at,
                now,
            });
        }

        let message = signed_message(timestamp, body);
        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, &signature)
            .map_err(|_| SignatureError::VerificationFailed)
    }
}

/// Bytes covered by the signature
pub fn signed_message(timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(timestamp.len() + 1 + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.push(b'|');
    message.extend_from_slice(body);
    message
}
