//! Telnyx call-control adapter
//!
//! - `client`: REST implementation of the call-control port
//! - `signature`: Ed25519 webhook verification
//! - `dto`: webhook and REST wire formats

pub mod client;
pub mod dto;
pub mod signature;

pub use client::TelnyxClient;
pub use dto::decode_webhook;
pub use signature::{SignatureError, WebhookVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
