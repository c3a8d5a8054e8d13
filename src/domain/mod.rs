//! Domain layer - Core model of the conference service
//!
//! This layer contains:
//! - Entities: tracked calls and the conference
//! - Value Objects: provider-assigned identifiers
//! - Webhook events decoded into a closed set of kinds
//! - The event ledger used to reject redelivered webhooks
//! - The call-control port for commands sent to the provider

pub mod call;
pub mod call_control;
pub mod conference;
pub mod event_ledger;
pub mod shared;
pub mod webhook;

// Re-export commonly used types
pub use shared::{DomainError, Result};
