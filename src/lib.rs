//! confhook - ad-hoc conference bridge driven by call-control webhooks
//!
//! Inbound calls are answered, the first answered caller founds a
//! conference and every later caller joins it. Signaling and mixing stay
//! with the call-control provider; this crate correlates its webhooks with
//! locally tracked state and issues the follow-up commands.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
