//! Interface layer - External interfaces
//!
//! This layer handles:
//! - The provider webhook endpoint
//! - Operator command endpoints
//! - Request/response formatting

pub mod api;
