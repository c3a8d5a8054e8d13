//! Infrastructure layer - Adapters to the call-control provider

pub mod telnyx;
