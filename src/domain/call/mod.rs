//! Calls tracked by the correlator

pub mod aggregate;
pub mod value_object;

pub use aggregate::Call;
pub use value_object::CallState;
