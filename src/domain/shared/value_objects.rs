//! Identifier value objects
//!
//! All identifiers here are assigned by the call-control provider and are
//! opaque to us, so they wrap the provider's string form unchanged.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! provider_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a provider-assigned identifier, rejecting blank values
            pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::ValidationError(format!(
                        "{} cannot be empty",
                        $label
                    )));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

provider_id!(
    /// Control channel of a single call leg
    CallControlId,
    "call_control_id"
);

provider_id!(
    /// One endpoint's participation in a call
    CallLegId,
    "call_leg_id"
);

provider_id!(
    /// Provider-managed conference
    ConferenceId,
    "conference id"
);

provider_id!(
    /// Unique id of a webhook delivery
    EventId,
    "event id"
);
