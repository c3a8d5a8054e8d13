/// Conference domain model
use crate::domain::shared::value_objects::{CallControlId, ConferenceId};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The single conference this service drives.
///
/// Created by the provider on the first answered call and kept for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    pub id: ConferenceId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    members: Vec<CallControlId>,
}

impl Conference {
    /// Create a conference with its founding member
    pub fn new(id: ConferenceId, name: String, founder: CallControlId) -> Self {
        Self {
            id,
            name,
            created_at: Utc::now(),
            members: vec![founder],
        }
    }

    /// Add a member; adding the same call twice is a no-op
    pub fn add_member(&mut self, call_control_id: CallControlId) {
        if !self.has_member(&call_control_id) {
            self.members.push(call_control_id);
        }
    }

    /// Remove a member, returns whether it was present
    pub fn remove_member(&mut self, call_control_id: &CallControlId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != call_control_id);
        self.members.len() != before
    }

    pub fn members(&self) -> &[CallControlId] {
        &self.members
    }

    pub fn has_member(&self, call_control_id: &CallControlId) -> bool {
        self.members.contains(call_control_id)
    }
}

/// Generate a conference name like `demo-conference4821`
pub fn generate_name<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    format!("{}{}", prefix, rng.gen_range(1_000..=9_999))
}
