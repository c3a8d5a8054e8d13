//! API DTOs

use crate::domain::shared::value_objects::CallControlId;
use serde::{Deserialize, Serialize};

/// Standard API response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Calls a participant command was applied to
#[derive(Debug, Serialize, Deserialize)]
pub struct TargetsResponse {
    pub call_control_ids: Vec<CallControlId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub conference_running: bool,
    pub tracked_calls: usize,
}
