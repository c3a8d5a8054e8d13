//! API interface implementations

pub mod command_handler;
pub mod dto;
pub mod metrics_handler;
pub mod router;
pub mod state;
pub mod webhook_handler;

pub use dto::ApiResponse;
pub use metrics_handler::init_metrics;
pub use router::{build_router, metrics_router};
pub use state::AppState;
