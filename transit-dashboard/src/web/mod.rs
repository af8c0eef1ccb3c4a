//! Web layer for the transit dashboard.
//!
//! Serves the composed dashboard view as JSON and turns requests into
//! dashboard intents.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
