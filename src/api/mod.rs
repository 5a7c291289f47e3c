//! API layer - HTTP endpoints

pub mod health;
pub mod router;
pub mod routes;
pub mod state;
pub mod types;

pub use router::{create_router, create_router_with_state};
pub use state::AppState;
