//! HTTP server assembly: shared state, router, and health endpoints.

mod health;
mod routes;
mod state;

pub use routes::build_router;
pub use state::AppState;
