//! API layer - request pipeline, middleware, self endpoints

pub mod handler;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
