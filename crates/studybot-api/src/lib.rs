//! StudyBot API crate - axum HTTP server and route handlers.
//!
//! Exposes the welcome endpoint and the chat endpoint, maps chat failures to
//! HTTP status codes, and applies the CORS, tracing and compression layers.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
