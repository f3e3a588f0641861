//! Axum HTTP API server.
//!
//! This crate provides:
//! - The `POST /detect_cows` multipart upload endpoint
//! - Any-origin CORS for browser clients
//! - Request ID and request logging middleware

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
