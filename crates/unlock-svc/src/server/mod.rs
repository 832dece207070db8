//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Run decrypts off the async executor so one slow PBKDF2 never stalls
//!   other requests.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
