//! Server core functionality
//!
//! HTTP transport for the request flow: startup, routing, and page rendering.

pub mod core;
pub mod pages;
pub mod routes;

pub use self::core::Server;
pub use routes::{AppState, SESSION_COOKIE, build_router};
