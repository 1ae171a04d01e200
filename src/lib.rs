pub mod auth;
pub mod config;
pub mod error;
pub mod flow;
pub mod middleware;
pub mod model;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use server::Server;
