//! Logging middleware
//!
//! Provides request logging functionality.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use std::time::Instant;

/// Log every request with its status and latency
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = started.elapsed();
    if status.is_server_error() {
        warn!("{} {} -> {} ({:?})", method, path, status.as_u16(), elapsed);
    } else {
        info!("{} {} -> {} ({:?})", method, path, status.as_u16(), elapsed);
    }
    response
}
