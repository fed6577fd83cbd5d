//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Logs request method, path, status, and duration.
///
/// Share tokens travel in the path, so only the route prefix is logged for
/// share routes.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = loggable_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "HTTP request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "HTTP request"
        );
    }

    response
}

fn loggable_path(path: &str) -> String {
    for prefix in ["/api/v1/share/", "/api/v1/transfers/"] {
        if let Some(rest) = path.strip_prefix(prefix) {
            if rest == "sent" || rest == "received" {
                return path.to_string();
            }
            let tail = rest.split_once('/').map(|(_, t)| t).unwrap_or("");
            return if tail.is_empty() {
                format!("{prefix}{{token}}")
            } else {
                format!("{prefix}{{token}}/{tail}")
            };
        }
    }
    path.to_string()
}
