//! CORS layer configuration.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

use vaultdrop_core::config::CorsConfig;

/// Builds a CORS tower layer from configuration.
///
/// Wildcards cannot be combined with credentials, so when credentials are
/// allowed a `*` origin mirrors the request origin and a `*` header list
/// mirrors the requested headers.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    let any_origin = config.allowed_origins.iter().any(|o| o == "*");
    layer = match (any_origin, config.allow_credentials) {
        (true, false) => layer.allow_origin(Any),
        (true, true) => layer.allow_origin(AllowOrigin::mirror_request()),
        (false, _) => {
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            layer.allow_origin(origins)
        }
    };

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    let any_header = config.allowed_headers.iter().any(|h| h == "*");
    layer = match (any_header, config.allow_credentials) {
        (true, false) => layer.allow_headers(Any),
        (true, true) => layer.allow_headers(AllowHeaders::mirror_request()),
        (false, _) => {
            let headers: Vec<HeaderName> = config
                .allowed_headers
                .iter()
                .filter_map(|h| h.parse().ok())
                .collect();
            layer.allow_headers(headers)
        }
    };

    // Browsers only reveal the download filename when this is exposed.
    layer
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(config.allow_credentials)
        .max_age(Duration::from_secs(config.max_age_seconds))
}
