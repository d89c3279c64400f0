//! Prometheus metrics endpoint

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, TextEncoder};

use crate::metrics::REGISTRY;

/// Returns all registered metrics in Prometheus text format.
async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&REGISTRY.gather()) {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, encoder.format_type())], body)
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// Create metrics router
///
/// Exposes the `/metrics` endpoint.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(metrics_handler))
}
