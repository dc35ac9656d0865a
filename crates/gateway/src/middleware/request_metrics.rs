//! Per-request latency and status metrics, plus the `x-process-time`
//! response header

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use paperdash_common::metrics::RequestMetrics;

use crate::PROCESS_TIME_HEADER;

/// Record method, route template and status of every request
pub async fn track_requests(request: Request, next: Next) -> Response {
    // Route templates keep paper ids out of metric labels
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let metrics = RequestMetrics::start(request.method().as_str(), &endpoint);
    let mut response = next.run(request).await;
    let elapsed = metrics.finish(response.status().as_u16());

    if let Ok(value) = HeaderValue::from_str(&format!("{:.6}", elapsed.as_secs_f64())) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }
    response
}
