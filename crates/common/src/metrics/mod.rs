//! Metrics and observability utilities
//!
//! Prometheus-style metrics through the `metrics` facade. Recording is a
//! no-op until a recorder is installed, so library code and tests can call
//! these helpers freely.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::{Duration, Instant};

/// Metrics prefix for all PaperDash metrics
pub const METRICS_PREFIX: &str = "paperdash";

/// Histogram buckets for fetch latency (in seconds); the simulated delay
/// alone is half a second
pub const FETCH_BUCKETS: &[f64] = &[
    0.010, // 10ms
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms - simulated delay
    0.750, // 750ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_papers_fetched_total", METRICS_PREFIX),
        Unit::Count,
        "Total paper records returned by the fetch service"
    );

    describe_histogram!(
        format!("{}_fetch_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Paper fetch latency in seconds, delay included"
    );

    describe_counter!(
        format!("{}_fetch_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total failed paper fetches"
    );

    describe_counter!(
        format!("{}_ratings_updated_total", METRICS_PREFIX),
        Unit::Count,
        "Total rating updates"
    );

    describe_gauge!(
        format!("{}_ratings_stored", METRICS_PREFIX),
        Unit::Count,
        "Number of rating records currently held"
    );

    describe_counter!(
        format!("{}_store_load_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Rating store loads that discarded unreadable data"
    );

    describe_counter!(
        format!("{}_chat_messages_total", METRICS_PREFIX),
        Unit::Count,
        "Chat messages exchanged with the stub assistant"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion and return how long it took
    pub fn finish(self, status: u16) -> Duration {
        let elapsed = self.start.elapsed();
        let duration = elapsed.as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);

        elapsed
    }
}

/// Record a completed or failed fetch
pub fn record_fetch(duration_secs: f64, source: &str, paper_count: usize, success: bool) {
    if success {
        counter!(
            format!("{}_papers_fetched_total", METRICS_PREFIX),
            "source" => source.to_string()
        )
        .increment(paper_count as u64);

        histogram!(
            format!("{}_fetch_duration_seconds", METRICS_PREFIX),
            "source" => source.to_string()
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_fetch_errors_total", METRICS_PREFIX),
            "source" => source.to_string()
        )
        .increment(1);
    }
}

pub fn record_rating_update(rating: u8) {
    counter!(
        format!("{}_ratings_updated_total", METRICS_PREFIX),
        "rating" => rating.to_string()
    )
    .increment(1);
}

pub fn set_ratings_stored(count: usize) {
    gauge!(format!("{}_ratings_stored", METRICS_PREFIX)).set(count as f64);
}

pub fn record_store_load_fallback() {
    counter!(format!("{}_store_load_fallbacks_total", METRICS_PREFIX)).increment(1);
}

pub fn record_chat_message(sender: &str) {
    counter!(
        format!("{}_chat_messages_total", METRICS_PREFIX),
        "sender" => sender.to_string()
    )
    .increment(1);
}
