use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Puzzle sources
    pub static ref PUZZLE_FETCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "puzzle_fetches_total",
        "Puzzle fetches by operation, serving origin and status",
        &["operation", "origin", "status"]
    )
    .unwrap();

    pub static ref LIVE_SOURCE_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "live_source_failures_total",
        "Failed calls to the live puzzle backend",
        &["kind"]
    )
    .unwrap();

    pub static ref LIVE_CALL_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "live_call_duration_seconds",
        "Live puzzle backend call duration in seconds",
        &["operation"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();

    pub static ref PUZZLE_SOURCE_LIVE: IntGauge = register_int_gauge!(
        "puzzle_source_live",
        "1 while the live puzzle backend is selected, 0 in offline mode"
    )
    .unwrap();

    pub static ref STALE_RESULTS_DISCARDED_TOTAL: IntCounter = register_int_counter!(
        "stale_results_discarded_total",
        "Fetch results dropped because a newer request owns the slot"
    )
    .unwrap();

    // Progress
    pub static ref PUZZLE_OUTCOMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "puzzle_outcomes_total",
        "Recorded puzzle attempts",
        &["result"]
    )
    .unwrap();

    pub static ref STORAGE_READ_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "storage_read_failures_total",
        "Unreadable persisted values replaced by defaults",
        &["key"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: time a live backend call and count its failures
pub async fn track_live_call<F, T>(
    operation: &str,
    future: F,
) -> Result<T, crate::error::SourceError>
where
    F: std::future::Future<Output = Result<T, crate::error::SourceError>>,
{
    let start = std::time::Instant::now();
    let result = future.await;

    LIVE_CALL_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(start.elapsed().as_secs_f64());

    if let Err(e) = &result {
        LIVE_SOURCE_FAILURES_TOTAL
            .with_label_values(&[e.kind()])
            .inc();
    }

    result
}
