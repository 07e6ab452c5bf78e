use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
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

    // AI generation
    pub static ref AI_GENERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ai_generations_total",
        "Total number of AI exercise generations",
        &["outcome"]
    )
    .unwrap();

    pub static ref AI_UPSTREAM_DURATION_SECONDS: Histogram = register_histogram!(
        "ai_upstream_duration_seconds",
        "Duration of generative AI provider calls in seconds",
        vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]
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

pub fn record_generation(outcome: &str) {
    AI_GENERATIONS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Times a provider call, successful or not.
pub async fn track_upstream_call<F, T>(future: F) -> Result<T, anyhow::Error>
where
    F: std::future::Future<Output = Result<T, anyhow::Error>>,
{
    let timer = AI_UPSTREAM_DURATION_SECONDS.start_timer();
    let result = future.await;
    timer.observe_duration();
    result
}
