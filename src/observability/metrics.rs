use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;
use tracing::info;

static METRICS_INSTANCE: OnceLock<Metrics> = OnceLock::new();

/// Process-wide metrics, initialized on first use.
pub fn get_metrics() -> &'static Metrics {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Metrics::new()
    })
}

/// Render all registered metrics in the text exposition format.
pub fn gather_metrics() -> String {
    let metric_families = get_metrics().registry.gather();
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&metric_families, &mut buffer) {
        tracing::warn!("failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub requests: IntCounterVec,
    pub request_failures: IntCounterVec,
    pub request_duration: HistogramVec,

    // Token metrics
    pub tokens_issued: IntCounterVec,
    pub token_cache_lookups: IntCounterVec,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new_custom(Some("arcgisrest".into()), None).unwrap();

        let metrics = Self {
            requests: IntCounterVec::new(Opts::new("requests_total", "Dispatched requests by endpoint and method"), &["endpoint", "method"]).unwrap(),
            request_failures: IntCounterVec::new(Opts::new("request_failures_total", "Failed requests by reason"), &["endpoint", "reason"]).unwrap(),
            request_duration: HistogramVec::new(HistogramOpts::new("request_duration_seconds", "Request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["endpoint"]).unwrap(),

            tokens_issued: IntCounterVec::new(Opts::new("tokens_issued_total", "Tokens obtained from a server by flow"), &["endpoint", "flow"]).unwrap(),
            token_cache_lookups: IntCounterVec::new(Opts::new("token_cache_lookups_total", "Token cache lookups by result"), &["result"]).unwrap(),

            registry,
        };

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.requests.clone())).unwrap();
        reg.register(Box::new(metrics.request_failures.clone())).unwrap();
        reg.register(Box::new(metrics.request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.tokens_issued.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_lookups.clone())).unwrap();

        metrics
    }
}
