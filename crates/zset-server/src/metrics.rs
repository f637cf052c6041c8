//! Per-request instrumentation.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// What the HTTP surface reports about each request.
///
/// `client_entered` and `client_exited` bracket every request, including
/// ones whose handler panics or whose connection goes away mid-flight.
pub trait MetricsSink: Send + Sync {
    fn client_entered(&self);
    fn client_exited(&self);
    fn observe_request(&self, method: &str, path: &str, status: u16, seconds: f64);
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    pub path: String,
    pub status: String,
}

fn duration_histogram() -> Histogram {
    Histogram::new(exponential_buckets(0.0005, 2.0, 16))
}

/// Prometheus-backed sink.
pub struct PrometheusMetrics {
    registry: Registry,
    pub clients: Gauge,
    pub request_duration: Family<RequestLabels, Histogram, fn() -> Histogram>,
}

impl Default for PrometheusMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let clients = Gauge::default();
        registry.register(
            "zset_clients",
            "Number of requests currently being served",
            clients.clone(),
        );

        let request_duration =
            Family::<RequestLabels, Histogram, fn() -> Histogram>::new_with_constructor(
                duration_histogram,
            );
        registry.register(
            "zset_request_duration_seconds",
            "Request latency by method, path and status",
            request_duration.clone(),
        );

        Self {
            registry,
            clients,
            request_duration,
        }
    }

    /// Render the registry in the Prometheus text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl MetricsSink for PrometheusMetrics {
    fn client_entered(&self) {
        self.clients.inc();
    }

    fn client_exited(&self) {
        self.clients.dec();
    }

    fn observe_request(&self, method: &str, path: &str, status: u16, seconds: f64) {
        self.request_duration
            .get_or_create(&RequestLabels {
                method: method.to_string(),
                path: path.to_string(),
                status: status.to_string(),
            })
            .observe(seconds);
    }
}
