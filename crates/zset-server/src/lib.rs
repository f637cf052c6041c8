//! HTTP surface for zset.
//!
//! Decodes query parameters and member batches, forwards each of the seven
//! operations to a [`KeyStore`](zset_store::KeyStore), and encodes results
//! as `{"records": ...}` with the `X-Duration`, `X-Key` and `X-Field`
//! diagnostic headers. Every request passes through [`MetricsLayer`], which
//! tracks in-flight clients and request latency.

pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod middleware;
pub mod params;
pub mod response;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::AppState;
pub use metrics::{MetricsSink, PrometheusMetrics};
pub use middleware::MetricsLayer;
pub use params::Strictness;
pub use response::{Params, Payload, Reply};
pub use router::build_router;
pub use server::StoreServer;
