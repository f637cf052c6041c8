use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use zset_store::KeyStore;

use crate::config::ServerConfig;
use crate::error::{panic_response, ApiError, ServerError, ServerResult};
use crate::handler;
use crate::metrics::PrometheusMetrics;
use crate::middleware::MetricsLayer;
use crate::router::build_router;

/// zset HTTP server.
pub struct StoreServer {
    config: ServerConfig,
    store: Arc<dyn KeyStore>,
    metrics: Arc<PrometheusMetrics>,
}

impl StoreServer {
    pub fn new(config: ServerConfig, store: Arc<dyn KeyStore>) -> Self {
        Self {
            config,
            store,
            metrics: Arc::new(PrometheusMetrics::new()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<PrometheusMetrics> {
        &self.metrics
    }

    /// Build the full application: store routes under the configured
    /// prefix, the metrics exposition, and the middleware stack.
    pub fn router(&self) -> Router {
        let routes = build_router(self.store.clone());
        let prefix = self.config.normalized_prefix();
        let app = if prefix.is_empty() {
            routes
        } else {
            Router::new()
                .nest(&prefix, routes)
                .fallback(handler::not_found)
        };

        let metrics = self.metrics.clone();
        app.route(
            &self.config.metrics_path,
            get(move || {
                let metrics = metrics.clone();
                async move {
                    match metrics.encode() {
                        Ok(text) => (
                            StatusCode::OK,
                            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                            text,
                        )
                            .into_response(),
                        Err(e) => ApiError::new(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("failed to encode metrics: {e}"),
                        )
                        .into_response(),
                    }
                }
            }),
        )
        .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(MetricsLayer::new(self.metrics.clone()))
        .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until the process exits.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener, std::future::pending()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let local = listener.local_addr()?;
        tracing::info!(
            "zset server listening on {local}{}",
            self.config.normalized_prefix()
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
