//! Tower middleware feeding a [`MetricsSink`].

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::async_trait;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Request, Response};
use tower::{Layer, Service};

use crate::metrics::MetricsSink;

/// When the request entered the server, stamped by [`MetricsService`] into
/// the request extensions. Extracting it where no stamp exists yields the
/// extraction time.
#[derive(Clone, Copy, Debug)]
pub struct RequestStart(pub Instant);

impl RequestStart {
    pub fn now() -> Self {
        Self(Instant::now())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestStart {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestStart>()
            .copied()
            .unwrap_or_else(RequestStart::now))
    }
}

#[derive(Clone)]
pub struct MetricsLayer {
    sink: Arc<dyn MetricsSink>,
}

impl MetricsLayer {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            sink: self.sink.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    sink: Arc<dyn MetricsSink>,
}

/// Decrements the clients gauge when the request future ends, however it ends.
struct ClientGuard(Arc<dyn MetricsSink>);

impl ClientGuard {
    fn enter(sink: Arc<dyn MetricsSink>) -> Self {
        sink.client_entered();
        Self(sink)
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.0.client_exited();
    }
}

impl<S, ResBody> Service<Request<Body>> for MetricsService<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ResBody: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let start = request
            .extensions()
            .get::<RequestStart>()
            .copied()
            .unwrap_or_else(RequestStart::now);
        request.extensions_mut().insert(start);
        let method = request.method().to_string();
        // Unmatched routes are labelled with the path as requested.
        let path = request.uri().path().to_string();
        let sink = self.sink.clone();
        let guard = ClientGuard::enter(sink.clone());

        let future = self.inner.call(request);

        Box::pin(async move {
            let _guard = guard;
            let response = future.await?;
            sink.observe_request(
                &method,
                &path,
                response.status().as_u16(),
                start.0.elapsed().as_secs_f64(),
            );
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::service_fn;

    #[derive(Default)]
    struct Recorder {
        active: Mutex<i64>,
        observed: Mutex<Vec<(String, String, u16)>>,
    }

    impl MetricsSink for Recorder {
        fn client_entered(&self) {
            *self.active.lock().unwrap() += 1;
        }
        fn client_exited(&self) {
            *self.active.lock().unwrap() -= 1;
        }
        fn observe_request(&self, method: &str, path: &str, status: u16, _seconds: f64) {
            self.observed
                .lock()
                .unwrap()
                .push((method.to_string(), path.to_string(), status));
        }
    }

    #[tokio::test]
    async fn observes_method_path_and_status() {
        let recorder = Arc::new(Recorder::default());
        let inner = service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(Response::builder().status(404).body(Body::empty()).unwrap())
        });
        let mut service = MetricsLayer::new(recorder.clone()).layer(inner);

        let request = Request::builder()
            .method("GET")
            .uri("/nope?x=1")
            .body(Body::empty())
            .unwrap();
        let response = service.call(request).await.unwrap();

        assert_eq!(response.status(), 404);
        assert_eq!(*recorder.active.lock().unwrap(), 0);
        assert_eq!(
            recorder.observed.lock().unwrap().as_slice(),
            &[("GET".to_string(), "/nope".to_string(), 404)]
        );
    }

    #[tokio::test]
    async fn dropped_request_still_exits() {
        let recorder = Arc::new(Recorder::default());
        let inner = service_fn(|_req: Request<Body>| async {
            std::future::pending::<Result<Response<Body>, Infallible>>().await
        });
        let mut service = MetricsLayer::new(recorder.clone()).layer(inner);

        let future = service.call(Request::new(Body::empty()));
        assert_eq!(*recorder.active.lock().unwrap(), 1);
        drop(future);

        assert_eq!(*recorder.active.lock().unwrap(), 0);
        assert!(recorder.observed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inner_service_sees_request_start() {
        let inner = service_fn(|req: Request<Body>| async move {
            let seen = req.extensions().get::<RequestStart>().is_some();
            let status = if seen { 200 } else { 500 };
            Ok::<_, Infallible>(Response::builder().status(status).body(Body::empty()).unwrap())
        });
        let mut service = MetricsLayer::new(Arc::new(Recorder::default())).layer(inner);
        let response = service.call(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn earlier_stamp_is_kept() {
        let earlier = Instant::now()
            .checked_sub(Duration::from_millis(50))
            .unwrap();
        let inner = service_fn(move |req: Request<Body>| async move {
            let start = req.extensions().get::<RequestStart>().copied().unwrap();
            let status = if start.0 == earlier { 200 } else { 500 };
            Ok::<_, Infallible>(Response::builder().status(status).body(Body::empty()).unwrap())
        });
        let mut service = MetricsLayer::new(Arc::new(Recorder::default())).layer(inner);
        let mut request = Request::new(Body::empty());
        request.extensions_mut().insert(RequestStart(earlier));
        let response = service.call(request).await.unwrap();
        assert_eq!(response.status(), 200);
    }
}
