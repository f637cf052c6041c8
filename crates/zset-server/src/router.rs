use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use zset_protocol::endpoints;
use zset_store::KeyStore;

use crate::handler::{self, AppState};

/// Build the seven store routes, unprefixed.
///
/// Every method/path pair outside the table, including a wrong method on a
/// known path, answers with the JSON 404 envelope. `get` would also answer
/// HEAD, so the read routes map HEAD to the 404 handler explicitly.
pub fn build_router(store: Arc<dyn KeyStore>) -> Router {
    Router::new()
        .route(endpoints::INSERT, post(handler::insert).fallback(handler::not_found))
        .route(endpoints::DELETE, post(handler::delete).fallback(handler::not_found))
        .route(
            endpoints::SELECT,
            get(handler::select)
                .head(handler::not_found)
                .fallback(handler::not_found),
        )
        .route(
            endpoints::KEYS,
            get(handler::keys)
                .head(handler::not_found)
                .fallback(handler::not_found),
        )
        .route(
            endpoints::SIZE,
            get(handler::size)
                .head(handler::not_found)
                .fallback(handler::not_found),
        )
        .route(
            endpoints::MEMBERS,
            get(handler::members)
                .head(handler::not_found)
                .fallback(handler::not_found),
        )
        .route(
            endpoints::SCORE,
            get(handler::score)
                .head(handler::not_found)
                .fallback(handler::not_found),
        )
        .fallback(handler::not_found)
        .with_state(AppState::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::RequestStart;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use std::time::{Duration, Instant};
    use tower::util::ServiceExt;
    use zset_protocol::headers;
    use zset_store::{Serialiser, Store, StoreError, StoreResult};
    use zset_types::{ChangeSet, Field, FieldValueScore, Key, Presence};

    fn app() -> Router {
        build_router(Arc::new(Serialiser::spawn(Store::new())))
    }

    /// A store whose every operation fails.
    struct Broken;

    #[async_trait]
    impl KeyStore for Broken {
        async fn insert(&self, _: &Key, _: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
            Err(StoreError::Internal("disk on fire".into()))
        }
        async fn delete(&self, _: &Key, _: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
            Err(StoreError::Internal("disk on fire".into()))
        }
        async fn select(&self, _: &Key, _: &Field) -> StoreResult<FieldValueScore> {
            Err(StoreError::Internal("disk on fire".into()))
        }
        async fn keys(&self) -> StoreResult<Vec<Key>> {
            Err(StoreError::Shutdown)
        }
        async fn size(&self, _: &Key) -> StoreResult<i64> {
            Err(StoreError::Shutdown)
        }
        async fn members(&self, _: &Key) -> StoreResult<Vec<Field>> {
            Err(StoreError::Shutdown)
        }
        async fn score(&self, _: &Key, _: &Field) -> StoreResult<Presence> {
            Err(StoreError::Shutdown)
        }
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    fn head_req(uri: &str) -> Request<Body> {
        Request::builder().method("HEAD").uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const ONE_MEMBER: &str = r#"{"members":[{"field":"F","value":"AQI=","score":5}]}"#;

    #[tokio::test]
    async fn insert_echoes_key() {
        let response = app().oneshot(post_json("/insert?key=K1", ONE_MEMBER)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[headers::KEY], "K1");
        assert!(response.headers().get(headers::FIELD).is_none());
        assert!(response.headers().get(headers::DURATION).is_some());
        let body = json(response).await;
        assert_eq!(body["records"]["success"], serde_json::json!(["F"]));
    }

    #[tokio::test]
    async fn score_echoes_key_and_field() {
        let response = app().oneshot(get_req("/score?key=K1&field=F")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[headers::KEY], "K1");
        assert_eq!(response.headers()[headers::FIELD], "F");
        let body = json(response).await;
        assert_eq!(body["records"]["present"], false);
    }

    #[tokio::test]
    async fn missing_key_is_bad_request_everywhere() {
        let cases = [
            post_json("/insert", ONE_MEMBER),
            post_json("/delete", ONE_MEMBER),
            get_req("/select?field=F"),
            get_req("/size"),
            get_req("/members?key="),
            get_req("/score?field=F"),
        ];
        for request in cases {
            let uri = request.uri().clone();
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = json(response).await;
            assert_eq!(body["code"], 400);
            assert!(!body["description"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn required_endpoints_check_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/insert?key=K1")
            .header("content-type", "text/plain")
            .body(Body::from(ONE_MEMBER))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_bodies_are_bad_requests() {
        for body in ["", "{not json", r#"{"members":[{"field":"F"}]}"#] {
            let response = app().oneshot(post_json("/insert?key=K1", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        }
    }

    #[tokio::test]
    async fn select_of_absent_field_is_not_found() {
        let response = app().oneshot(get_req("/select?key=K1&field=F")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["code"], 404);
    }

    #[tokio::test]
    async fn store_failures_are_internal() {
        let broken = build_router(Arc::new(Broken));
        let cases = [
            post_json("/insert?key=K1", ONE_MEMBER),
            get_req("/select?key=K1&field=F"),
            get_req("/keys"),
            get_req("/size?key=K1"),
        ];
        for request in cases {
            let response = broken.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json(response).await["code"], 500);
        }
    }

    #[tokio::test]
    async fn unknown_routes_and_methods_are_not_found() {
        let cases = [
            get_req("/nope"),
            get_req("/insert?key=K1"),
            post_json("/keys", "{}"),
            get_req("/Keys"),
            head_req("/keys"),
            head_req("/size?key=K1"),
            head_req("/select?key=K1&field=F"),
            head_req("/members?key=K1"),
            head_req("/score?key=K1&field=F"),
        ];
        for request in cases {
            let uri = request.uri().clone();
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(json(response).await["code"], 404);
        }
    }

    #[tokio::test]
    async fn every_keyed_endpoint_echoes_its_parameters() {
        let app = app();
        let seeded = app
            .clone()
            .oneshot(post_json("/insert?key=K1", ONE_MEMBER))
            .await
            .unwrap();
        assert_eq!(seeded.status(), StatusCode::OK);

        let cases = [
            (post_json("/insert?key=K1", ONE_MEMBER), None),
            (get_req("/select?key=K1&field=F"), Some("F")),
            (get_req("/size?key=K1"), None),
            (get_req("/members?key=K1"), None),
            (get_req("/score?key=K1&field=F"), Some("F")),
            (post_json("/delete?key=K1", ONE_MEMBER), None),
        ];
        for (request, field) in cases {
            let uri = request.uri().clone();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(response.headers()[headers::KEY], "K1", "{uri}");
            match field {
                Some(field) => assert_eq!(response.headers()[headers::FIELD], field, "{uri}"),
                None => assert!(response.headers().get(headers::FIELD).is_none(), "{uri}"),
            }
        }
    }

    #[tokio::test]
    async fn duration_counts_from_request_start() {
        let earlier = Instant::now()
            .checked_sub(Duration::from_millis(50))
            .unwrap();
        let mut request = post_json("/insert?key=K1", ONE_MEMBER);
        request.extensions_mut().insert(RequestStart(earlier));

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let duration = response.headers()[headers::DURATION].to_str().unwrap();
        let millis: f64 = duration.trim_end_matches("ms").parse().unwrap();
        assert!(millis >= 50.0, "{duration}");
    }
}
