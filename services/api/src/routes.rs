use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use grade_sim::simulations::{simulation_router, SimulationRepository, SimulationService};
use serde_json::json;
use std::sync::Arc;

const ENDPOINTS: [(&str, &str); 9] = [
    ("GET", "/health"),
    ("GET", "/ready"),
    ("GET", "/metrics"),
    ("POST", "/api/calculateAverage"),
    ("POST", "/api/calculateRequiredGrade"),
    ("POST", "/api/saveSimulation"),
    ("GET", "/api/getHistory?userId=&limit="),
    ("DELETE", "/api/deleteSimulation/:id"),
    ("GET", "/"),
];

pub(crate) fn with_simulation_routes<R>(service: Arc<SimulationService<R>>) -> axum::Router
where
    R: SimulationRepository + 'static,
{
    let passing_threshold = service.engine().config().passing_threshold;
    let descriptor =
        move |state: Extension<AppState>| service_descriptor(state, passing_threshold);

    simulation_router(service)
        .route("/", get(descriptor))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn service_descriptor(
    Extension(state): Extension<AppState>,
    passing_threshold: f64,
) -> Json<serde_json::Value> {
    let endpoints: Vec<_> = ENDPOINTS
        .iter()
        .map(|(method, path)| json!({ "method": method, "path": path }))
        .collect();

    Json(json!({
        "name": "grade-sim",
        "version": env!("CARGO_PKG_VERSION"),
        "passingThreshold": passing_threshold,
        "startedAt": state.started_at,
        "endpoints": endpoints,
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    if ready {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::cors_layer;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use chrono::Utc;
    use grade_sim::simulations::{InMemorySimulationRepository, SimulationConfig};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<AtomicBool>) {
        let readiness = Arc::new(AtomicBool::new(ready));
        let state = AppState {
            readiness: readiness.clone(),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            started_at: Utc::now(),
        };
        let service = Arc::new(SimulationService::new(
            Arc::new(InMemorySimulationRepository::default()),
            SimulationConfig::default(),
        ));
        let router = with_simulation_routes(service)
            .layer(Extension(state))
            .layer(cors_layer());
        (router, readiness)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn descriptor_lists_endpoints() {
        let (router, _) = app(true);
        let response = router.oneshot(get_request("/")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["passingThreshold"], 10.5);
        let endpoints = body["endpoints"].as_array().expect("endpoint list");
        assert!(endpoints
            .iter()
            .any(|endpoint| endpoint["path"] == "/api/calculateRequiredGrade"));
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let (router, readiness) = app(false);
        let response = router
            .clone()
            .oneshot(get_request("/ready"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        readiness.store(true, Ordering::Release);
        let response = router
            .oneshot(get_request("/ready"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let (router, _) = app(true);
        let response = router
            .clone()
            .oneshot(get_request("/health"))
            .await
            .expect("response");
        assert_eq!(json_body(response).await["status"], "ok");

        let response = router
            .oneshot(get_request("/metrics"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let (router, _) = app(true);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/calculateAverage")
            .header(header::ORIGIN, "https://grades.example.org")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .expect("request builds");

        let response = router.oneshot(request).await.expect("response");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn calculations_are_served_alongside_probes() {
        let (router, _) = app(true);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/calculateAverage")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"evaluations":[{"score":12,"weight":0.5},{"score":18,"weight":0.5}]}"#,
            ))
            .expect("request builds");

        let response = router.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["average"], 15.0);
    }
}
