use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{NewSimulation, SimulationId, UserId};
use super::repository::{RepositoryError, SimulationRepository};
use super::service::{Persistence, SimulationService, SimulationServiceError};
use crate::error::AppError;
use crate::grading::{round_display, EvaluationSet, ValidationError, Verdict};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageRequest {
    pub evaluations: EvaluationSet,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredScoreRequest {
    pub evaluations: EvaluationSet,
    #[serde(default)]
    pub passing_threshold: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSimulationRequest {
    #[serde(default)]
    pub evaluations: Option<EvaluationSet>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub required_score: Option<f64>,
    #[serde(default)]
    pub passing_threshold: Option<f64>,
    #[serde(default)]
    pub reachable: Option<bool>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageResponse {
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation_id: Option<SimulationId>,
    pub persistence: Persistence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredScoreResponse {
    pub required_score: f64,
    pub reachable: bool,
    pub verdict: Verdict,
    pub message: String,
    pub passing_threshold: f64,
    pub pending_weight: f64,
    pub current_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation_id: Option<SimulationId>,
    pub persistence: Persistence,
}

/// Router exposing the calculation and simulation history endpoints.
pub fn simulation_router<R>(service: Arc<SimulationService<R>>) -> Router
where
    R: SimulationRepository + 'static,
{
    Router::new()
        .route("/api/calculateAverage", post(average_handler::<R>))
        .route(
            "/api/calculateRequiredGrade",
            post(required_score_handler::<R>),
        )
        .route("/api/saveSimulation", post(save_handler::<R>))
        .route("/api/getHistory", get(history_handler::<R>))
        .route("/api/deleteSimulation/:id", delete(delete_handler::<R>))
        .with_state(service)
}

fn requesting_user(raw: Option<&str>) -> Option<UserId> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
}

pub(crate) async fn average_handler<R>(
    State(service): State<Arc<SimulationService<R>>>,
    payload: Result<Json<AverageRequest>, JsonRejection>,
) -> Response
where
    R: SimulationRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let user_id = requesting_user(request.user_id.as_deref());
    match service.simulate_average(request.evaluations, user_id) {
        Ok(outcome) => {
            let body = AverageResponse {
                average: outcome.result.display(),
                simulation_id: outcome.persistence.saved_id().cloned(),
                persistence: outcome.persistence,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => validation_response(&error),
    }
}

pub(crate) async fn required_score_handler<R>(
    State(service): State<Arc<SimulationService<R>>>,
    payload: Result<Json<RequiredScoreRequest>, JsonRejection>,
) -> Response
where
    R: SimulationRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let user_id = requesting_user(request.user_id.as_deref());
    match service.simulate_required_score(
        request.evaluations,
        request.passing_threshold,
        user_id,
    ) {
        Ok(outcome) => {
            let required = outcome.result;
            let body = RequiredScoreResponse {
                required_score: required.display(),
                reachable: required.reachable,
                verdict: required.verdict(),
                message: required.message(),
                passing_threshold: required.passing_threshold,
                pending_weight: required.pending_weight,
                current_average: required.current_average.map(round_display),
                simulation_id: outcome.persistence.saved_id().cloned(),
                persistence: outcome.persistence,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => validation_response(&error),
    }
}

pub(crate) async fn save_handler<R>(
    State(service): State<Arc<SimulationService<R>>>,
    payload: Result<Json<SaveSimulationRequest>, JsonRejection>,
) -> Response
where
    R: SimulationRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let Some(evaluations) = request.evaluations else {
        return service_error_response(&SimulationServiceError::MissingEvaluations);
    };

    let simulation = NewSimulation {
        evaluations,
        average: request.average,
        required_score: request.required_score,
        passing_threshold: request.passing_threshold,
        reachable: request.reachable,
        user_id: UserId::or_anonymous(request.user_id.as_deref()),
    };

    match service.save(simulation) {
        Ok(record) => {
            let payload = json!({
                "ok": true,
                "message": "simulation saved",
                "id": record.id,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => service_error_response(&error),
    }
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<SimulationService<R>>>,
    query: Result<Query<HistoryQuery>, axum::extract::rejection::QueryRejection>,
) -> Response
where
    R: SimulationRepository + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &rejection.body_text(),
                "invalid_input",
            );
        }
    };

    let user_id = UserId::or_anonymous(query.user_id.as_deref());
    match service.history(&user_id, query.limit) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => service_error_response(&error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<SimulationService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: SimulationRepository + 'static,
{
    let id = SimulationId(id);
    match service.delete(&id) {
        Ok(()) => {
            let payload = json!({ "ok": true, "message": "simulation deleted" });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => service_error_response(&error),
    }
}

fn error_response(status: StatusCode, message: &str, kind: &str) -> Response {
    let payload = json!({
        "error": message,
        "kind": kind,
    });
    (status, Json(payload)).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    error_response(rejection.status(), &rejection.body_text(), "invalid_input")
}

fn validation_response(error: &ValidationError) -> Response {
    AppError::from(error.clone()).into_response()
}

fn service_error_response(error: &SimulationServiceError) -> Response {
    match error {
        SimulationServiceError::Validation(error) => validation_response(error),
        SimulationServiceError::MissingEvaluations => error_response(
            StatusCode::BAD_REQUEST,
            &error.to_string(),
            "missing_evaluations",
        ),
        SimulationServiceError::Repository(RepositoryError::NotFound) => {
            error_response(StatusCode::NOT_FOUND, &error.to_string(), "not_found")
        }
        SimulationServiceError::Repository(RepositoryError::Unavailable(_)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &error.to_string(),
            "storage_unavailable",
        ),
    }
}
