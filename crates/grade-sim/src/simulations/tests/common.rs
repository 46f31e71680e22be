use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::grading::{EvaluationItem, EvaluationSet, GradingConfig};
use crate::simulations::domain::{NewSimulation, SimulationId, SimulationRecord, UserId};
use crate::simulations::repository::{RepositoryError, SimulationRepository};
use crate::simulations::{
    simulation_router, InMemorySimulationRepository, SimulationConfig, SimulationService,
};

pub(super) fn simulation_config() -> SimulationConfig {
    SimulationConfig {
        grading: GradingConfig::default(),
        history_limit: 20,
    }
}

pub(super) fn complete_set() -> EvaluationSet {
    EvaluationSet::new(vec![
        EvaluationItem::graded(10.0, 0.5).with_label("Midterm"),
        EvaluationItem::graded(20.0, 0.5).with_label("Final"),
    ])
}

pub(super) fn pending_set() -> EvaluationSet {
    EvaluationSet::new(vec![
        EvaluationItem::graded(10.0, 0.6).with_label("Midterm"),
        EvaluationItem::pending(0.4).with_label("Final"),
    ])
}

pub(super) fn user(id: &str) -> UserId {
    UserId(id.to_string())
}

pub(super) fn build_service() -> (
    SimulationService<InMemorySimulationRepository>,
    Arc<InMemorySimulationRepository>,
) {
    let repository = Arc::new(InMemorySimulationRepository::default());
    let service = SimulationService::new(repository.clone(), simulation_config());
    (service, repository)
}

pub(super) fn router_with_service(
    service: SimulationService<InMemorySimulationRepository>,
) -> axum::Router {
    simulation_router(Arc::new(service))
}

pub(super) struct UnavailableRepository;

impl SimulationRepository for UnavailableRepository {
    fn save(&self, _simulation: NewSimulation) -> Result<SimulationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable(
            "document store offline".to_string(),
        ))
    }

    fn list_by_user(
        &self,
        _user_id: &UserId,
        _limit: usize,
    ) -> Result<Vec<SimulationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable(
            "document store offline".to_string(),
        ))
    }

    fn delete(&self, _id: &SimulationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable(
            "document store offline".to_string(),
        ))
    }
}

pub(super) fn unavailable_service() -> SimulationService<UnavailableRepository> {
    SimulationService::new(Arc::new(UnavailableRepository), simulation_config())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
