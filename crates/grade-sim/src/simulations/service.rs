use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{NewSimulation, SimulationId, SimulationRecord, UserId};
use super::repository::{RepositoryError, SimulationRepository};
use crate::grading::{
    self, Average, EvaluationSet, GradeEngine, GradingConfig, RequiredScore, ValidationError,
};

/// Upper bound on a single history page, whatever the caller asks for.
pub const MAX_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Settings for the simulation service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub grading: GradingConfig,
    pub history_limit: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grading: GradingConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Whether a computed result made it into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Persistence {
    Saved { id: SimulationId },
    /// No user was attached to the request.
    Skipped,
    Failed { message: String },
}

impl Persistence {
    pub fn saved_id(&self) -> Option<&SimulationId> {
        match self {
            Persistence::Saved { id } => Some(id),
            _ => None,
        }
    }
}

/// A computed result together with the outcome of persisting it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome<T> {
    pub result: T,
    pub persistence: Persistence,
}

/// Service composing the grade engine with the simulation store.
pub struct SimulationService<R> {
    repository: Arc<R>,
    engine: GradeEngine,
    history_limit: usize,
}

impl<R> SimulationService<R>
where
    R: SimulationRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: SimulationConfig) -> Self {
        Self {
            repository,
            engine: GradeEngine::new(config.grading),
            history_limit: config.history_limit.clamp(1, MAX_HISTORY_LIMIT),
        }
    }

    pub fn engine(&self) -> &GradeEngine {
        &self.engine
    }

    pub fn average(&self, evaluations: &EvaluationSet) -> Result<Average, ValidationError> {
        self.engine.average(evaluations)
    }

    pub fn required_score(
        &self,
        evaluations: &EvaluationSet,
        passing_threshold: Option<f64>,
    ) -> Result<RequiredScore, ValidationError> {
        self.engine.required_score(evaluations, passing_threshold)
    }

    /// Computes the average and, when a user is given, records the simulation.
    pub fn simulate_average(
        &self,
        evaluations: EvaluationSet,
        user_id: Option<UserId>,
    ) -> Result<SimulationOutcome<Average>, ValidationError> {
        let average = self.engine.average(&evaluations)?;
        let persistence = match user_id {
            Some(user_id) => {
                self.persist(NewSimulation::from_average(evaluations, &average, user_id))
            }
            None => Persistence::Skipped,
        };

        Ok(SimulationOutcome {
            result: average,
            persistence,
        })
    }

    /// Solves for the pending score and, when a user is given, records the simulation.
    pub fn simulate_required_score(
        &self,
        evaluations: EvaluationSet,
        passing_threshold: Option<f64>,
        user_id: Option<UserId>,
    ) -> Result<SimulationOutcome<RequiredScore>, ValidationError> {
        let required = self
            .engine
            .required_score(&evaluations, passing_threshold)?;
        let persistence = match user_id {
            Some(user_id) => self.persist(NewSimulation::from_required_score(
                evaluations,
                &required,
                user_id,
            )),
            None => Persistence::Skipped,
        };

        Ok(SimulationOutcome {
            result: required,
            persistence,
        })
    }

    /// Stores a simulation computed elsewhere.
    pub fn save(
        &self,
        simulation: NewSimulation,
    ) -> Result<SimulationRecord, SimulationServiceError> {
        if simulation.evaluations.is_empty() {
            return Err(SimulationServiceError::MissingEvaluations);
        }
        grading::validate(&simulation.evaluations)?;

        let record = self.repository.save(simulation)?;
        info!(id = %record.id, user = %record.user_id, "simulation saved");
        Ok(record)
    }

    /// Most recent simulations for `user_id`; `limit` defaults to the configured page size.
    pub fn history(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<SimulationRecord>, SimulationServiceError> {
        let limit = limit
            .unwrap_or(self.history_limit)
            .clamp(1, MAX_HISTORY_LIMIT);
        let records = self.repository.list_by_user(user_id, limit)?;
        debug!(user = %user_id, count = records.len(), "history loaded");
        Ok(records)
    }

    pub fn delete(&self, id: &SimulationId) -> Result<(), SimulationServiceError> {
        self.repository.delete(id)?;
        info!(%id, "simulation deleted");
        Ok(())
    }

    // A failed save never discards the computed result.
    fn persist(&self, simulation: NewSimulation) -> Persistence {
        match self.repository.save(simulation) {
            Ok(record) => {
                info!(id = %record.id, user = %record.user_id, "simulation saved");
                Persistence::Saved { id: record.id }
            }
            Err(error) => {
                warn!(%error, "simulation computed but not saved");
                Persistence::Failed {
                    message: error.to_string(),
                }
            }
        }
    }
}

/// Error raised by the simulation service.
#[derive(Debug, thiserror::Error)]
pub enum SimulationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a simulation needs at least one evaluation")]
    MissingEvaluations,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
