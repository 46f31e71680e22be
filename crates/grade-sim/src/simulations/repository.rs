use super::domain::{NewSimulation, SimulationId, SimulationRecord, UserId};

/// Document-store abstraction so the service can run against any backend.
pub trait SimulationRepository: Send + Sync {
    /// Stores the simulation, assigning its id and creation time.
    fn save(&self, simulation: NewSimulation) -> Result<SimulationRecord, RepositoryError>;
    /// Most recent simulations first, at most `limit` of them.
    fn list_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<SimulationRecord>, RepositoryError>;
    fn delete(&self, id: &SimulationId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("simulation not found")]
    NotFound,
    #[error("simulation store unavailable: {0}")]
    Unavailable(String),
}
