//! Simulation records: computing through the grade engine, persisting the outcome per user and
//! serving the history back over HTTP.

pub mod domain;
pub mod history;
mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{NewSimulation, SimulationId, SimulationRecord, UserId};
pub use history::{follow_session, HistoryState};
pub use memory::InMemorySimulationRepository;
pub use repository::{RepositoryError, SimulationRepository};
pub use router::simulation_router;
pub use service::{
    Persistence, SimulationConfig, SimulationOutcome, SimulationService, SimulationServiceError,
    DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT,
};
