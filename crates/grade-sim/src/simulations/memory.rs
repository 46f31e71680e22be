use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::domain::{NewSimulation, SimulationId, SimulationRecord, UserId};
use super::repository::{RepositoryError, SimulationRepository};

/// Process-local simulation store backing the HTTP service and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemorySimulationRepository {
    records: Arc<Mutex<Vec<SimulationRecord>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemorySimulationRepository {
    fn next_id(&self) -> SimulationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        SimulationId(format!("sim-{id:06}"))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<SimulationRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("simulation store lock poisoned".to_string()))
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.is_empty())
    }
}

impl SimulationRepository for InMemorySimulationRepository {
    fn save(&self, simulation: NewSimulation) -> Result<SimulationRecord, RepositoryError> {
        let record = simulation.into_record(self.next_id(), Utc::now());
        self.lock()?.push(record.clone());
        Ok(record)
    }

    fn list_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<SimulationRecord>, RepositoryError> {
        let guard = self.lock()?;
        // Newest insertions first so equal timestamps keep reverse insertion order.
        let mut records: Vec<SimulationRecord> = guard
            .iter()
            .rev()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        records.truncate(limit);
        Ok(records)
    }

    fn delete(&self, id: &SimulationId) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
