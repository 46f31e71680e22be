use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grading::{Average, EvaluationSet, RequiredScore};

/// Owner of a simulation, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// Uses the supplied id when it is non-blank, the anonymous owner otherwise.
    pub fn or_anonymous(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() => Self(value.to_string()),
            _ => Self::anonymous(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned by the store when a simulation is saved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationId(pub String);

impl std::fmt::Display for SimulationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Simulation payload before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSimulation {
    pub evaluations: EvaluationSet,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub required_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passing_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
    pub user_id: UserId,
}

impl NewSimulation {
    pub fn from_average(evaluations: EvaluationSet, average: &Average, user_id: UserId) -> Self {
        Self {
            evaluations,
            average: Some(average.display()),
            required_score: None,
            passing_threshold: None,
            reachable: None,
            user_id,
        }
    }

    pub fn from_required_score(
        evaluations: EvaluationSet,
        required: &RequiredScore,
        user_id: UserId,
    ) -> Self {
        Self {
            evaluations,
            average: None,
            required_score: Some(required.display()),
            passing_threshold: Some(required.passing_threshold),
            reachable: Some(required.reachable),
            user_id,
        }
    }

    /// Attaches the store-assigned id and creation time.
    pub fn into_record(self, id: SimulationId, created_at: DateTime<Utc>) -> SimulationRecord {
        SimulationRecord {
            id,
            evaluations: self.evaluations,
            average: self.average,
            required_score: self.required_score,
            passing_threshold: self.passing_threshold,
            reachable: self.reachable,
            user_id: self.user_id,
            created_at,
        }
    }
}

/// Persisted computation tied to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub id: SimulationId,
    pub evaluations: EvaluationSet,
    pub average: Option<f64>,
    pub required_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passing_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
