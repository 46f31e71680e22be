//! Weighted-average and required-score computations over a flat list of evaluations.
//!
//! Every function here is pure: the input set is borrowed read-only and the result is either a
//! value or a [`ValidationError`].

mod domain;
pub mod input;
mod rules;
mod validation;

pub use domain::{
    round_display, Average, ComputationMode, ComputationResult, EvaluationItem, EvaluationSet,
    RequiredScore, Verdict, DEFAULT_PASSING_THRESHOLD, MAX_SCORE, MIN_SCORE, WEIGHT_SUM_TOLERANCE,
};
pub use input::{InputError, MissingScorePolicy, RawEvaluation};
pub use validation::{has_complete_weighting, weight_sum, ValidationError};

use rules::{is_reachable, WeightedTotals};
use serde::{Deserialize, Serialize};

/// Tunables for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    pub passing_threshold: f64,
    pub weight_tolerance: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
            weight_tolerance: WEIGHT_SUM_TOLERANCE,
        }
    }
}

/// Stateless calculator applying a [`GradingConfig`] to evaluation sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradeEngine {
    config: GradingConfig,
}

impl GradeEngine {
    pub fn new(config: GradingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    pub fn average(&self, set: &EvaluationSet) -> Result<Average, ValidationError> {
        compute_average(set)
    }

    /// Solves for the pending score, falling back to the configured passing threshold.
    pub fn required_score(
        &self,
        set: &EvaluationSet,
        passing_threshold: Option<f64>,
    ) -> Result<RequiredScore, ValidationError> {
        let threshold = passing_threshold.unwrap_or(self.config.passing_threshold);
        required_score_with_tolerance(set, threshold, self.config.weight_tolerance)
    }

    pub fn compute(
        &self,
        set: &EvaluationSet,
        mode: ComputationMode,
    ) -> Result<ComputationResult, ValidationError> {
        match mode {
            ComputationMode::Average => self.average(set).map(Into::into),
            ComputationMode::RequiredScore { passing_threshold } => self
                .required_score(set, Some(passing_threshold))
                .map(Into::into),
        }
    }
}

/// Checks the invariants shared by every computation without computing anything.
pub fn validate(set: &EvaluationSet) -> Result<(), ValidationError> {
    validation::check_items(set)
}

/// Weighted mean of a fully graded set, divided by the weights actually present.
pub fn compute_average(set: &EvaluationSet) -> Result<Average, ValidationError> {
    validation::check_items(set)?;
    validation::check_complete(set)?;

    let totals = WeightedTotals::of(set);
    Ok(Average {
        value: totals.known_weighted_sum / totals.known_weight,
    })
}

/// Score needed on the single pending evaluation for the final grade to reach
/// `passing_threshold`. The weights must form a complete scheme.
pub fn compute_required_score(
    set: &EvaluationSet,
    passing_threshold: f64,
) -> Result<RequiredScore, ValidationError> {
    required_score_with_tolerance(set, passing_threshold, WEIGHT_SUM_TOLERANCE)
}

fn required_score_with_tolerance(
    set: &EvaluationSet,
    passing_threshold: f64,
    tolerance: f64,
) -> Result<RequiredScore, ValidationError> {
    validation::check_threshold(passing_threshold)?;
    validation::check_items(set)?;
    validation::check_single_pending(set)?;
    validation::check_weight_sum(set, tolerance)?;

    let totals = WeightedTotals::of(set);
    let value = totals.required_for(passing_threshold);

    Ok(RequiredScore {
        value,
        reachable: is_reachable(value),
        passing_threshold,
        pending_weight: totals.pending_weight,
        current_average: totals.known_average(),
    })
}
