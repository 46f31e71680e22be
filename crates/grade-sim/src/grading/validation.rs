use super::domain::{EvaluationSet, MAX_SCORE, MIN_SCORE};

/// Reasons an evaluation set cannot be computed. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one evaluation is required")]
    EmptySet,
    #[error("the weight of evaluation {position} must be greater than 0 and at most 1 (got {weight})")]
    WeightOutOfRange { position: usize, weight: f64 },
    #[error("the score of evaluation {position} must be between 0 and 20 (got {score})")]
    ScoreOutOfRange { position: usize, score: f64 },
    #[error("every score must be filled in to compute the average ({missing} missing)")]
    IncompleteForAverage { missing: usize },
    #[error("leave exactly one score empty to compute the required score")]
    NoMissingScore,
    #[error("only one missing score can be solved at a time ({missing} are empty)")]
    MultipleMissingScores { missing: usize },
    #[error("the weights must add up to 1 (currently {total:.2})")]
    WeightSumInvalid { total: f64 },
    #[error("the passing threshold must be between 0 and 20 (got {threshold})")]
    ThresholdOutOfRange { threshold: f64 },
}

impl ValidationError {
    /// Stable machine-readable identifier for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::EmptySet => "empty_set",
            ValidationError::WeightOutOfRange { .. } => "weight_out_of_range",
            ValidationError::ScoreOutOfRange { .. } => "score_out_of_range",
            ValidationError::IncompleteForAverage { .. } => "incomplete_for_average",
            ValidationError::NoMissingScore => "no_missing_score",
            ValidationError::MultipleMissingScores { .. } => "multiple_missing_scores",
            ValidationError::WeightSumInvalid { .. } => "weight_sum_invalid",
            ValidationError::ThresholdOutOfRange { .. } => "threshold_out_of_range",
        }
    }
}

/// Checks shared by every computation: non-empty, weights in (0, 1], present scores in [0, 20].
pub(crate) fn check_items(set: &EvaluationSet) -> Result<(), ValidationError> {
    if set.is_empty() {
        return Err(ValidationError::EmptySet);
    }

    // NaN fails both range checks below.
    for (index, item) in set.iter().enumerate() {
        if !(item.weight > 0.0 && item.weight <= 1.0) {
            return Err(ValidationError::WeightOutOfRange {
                position: index + 1,
                weight: item.weight,
            });
        }
    }

    for (index, item) in set.iter().enumerate() {
        if let Some(score) = item.score {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(ValidationError::ScoreOutOfRange {
                    position: index + 1,
                    score,
                });
            }
        }
    }

    Ok(())
}

pub(crate) fn check_complete(set: &EvaluationSet) -> Result<(), ValidationError> {
    match set.pending_count() {
        0 => Ok(()),
        missing => Err(ValidationError::IncompleteForAverage { missing }),
    }
}

pub(crate) fn check_single_pending(set: &EvaluationSet) -> Result<(), ValidationError> {
    match set.pending_count() {
        0 => Err(ValidationError::NoMissingScore),
        1 => Ok(()),
        missing => Err(ValidationError::MultipleMissingScores { missing }),
    }
}

pub(crate) fn check_weight_sum(set: &EvaluationSet, tolerance: f64) -> Result<(), ValidationError> {
    let total = weight_sum(set);
    if (total - 1.0).abs() > tolerance {
        return Err(ValidationError::WeightSumInvalid { total });
    }
    Ok(())
}

pub(crate) fn check_threshold(threshold: f64) -> Result<(), ValidationError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&threshold) {
        return Err(ValidationError::ThresholdOutOfRange { threshold });
    }
    Ok(())
}

/// Sum of every weight in the set, graded or not.
pub fn weight_sum(set: &EvaluationSet) -> f64 {
    set.iter().map(|item| item.weight).sum()
}

/// Whether the weights form a complete scheme (sum within `tolerance` of 1).
pub fn has_complete_weighting(set: &EvaluationSet, tolerance: f64) -> bool {
    (weight_sum(set) - 1.0).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::domain::{EvaluationItem, WEIGHT_SUM_TOLERANCE};

    #[test]
    fn weights_are_checked_before_scores() {
        let set = EvaluationSet::new(vec![
            EvaluationItem::graded(25.0, 0.5),
            EvaluationItem::graded(10.0, 1.5),
        ]);
        assert_eq!(
            check_items(&set),
            Err(ValidationError::WeightOutOfRange {
                position: 2,
                weight: 1.5
            })
        );
    }

    #[test]
    fn nan_weight_is_out_of_range() {
        let set = EvaluationSet::new(vec![EvaluationItem::graded(10.0, f64::NAN)]);
        assert!(matches!(
            check_items(&set),
            Err(ValidationError::WeightOutOfRange { position: 1, .. })
        ));
    }

    #[test]
    fn weight_sum_respects_tolerance() {
        let set = EvaluationSet::new(vec![
            EvaluationItem::graded(10.0, 0.5),
            EvaluationItem::pending(0.495),
        ]);
        assert!(has_complete_weighting(&set, WEIGHT_SUM_TOLERANCE + 1e-9));
        assert!(check_weight_sum(&set, 0.001).is_err());
    }

    #[test]
    fn error_messages_are_human_readable() {
        let error = ValidationError::WeightSumInvalid { total: 0.5 };
        assert_eq!(
            error.to_string(),
            "the weights must add up to 1 (currently 0.50)"
        );
        assert_eq!(error.kind(), "weight_sum_invalid");
    }
}
