use super::domain::{EvaluationSet, MAX_SCORE};

/// Partial sums over the set, split between graded and pending items.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct WeightedTotals {
    pub(crate) known_weighted_sum: f64,
    pub(crate) known_weight: f64,
    pub(crate) pending_weight: f64,
}

impl WeightedTotals {
    pub(crate) fn of(set: &EvaluationSet) -> Self {
        set.iter().fold(Self::default(), |mut totals, item| {
            match item.score {
                Some(score) => {
                    totals.known_weighted_sum += score * item.weight;
                    totals.known_weight += item.weight;
                }
                None => totals.pending_weight += item.weight,
            }
            totals
        })
    }

    pub(crate) fn total_weight(&self) -> f64 {
        self.known_weight + self.pending_weight
    }

    pub(crate) fn known_average(&self) -> Option<f64> {
        (self.known_weight > 0.0).then(|| self.known_weighted_sum / self.known_weight)
    }

    /// Score the pending weight must carry for the overall result to equal `threshold`.
    pub(crate) fn required_for(&self, threshold: f64) -> f64 {
        (threshold * self.total_weight() - self.known_weighted_sum) / self.pending_weight
    }
}

/// A negative requirement means the target is already met, so only the upper bound matters.
pub(crate) fn is_reachable(required: f64) -> bool {
    required <= MAX_SCORE
}
