use serde::{Deserialize, Serialize};

/// Lowest score an evaluation can receive.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score an evaluation can receive.
pub const MAX_SCORE: f64 = 20.0;
/// Target average used when the caller does not provide one.
pub const DEFAULT_PASSING_THRESHOLD: f64 = 10.5;
/// Allowed distance between the total weight and 1.0 for a complete weighting scheme.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// One graded or pending component of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationItem {
    /// Points earned; `None` while the evaluation has not been graded.
    #[serde(default)]
    pub score: Option<f64>,
    /// Fractional contribution to the final grade.
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EvaluationItem {
    pub fn graded(score: f64, weight: f64) -> Self {
        Self {
            score: Some(score),
            weight,
            label: None,
        }
    }

    pub fn pending(weight: f64) -> Self {
        Self {
            score: None,
            weight,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_pending(&self) -> bool {
        self.score.is_none()
    }
}

/// Ordered list of evaluation items submitted for a single computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationSet {
    items: Vec<EvaluationItem>,
}

impl EvaluationSet {
    pub fn new(items: Vec<EvaluationItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[EvaluationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvaluationItem> {
        self.items.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_pending()).count()
    }

    pub fn into_items(self) -> Vec<EvaluationItem> {
        self.items
    }
}

impl From<Vec<EvaluationItem>> for EvaluationSet {
    fn from(items: Vec<EvaluationItem>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<EvaluationItem> for EvaluationSet {
    fn from_iter<T: IntoIterator<Item = EvaluationItem>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EvaluationSet {
    type Item = &'a EvaluationItem;
    type IntoIter = std::slice::Iter<'a, EvaluationItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Weighted mean of a fully graded set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Average {
    pub value: f64,
}

impl Average {
    pub fn display(&self) -> f64 {
        round_display(self.value)
    }
}

/// How the required score relates to the valid scoring range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The graded items alone already meet the threshold.
    AlreadyExceeded,
    Reachable,
    Unreachable,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::AlreadyExceeded => "already_exceeded",
            Verdict::Reachable => "reachable",
            Verdict::Unreachable => "unreachable",
        }
    }
}

/// Score still needed on the single pending evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequiredScore {
    /// Unrounded requirement; negative or above the maximum values are kept as-is.
    pub value: f64,
    pub reachable: bool,
    pub passing_threshold: f64,
    pub pending_weight: f64,
    /// Weighted mean of the graded items, absent when nothing has been graded yet.
    pub current_average: Option<f64>,
}

impl RequiredScore {
    pub fn display(&self) -> f64 {
        round_display(self.value)
    }

    pub fn verdict(&self) -> Verdict {
        if self.value < MIN_SCORE {
            Verdict::AlreadyExceeded
        } else if self.reachable {
            Verdict::Reachable
        } else {
            Verdict::Unreachable
        }
    }

    pub fn message(&self) -> String {
        match self.verdict() {
            Verdict::AlreadyExceeded => format!(
                "the passing threshold of {:.2} is already met",
                self.passing_threshold
            ),
            Verdict::Reachable => format!(
                "you need {:.2} on the pending evaluation to reach {:.2}",
                self.display(),
                self.passing_threshold
            ),
            Verdict::Unreachable => format!(
                "a score of {:.2} would be needed, above the maximum of {:.0}",
                self.display(),
                MAX_SCORE
            ),
        }
    }
}

/// Which quantity the caller wants computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComputationMode {
    Average,
    RequiredScore { passing_threshold: f64 },
}

/// Output of a single engine call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComputationResult {
    Average { value: f64 },
    RequiredScore { value: f64, reachable: bool },
}

impl ComputationResult {
    pub fn value(&self) -> f64 {
        match self {
            ComputationResult::Average { value } => *value,
            ComputationResult::RequiredScore { value, .. } => *value,
        }
    }

    pub fn display(&self) -> f64 {
        round_display(self.value())
    }
}

impl From<Average> for ComputationResult {
    fn from(average: Average) -> Self {
        ComputationResult::Average {
            value: average.value,
        }
    }
}

impl From<RequiredScore> for ComputationResult {
    fn from(required: RequiredScore) -> Self {
        ComputationResult::RequiredScore {
            value: required.value,
            reachable: required.reachable,
        }
    }
}

/// Rounds half away from zero to two decimals for presentation.
pub fn round_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_display_rounds_half_away_from_zero() {
        assert_eq!(round_display(2.5), 2.5);
        assert_eq!(round_display(1.125), 1.13);
        assert_eq!(round_display(-0.125), -0.13);
        assert_eq!(round_display(20.001), 20.0);
    }

    #[test]
    fn verdict_distinguishes_exceeded_targets() {
        let required = RequiredScore {
            value: -7.0,
            reachable: true,
            passing_threshold: 10.5,
            pending_weight: 0.3,
            current_average: Some(18.0),
        };
        assert_eq!(required.verdict(), Verdict::AlreadyExceeded);
        assert!(required.message().contains("already met"));
    }

    #[test]
    fn evaluation_set_deserializes_null_scores_as_pending() {
        let raw = r#"[{"score":10,"weight":0.6},{"score":null,"weight":0.4},{"weight":0.1}]"#;
        let set: EvaluationSet = serde_json::from_str(raw).expect("set parses");
        assert_eq!(set.len(), 3);
        assert_eq!(set.pending_count(), 2);
    }
}
