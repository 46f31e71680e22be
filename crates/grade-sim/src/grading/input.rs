//! Conversion from user-entered strings (form fields, CLI arguments, CSV rows) into an
//! [`EvaluationSet`]. Parse failures are reported here, before the engine validates ranges.

use super::domain::{EvaluationItem, EvaluationSet};
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

/// How an entered score is recognised as "not graded yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingScorePolicy {
    /// Only a blank field marks a pending evaluation.
    #[default]
    BlankOnly,
    /// Blank fields and negative scores both mark a pending evaluation.
    NegativeSentinel,
}

/// Evaluation row exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvaluation {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub score: Option<String>,
    pub weight: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub label: Option<String>,
}

impl RawEvaluation {
    pub fn new(score: impl Into<String>, weight: impl Into<String>) -> Self {
        Self {
            score: Some(score.into()),
            weight: weight.into(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Score,
    Weight,
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputField::Score => write!(f, "score"),
            InputField::Weight => write!(f, "weight"),
        }
    }
}

/// Input that could not be turned into numbers. Positions are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("the weight of evaluation {position} is required")]
    WeightRequired { position: usize },
    #[error("the {field} of evaluation {position} must be a valid number (got '{value}')")]
    InvalidNumber {
        position: usize,
        field: InputField,
        value: String,
    },
    #[error("expected 'score:weight' but got '{0}'")]
    MalformedPair(String),
    #[error("invalid evaluation CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parses every raw row, applying `policy` to decide which scores are pending.
pub fn parse_evaluations(
    raw: &[RawEvaluation],
    policy: MissingScorePolicy,
) -> Result<EvaluationSet, InputError> {
    raw.iter()
        .enumerate()
        .map(|(index, row)| parse_row(index + 1, row, policy))
        .collect::<Result<Vec<_>, _>>()
        .map(EvaluationSet::new)
}

fn parse_row(
    position: usize,
    row: &RawEvaluation,
    policy: MissingScorePolicy,
) -> Result<EvaluationItem, InputError> {
    let weight = match row.weight.trim() {
        "" => return Err(InputError::WeightRequired { position }),
        value => parse_number(value).ok_or_else(|| InputError::InvalidNumber {
            position,
            field: InputField::Weight,
            value: value.to_string(),
        })?,
    };

    let score = match row.score.as_deref().map(str::trim) {
        None | Some("") | Some("_") => None,
        Some(value) => {
            let score = parse_number(value).ok_or_else(|| InputError::InvalidNumber {
                position,
                field: InputField::Score,
                value: value.to_string(),
            })?;
            match policy {
                MissingScorePolicy::NegativeSentinel if score < 0.0 => None,
                _ => Some(score),
            }
        }
    };

    Ok(EvaluationItem {
        score,
        weight,
        label: row
            .label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string),
    })
}

fn parse_number(value: &str) -> Option<f64> {
    let normalized = value.replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Parses a `score:weight` pair; `_` or an empty score marks the evaluation as pending.
pub fn parse_pair(raw: &str) -> Result<RawEvaluation, InputError> {
    let (score, weight) = raw
        .split_once(':')
        .ok_or_else(|| InputError::MalformedPair(raw.to_string()))?;
    if weight.trim().is_empty() && score.trim().is_empty() {
        return Err(InputError::MalformedPair(raw.to_string()));
    }

    Ok(RawEvaluation {
        score: Some(score.trim().to_string()),
        weight: weight.trim().to_string(),
        label: None,
    })
}

/// Reads rows with `label`, `score` and `weight` headers; a blank score is pending.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawEvaluation>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawEvaluation>() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Two-decimal rendering used by text front ends; missing values render as `0.00`.
pub fn format_score(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.2}"),
        _ => "0.00".to_string(),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn blank_scores_become_pending() {
        let raw = vec![
            RawEvaluation::new("14", "0.6"),
            RawEvaluation::new("  ", "0.4"),
        ];
        let set = parse_evaluations(&raw, MissingScorePolicy::BlankOnly).expect("parses");
        assert_eq!(set.items()[0].score, Some(14.0));
        assert_eq!(set.items()[1].score, None);
    }

    #[test]
    fn negative_sentinel_is_opt_in() {
        let raw = vec![RawEvaluation::new("-1", "0.4")];

        let strict = parse_evaluations(&raw, MissingScorePolicy::BlankOnly).expect("parses");
        assert_eq!(strict.items()[0].score, Some(-1.0));

        let legacy =
            parse_evaluations(&raw, MissingScorePolicy::NegativeSentinel).expect("parses");
        assert_eq!(legacy.items()[0].score, None);
    }

    #[test]
    fn decimal_comma_is_accepted() {
        let raw = vec![RawEvaluation::new("12,5", "0,3")];
        let set = parse_evaluations(&raw, MissingScorePolicy::BlankOnly).expect("parses");
        assert_eq!(set.items()[0].score, Some(12.5));
        assert_eq!(set.items()[0].weight, 0.3);
    }

    #[test]
    fn unparsable_values_report_position_and_field() {
        let raw = vec![
            RawEvaluation::new("12", "0.5"),
            RawEvaluation::new("abc", "0.5"),
        ];
        match parse_evaluations(&raw, MissingScorePolicy::BlankOnly) {
            Err(InputError::InvalidNumber {
                position: 2,
                field: InputField::Score,
                value,
            }) => assert_eq!(value, "abc"),
            other => panic!("expected invalid score, got {other:?}"),
        }

        let missing_weight = vec![RawEvaluation::new("12", "")];
        assert!(matches!(
            parse_evaluations(&missing_weight, MissingScorePolicy::BlankOnly),
            Err(InputError::WeightRequired { position: 1 })
        ));
    }

    #[test]
    fn pairs_use_underscore_for_pending() {
        let pending = parse_pair("_:0.4").expect("pair parses");
        let set = parse_evaluations(&[pending], MissingScorePolicy::BlankOnly).expect("parses");
        assert!(set.items()[0].is_pending());

        assert!(matches!(
            parse_pair("12"),
            Err(InputError::MalformedPair(value)) if value == "12"
        ));
    }

    #[test]
    fn csv_rows_keep_labels() {
        let data = "label,score,weight\nMidterm,14,0.4\nFinal,,0.6\n";
        let rows = read_csv(Cursor::new(data)).expect("csv parses");
        let set = parse_evaluations(&rows, MissingScorePolicy::BlankOnly).expect("parses");

        assert_eq!(set.len(), 2);
        assert_eq!(set.items()[0].label.as_deref(), Some("Midterm"));
        assert!(set.items()[1].is_pending());
    }

    #[test]
    fn format_score_pads_to_two_decimals() {
        assert_eq!(format_score(Some(11.25)), "11.25");
        assert_eq!(format_score(Some(15.0)), "15.00");
        assert_eq!(format_score(None), "0.00");
        assert_eq!(format_score(Some(f64::NAN)), "0.00");
    }
}
