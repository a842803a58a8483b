use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::bands::GradeBandTable;
use super::format_number;

/// Display sentinel for "nothing to compute" (no score recorded, no rank computed).
pub const NOT_GRADED: &str = "-";
/// Display sentinel for "inputs present but outside the configured bands".
pub const NOT_AVAILABLE: &str = "N/A";
pub const OUT_OF_RANGE_COMMENT: &str = "Score out of range";

/// Outcome of resolving one score against a band table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Classification {
    /// No usable score, or the policy has no bands.
    #[default]
    Unclassified,
    /// A score was given but no band covers it.
    OutOfRange,
    Computed {
        grade: String,
        points: Option<f64>,
        comment: String,
    },
}

impl Classification {
    pub fn is_computed(&self) -> bool {
        matches!(self, Classification::Computed { .. })
    }

    /// Numeric points, available only for a matched band that defines them.
    pub fn points(&self) -> Option<f64> {
        match self {
            Classification::Computed { points, .. } => *points,
            _ => None,
        }
    }

    pub fn grade_label(&self) -> &str {
        match self {
            Classification::Unclassified => NOT_GRADED,
            Classification::OutOfRange => NOT_AVAILABLE,
            Classification::Computed { grade, .. } => grade,
        }
    }

    pub fn points_label(&self) -> String {
        match self {
            Classification::Unclassified => NOT_GRADED.to_string(),
            Classification::OutOfRange => NOT_AVAILABLE.to_string(),
            Classification::Computed { points, .. } => points
                .map(format_number)
                .unwrap_or_else(|| NOT_GRADED.to_string()),
        }
    }

    pub fn comment_label(&self) -> &str {
        match self {
            Classification::Unclassified => NOT_AVAILABLE,
            Classification::OutOfRange => OUT_OF_RANGE_COMMENT,
            Classification::Computed { comment, .. } => comment,
        }
    }

    pub fn view(&self) -> ClassificationView {
        ClassificationView {
            grade: self.grade_label().to_string(),
            points: self.points_label(),
            comment: self.comment_label().to_string(),
        }
    }
}

/// Flattened form of a [`Classification`] for report rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationView {
    pub grade: String,
    pub points: String,
    pub comment: String,
}

/// Resolves a score against `bands`, honouring the table order (first match wins).
pub fn classify(score: Option<f64>, bands: &GradeBandTable) -> Classification {
    let score = match score {
        Some(value) if value.is_finite() => value,
        _ => return Classification::Unclassified,
    };

    if bands.is_empty() {
        return Classification::Unclassified;
    }

    match bands.first_match(score) {
        Some(band) => Classification::Computed {
            grade: band.grade_label.clone(),
            points: band.points,
            comment: band.comment.clone(),
        },
        None => Classification::OutOfRange,
    }
}

/// Converts stored score text to the numeric-or-absent form [`classify`] accepts.
pub fn parse_score(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Reads a score that may arrive as a number, numeric text, `null`, or junk. Anything that is
/// not a finite number becomes `None` instead of failing the whole payload.
pub fn score_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|value| value.is_finite()),
        Value::String(raw) => parse_score(raw),
        _ => None,
    }
}

pub(crate) fn deserialize_lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_from_value))
}
