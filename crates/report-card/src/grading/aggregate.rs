use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::bands::GradeBandTable;
use super::classifier::{
    classify, deserialize_lenient_score, Classification, NOT_AVAILABLE, NOT_GRADED,
};
use super::format_number;
use super::tier::GradeTier;

const INCOMPLETE_CORE_COMMENT: &str =
    "Incomplete results for core subjects. Division cannot be determined.";

/// One subject's end-of-term outcome for a student in a reporting batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject_code: String,
    /// `None` means the subject has not been graded yet.
    #[serde(default, deserialize_with = "deserialize_lenient_score")]
    pub end_of_term_score: Option<f64>,
}

impl SubjectScore {
    pub fn new(subject_code: impl Into<String>, end_of_term_score: Option<f64>) -> Self {
        Self {
            subject_code: subject_code.into(),
            end_of_term_score,
        }
    }

    fn graded_value(&self) -> Option<f64> {
        self.end_of_term_score.filter(|value| value.is_finite())
    }
}

/// Upper-tier overall classification. `I` is best, `U` ungraded, `X` incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Division {
    I,
    II,
    III,
    IV,
    U,
    X,
    /// A label that did not come from this engine, e.g. a hand-edited cached summary.
    Unrecognized(String),
}

impl Division {
    /// Inclusive aggregate boundaries; anything outside the named ranges is `U`.
    pub fn from_aggregate(aggregate_points: i64) -> Self {
        match aggregate_points {
            4..=12 => Division::I,
            13..=23 => Division::II,
            24..=29 => Division::III,
            30..=34 => Division::IV,
            _ => Division::U,
        }
    }

    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "I" => Division::I,
            "II" => Division::II,
            "III" => Division::III,
            "IV" => Division::IV,
            "U" => Division::U,
            "X" => Division::X,
            _ => Division::Unrecognized(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Division::I => "I",
            Division::II => "II",
            Division::III => "III",
            Division::IV => "IV",
            Division::U => "U",
            Division::X => "X",
            Division::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Division {
    fn from(value: String) -> Self {
        Division::parse(&value)
    }
}

impl From<Division> for String {
    fn from(value: Division) -> Self {
        value.label().to_string()
    }
}

/// Average-based summary used by lower primary classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowerTierSummary {
    pub total_score: f64,
    /// Rounded to two decimals; `0` when nothing was graded.
    pub average_score: f64,
    #[serde(default)]
    pub graded_subjects: usize,
    /// Classification of the average, not of any single subject.
    #[serde(default)]
    pub overall: Classification,
    #[serde(default)]
    pub comment: String,
    /// Rank is not computed by the engine; stays `None` unless a caller supplies it.
    pub position_in_class: Option<u32>,
    pub class_size: Option<u32>,
}

impl LowerTierSummary {
    pub fn overall_grade(&self) -> &str {
        self.overall.grade_label()
    }

    pub fn position_label(&self) -> String {
        optional_count_label(self.position_in_class)
    }

    pub fn class_size_label(&self) -> String {
        optional_count_label(self.class_size)
    }
}

/// Aggregate/division summary used by upper primary and secondary classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpperTierSummary {
    /// Sum of truncated band points over graded core subjects. Lower is better.
    pub aggregate_points: i64,
    pub division: Division,
    #[serde(default)]
    pub graded_core_count: usize,
    #[serde(default)]
    pub core_subject_count: usize,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub class_size: Option<u32>,
}

impl UpperTierSummary {
    pub fn is_complete(&self) -> bool {
        self.graded_core_count >= self.core_subject_count
    }

    pub fn class_size_label(&self) -> String {
        optional_count_label(self.class_size)
    }
}

/// Overall outcome of a student in one reporting batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum OverallSummary {
    Lower(LowerTierSummary),
    Upper(UpperTierSummary),
}

impl OverallSummary {
    pub fn comment(&self) -> &str {
        match self {
            OverallSummary::Lower(summary) => &summary.comment,
            OverallSummary::Upper(summary) => &summary.comment,
        }
    }

    pub fn as_lower(&self) -> Option<&LowerTierSummary> {
        match self {
            OverallSummary::Lower(summary) => Some(summary),
            OverallSummary::Upper(_) => None,
        }
    }

    pub fn as_upper(&self) -> Option<&UpperTierSummary> {
        match self {
            OverallSummary::Upper(summary) => Some(summary),
            OverallSummary::Lower(_) => None,
        }
    }

    pub fn set_class_size(&mut self, class_size: Option<u32>) {
        match self {
            OverallSummary::Lower(summary) => summary.class_size = class_size,
            OverallSummary::Upper(summary) => summary.class_size = class_size,
        }
    }

    /// Label/value rows for the performance summary block of a report card.
    pub fn display_rows(&self, tier: GradeTier) -> Vec<SummaryRow> {
        match self {
            OverallSummary::Lower(summary) => vec![
                SummaryRow::new("Total Score (EOT)", format_number(summary.total_score)),
                SummaryRow::new(
                    "Average Score (EOT)",
                    format!("{:.2}%", summary.average_score),
                ),
                SummaryRow::new("Overall Grade", summary.overall_grade()),
                SummaryRow::new(
                    "Position in Class (EOT)",
                    format!(
                        "{} out of {}",
                        summary.position_label(),
                        summary.class_size_label()
                    ),
                ),
            ],
            OverallSummary::Upper(summary) => {
                let mut rows = vec![
                    SummaryRow::new(
                        "Aggregate Points (EOT)",
                        summary.aggregate_points.to_string(),
                    ),
                    SummaryRow::new("Division (EOT)", summary.division.label()),
                ];
                if tier == GradeTier::PrimaryUpper {
                    rows.push(SummaryRow::new(
                        "Total Students in Class",
                        summary.class_size_label(),
                    ));
                }
                rows
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

impl SummaryRow {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// Totals and averages every graded subject, then classifies the average.
pub fn aggregate_lower(scores: &[SubjectScore], bands: &GradeBandTable) -> LowerTierSummary {
    let graded: Vec<f64> = scores.iter().filter_map(SubjectScore::graded_value).collect();
    let total_score: f64 = graded.iter().sum();
    let average_score = if graded.is_empty() {
        0.0
    } else {
        round_2(total_score / graded.len() as f64)
    };

    let overall = classify(Some(average_score), bands);

    let mut comment = format!(
        "Overall performance: Total Score {}, Average {}%.",
        format_number(total_score),
        format_number(average_score)
    );
    let band_comment = overall.comment_label();
    if !band_comment.is_empty() && band_comment != NOT_AVAILABLE {
        comment.push(' ');
        comment.push_str(band_comment);
    }

    LowerTierSummary {
        total_score,
        average_score,
        graded_subjects: graded.len(),
        overall,
        comment,
        position_in_class: None,
        class_size: None,
    }
}

/// Sums band points over the core subjects and derives the division.
///
/// Subject codes are compared case-insensitively after trimming, and each core subject counts
/// once: the first row with gradable points wins and later duplicates are ignored. A core
/// subject without a numeric score, or whose band has no numeric points, does not count as
/// graded; when fewer distinct core subjects are graded than configured the division is forced
/// to [`Division::X`]. Points saturate instead of overflowing.
pub fn aggregate_upper<S: AsRef<str>>(
    scores: &[SubjectScore],
    bands: &GradeBandTable,
    core_subject_codes: &[S],
) -> UpperTierSummary {
    let core: BTreeSet<String> = core_subject_codes
        .iter()
        .map(|code| normalize_code(code.as_ref()))
        .collect();

    let mut aggregate_points: i64 = 0;
    let mut graded: BTreeSet<String> = BTreeSet::new();

    for score in scores {
        let Some(value) = score.graded_value() else {
            continue;
        };
        let code = normalize_code(&score.subject_code);
        if !core.contains(&code) || graded.contains(&code) {
            continue;
        }
        if let Some(points) = classify(Some(value), bands).points() {
            // `as` saturates at the i64 bounds
            aggregate_points = aggregate_points.saturating_add(points.trunc() as i64);
            graded.insert(code);
        }
    }

    let graded_core_count = graded.len();
    let core_subject_count = core.len();
    let (division, comment) = if graded_core_count < core_subject_count {
        (Division::X, INCOMPLETE_CORE_COMMENT.to_string())
    } else {
        let division = Division::from_aggregate(aggregate_points);
        let comment = format!(
            "Overall performance: Division {} with {} aggregates.",
            division, aggregate_points
        );
        (division, comment)
    };

    UpperTierSummary {
        aggregate_points,
        division,
        graded_core_count,
        core_subject_count,
        comment,
        class_size: None,
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn optional_count_label(value: Option<u32>) -> String {
    value
        .map(|count| count.to_string())
        .unwrap_or_else(|| NOT_GRADED.to_string())
}
