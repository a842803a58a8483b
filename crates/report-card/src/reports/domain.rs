use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grading::{
    Classification, GradeTier, OverallSummary, PolicyId, SchoolId, SchoolType, SubjectScore,
    SummaryRow, NOT_GRADED,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One class's reporting run for a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBatch {
    pub id: BatchId,
    pub school_id: SchoolId,
    pub school_name: String,
    pub school_type: SchoolType,
    pub class_name: String,
    /// Free-form group such as `primary_lower` or `primary_upper`; decides the summary tier.
    pub class_level_group: String,
    pub term_name: String,
    pub year_name: String,
    /// Explicit policy for the batch. Without one the school's default policy applies.
    #[serde(default)]
    pub policy_id: Option<PolicyId>,
    #[serde(default)]
    pub term_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_term_begin_date: Option<NaiveDate>,
}

impl ReportBatch {
    pub fn tier(&self) -> GradeTier {
        GradeTier::from_class_level_group(&self.class_level_group)
    }

    pub fn term_label(&self) -> String {
        format!("{} {}", self.term_name, self.year_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
}

/// A stored subject result for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub subject_code: String,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub end_of_term_score: Option<f64>,
    /// Teacher-entered remark; replaces the band comment on the report line.
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub teacher_initials: Option<String>,
}

impl SubjectResult {
    pub fn new(subject_code: impl Into<String>, end_of_term_score: Option<f64>) -> Self {
        Self {
            subject_code: subject_code.into(),
            subject_name: None,
            end_of_term_score,
            remark: None,
            teacher_initials: None,
        }
    }

    pub fn score(&self) -> SubjectScore {
        SubjectScore::new(self.subject_code.clone(), self.end_of_term_score)
    }

    pub fn display_name(&self) -> &str {
        self.subject_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.subject_code)
    }
}

/// Remarks typed in by staff. When present they replace the generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRemarks {
    #[serde(default)]
    pub class_teacher: Option<String>,
    #[serde(default)]
    pub head_teacher: Option<String>,
}

/// One row of the subject table on a report card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectLine {
    pub subject_code: String,
    pub subject_name: String,
    pub score: Option<f64>,
    pub classification: Classification,
    pub grade: String,
    pub points: String,
    pub comment: String,
    pub teacher_initials: String,
}

impl SubjectLine {
    pub fn score_label(&self) -> String {
        self.score
            .map(crate::grading::format_number)
            .unwrap_or_else(|| NOT_GRADED.to_string())
    }
}

/// Fully assembled report card for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub batch_id: BatchId,
    pub student_id: StudentId,
    pub student_name: String,
    pub school_name: String,
    pub class_name: String,
    pub term: String,
    pub tier: GradeTier,
    pub subjects: Vec<SubjectLine>,
    /// `None` when the student has no subject results in the batch.
    pub summary: Option<OverallSummary>,
    pub summary_rows: Vec<SummaryRow>,
    pub class_teacher_remark: String,
    pub head_teacher_remark: String,
    pub generated_on: NaiveDate,
    pub term_end_date: Option<NaiveDate>,
    pub next_term_begin_date: Option<NaiveDate>,
}

impl StudentReport {
    pub fn has_results(&self) -> bool {
        !self.subjects.is_empty()
    }
}
