use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{StudentId, StudentRecord, SubjectResult};
use crate::grading::parse_score;

/// End-of-term results read from a `student_id,student_name,subject_code,eot_score` sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSheet {
    rows: Vec<ScoreSheetRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheetRow {
    pub student_id: StudentId,
    pub student_name: String,
    pub subject_code: String,
    /// `None` for blank or non-numeric cells.
    pub end_of_term_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    student_id: String,
    #[serde(default)]
    student_name: String,
    subject_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    eot_score: Option<String>,
}

impl ScoreSheet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoreImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScoreImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rows = Vec::new();

        for (index, record) in csv_reader.deserialize::<RawRow>().enumerate() {
            let raw = record?;
            // header is line 1
            let line = index + 2;
            if raw.student_id.is_empty() {
                return Err(ScoreImportError::MissingStudentId { line });
            }
            if raw.subject_code.is_empty() {
                return Err(ScoreImportError::MissingSubject { line });
            }

            rows.push(ScoreSheetRow {
                student_id: StudentId(raw.student_id),
                student_name: raw.student_name,
                subject_code: raw.subject_code,
                end_of_term_score: raw.eot_score.as_deref().and_then(parse_score),
            });
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ScoreSheetRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Students in order of first appearance. The first non-blank name seen for an id wins.
    pub fn students(&self) -> Vec<StudentRecord> {
        let mut students: Vec<StudentRecord> = Vec::new();
        for row in &self.rows {
            match students.iter_mut().find(|student| student.id == row.student_id) {
                Some(student) => {
                    if student.name.is_empty() {
                        student.name = row.student_name.clone();
                    }
                }
                None => students.push(StudentRecord {
                    id: row.student_id.clone(),
                    name: row.student_name.clone(),
                }),
            }
        }
        students
    }

    pub fn results_for(&self, student: &StudentId) -> Vec<SubjectResult> {
        self.rows
            .iter()
            .filter(|row| &row.student_id == student)
            .map(|row| SubjectResult::new(row.subject_code.clone(), row.end_of_term_score))
            .collect()
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreImportError {
    #[error("failed to read score sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid score sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("row on line {line} has no student_id")]
    MissingStudentId { line: usize },
    #[error("row on line {line} has no subject_code")]
    MissingSubject { line: usize },
}
