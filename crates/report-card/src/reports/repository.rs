use super::domain::{BatchId, ManualRemarks, ReportBatch, StudentId, StudentRecord, SubjectResult};
use crate::grading::{GradingPolicy, PolicyId, SchoolId, SchoolType};

/// Read access to reporting batches and the results recorded against them.
pub trait ScoreRepository: Send + Sync {
    fn batch(&self, id: &BatchId) -> Result<Option<ReportBatch>, RepositoryError>;
    fn students(&self, batch: &BatchId) -> Result<Vec<StudentRecord>, RepositoryError>;
    fn student(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Option<StudentRecord>, RepositoryError>;
    fn results(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Vec<SubjectResult>, RepositoryError>;
    fn manual_remarks(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Option<ManualRemarks>, RepositoryError>;
}

/// Stored grading policies.
pub trait PolicyRepository: Send + Sync {
    fn policy(&self, id: &PolicyId) -> Result<Option<GradingPolicy>, RepositoryError>;
    /// The policy flagged as default for the school and the exact applicability given.
    fn default_policy(
        &self,
        school: &SchoolId,
        applicability: SchoolType,
    ) -> Result<Option<GradingPolicy>, RepositoryError>;
}

/// Class enrolment snapshot.
pub trait ClassRoster: Send + Sync {
    fn class_size(&self, batch: &BatchId) -> Result<Option<u32>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
