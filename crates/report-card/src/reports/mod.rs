//! Report card assembly over stored batches, plus the HTTP surface for the grading engine.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
mod text;

#[cfg(test)]
mod tests;

pub use domain::{
    BatchId, ManualRemarks, ReportBatch, StudentId, StudentRecord, StudentReport, SubjectLine,
    SubjectResult,
};
pub use import::{ScoreImportError, ScoreSheet, ScoreSheetRow};
pub use repository::{ClassRoster, PolicyRepository, RepositoryError, ScoreRepository};
pub use router::{grading_router, report_router};
pub use service::{ReportCardService, ReportServiceError};
pub use text::render_plain_text;
