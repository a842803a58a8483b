use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::domain::{
    BatchId, ManualRemarks, ReportBatch, StudentId, StudentRecord, StudentReport, SubjectLine,
    SubjectResult,
};
use super::repository::{ClassRoster, PolicyRepository, RepositoryError, ScoreRepository};
use crate::grading::{
    GradeBandTable, GradingEngine, GradingPolicy, OverallSummary, RemarkVoice, SchoolType,
    SubjectScore, NOT_GRADED,
};

/// Assembles report cards from stored results, the applicable grading policy, and the
/// grading engine.
pub struct ReportCardService<S, P, R> {
    scores: Arc<S>,
    policies: Arc<P>,
    roster: Arc<R>,
    engine: Arc<GradingEngine>,
    default_school_name: Option<String>,
}

/// Batch-wide inputs shared by every student in the batch.
struct BatchContext {
    batch: ReportBatch,
    bands: GradeBandTable,
    class_size: Option<u32>,
}

impl<S, P, R> ReportCardService<S, P, R>
where
    S: ScoreRepository + 'static,
    P: PolicyRepository + 'static,
    R: ClassRoster + 'static,
{
    pub fn new(
        scores: Arc<S>,
        policies: Arc<P>,
        roster: Arc<R>,
        engine: Arc<GradingEngine>,
    ) -> Self {
        Self {
            scores,
            policies,
            roster,
            engine,
            default_school_name: None,
        }
    }

    /// School name used in remarks for batches that do not carry one.
    pub fn with_default_school_name(mut self, name: Option<String>) -> Self {
        self.default_school_name = name;
        self
    }

    pub fn engine(&self) -> &GradingEngine {
        &self.engine
    }

    /// Explicit batch policy first, then the school's default for its type, then a default
    /// applicable to any school type.
    pub fn resolve_policy(
        &self,
        batch: &ReportBatch,
    ) -> Result<Option<GradingPolicy>, ReportServiceError> {
        if let Some(policy_id) = &batch.policy_id {
            match self.policies.policy(policy_id)? {
                Some(policy) => return Ok(Some(policy)),
                None => warn!(
                    batch = %batch.id,
                    policy = %policy_id.0,
                    "batch references a missing grading policy; falling back to school default"
                ),
            }
        }

        if let Some(policy) = self
            .policies
            .default_policy(&batch.school_id, batch.school_type)?
        {
            return Ok(Some(policy));
        }
        if batch.school_type != SchoolType::Any {
            return Ok(self
                .policies
                .default_policy(&batch.school_id, SchoolType::Any)?);
        }
        Ok(None)
    }

    /// Bands used to grade the batch. Missing policies degrade to an empty table so every
    /// score classifies as ungraded instead of failing the report.
    pub fn band_table(&self, batch: &ReportBatch) -> Result<GradeBandTable, ReportServiceError> {
        match self.resolve_policy(batch)? {
            Some(policy) => {
                if policy.bands().is_empty() {
                    warn!(
                        batch = %batch.id,
                        policy = %policy.id.0,
                        "grading policy has no bands; grades and points will not be calculated"
                    );
                }
                Ok(policy.bands().clone())
            }
            None => {
                warn!(
                    batch = %batch.id,
                    school = %batch.school_id.0,
                    school_type = %batch.school_type.label(),
                    "no grading policy for batch and no school default; grades will not be calculated"
                );
                Ok(GradeBandTable::empty())
            }
        }
    }

    /// Report card for one student.
    pub fn student_report(
        &self,
        batch_id: &BatchId,
        student_id: &StudentId,
        today: NaiveDate,
    ) -> Result<StudentReport, ReportServiceError> {
        let context = self.batch_context(batch_id)?;
        let student = self
            .scores
            .student(batch_id, student_id)?
            .ok_or_else(|| ReportServiceError::StudentNotFound {
                batch: batch_id.clone(),
                student: student_id.clone(),
            })?;
        self.assemble(&context, &student, today)
    }

    /// Report cards for every student in the batch, in roster order. The policy and class size
    /// are read once for the whole batch.
    pub fn batch_reports(
        &self,
        batch_id: &BatchId,
        today: NaiveDate,
    ) -> Result<Vec<StudentReport>, ReportServiceError> {
        let context = self.batch_context(batch_id)?;
        let students = self.scores.students(batch_id)?;
        debug!(batch = %batch_id, students = students.len(), "assembling batch report cards");

        students
            .iter()
            .map(|student| self.assemble(&context, student, today))
            .collect()
    }

    fn batch_context(&self, batch_id: &BatchId) -> Result<BatchContext, ReportServiceError> {
        let batch = self
            .scores
            .batch(batch_id)?
            .ok_or_else(|| ReportServiceError::BatchNotFound(batch_id.clone()))?;
        let bands = self.band_table(&batch)?;
        let class_size = self.roster.class_size(batch_id)?;

        Ok(BatchContext {
            batch,
            bands,
            class_size,
        })
    }

    fn assemble(
        &self,
        context: &BatchContext,
        student: &StudentRecord,
        today: NaiveDate,
    ) -> Result<StudentReport, ReportServiceError> {
        let batch = &context.batch;
        let tier = batch.tier();
        let results = self.scores.results(&batch.id, &student.id)?;
        let manual = self
            .scores
            .manual_remarks(&batch.id, &student.id)?
            .unwrap_or_default();

        let subjects: Vec<SubjectLine> = results
            .iter()
            .map(|result| self.subject_line(result, &context.bands))
            .collect();

        let summary = if results.is_empty() {
            None
        } else {
            let scores: Vec<SubjectScore> = results.iter().map(SubjectResult::score).collect();
            let mut summary = self.engine.summarize(tier, &scores, &context.bands);
            summary.set_class_size(context.class_size);
            debug!(
                batch = %batch.id,
                student = %student.id,
                tier = %tier,
                comment = summary.comment(),
                "summarized student results"
            );
            Some(summary)
        };

        let summary_rows = summary
            .as_ref()
            .map(|summary| summary.display_rows(tier))
            .unwrap_or_default();

        let school = [Some(batch.school_name.as_str()), self.default_school_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty());
        let (class_teacher_remark, head_teacher_remark) =
            self.remarks(&manual, summary.as_ref(), student, batch, school);

        Ok(StudentReport {
            batch_id: batch.id.clone(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            school_name: batch.school_name.clone(),
            class_name: batch.class_name.clone(),
            term: batch.term_label(),
            tier,
            subjects,
            summary,
            summary_rows,
            class_teacher_remark,
            head_teacher_remark,
            generated_on: today,
            term_end_date: batch.term_end_date,
            next_term_begin_date: batch.next_term_begin_date,
        })
    }

    fn subject_line(&self, result: &SubjectResult, bands: &GradeBandTable) -> SubjectLine {
        let classification = self.engine.classify(result.end_of_term_score, bands);
        let view = classification.view();
        let comment = result
            .remark
            .as_deref()
            .map(str::trim)
            .filter(|remark| !remark.is_empty())
            .map(str::to_string)
            .unwrap_or(view.comment);

        SubjectLine {
            subject_code: result.subject_code.clone(),
            subject_name: result.display_name().to_string(),
            score: result.end_of_term_score,
            classification,
            grade: view.grade,
            points: view.points,
            comment,
            teacher_initials: result
                .teacher_initials
                .clone()
                .unwrap_or_else(|| NOT_GRADED.to_string()),
        }
    }

    fn remarks(
        &self,
        manual: &ManualRemarks,
        summary: Option<&OverallSummary>,
        student: &StudentRecord,
        batch: &ReportBatch,
        school: Option<&str>,
    ) -> (String, String) {
        let tier = batch.tier();
        let pick = |manual: &Option<String>, voice: RemarkVoice| {
            manual
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    self.engine
                        .remark(voice, summary, &student.name, tier, school)
                })
        };

        (
            pick(&manual.class_teacher, RemarkVoice::ClassTeacher),
            pick(&manual.head_teacher, RemarkVoice::HeadTeacher),
        )
    }
}

/// Error raised by the report card service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error("report batch {0} not found")]
    BatchNotFound(BatchId),
    #[error("student {student} is not part of report batch {batch}")]
    StudentNotFound { batch: BatchId, student: StudentId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
