use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use report_card::grading::{GradingPolicy, PolicyId, SchoolId, SchoolType};
use report_card::reports::{
    BatchId, ClassRoster, ManualRemarks, PolicyRepository, ReportBatch, RepositoryError,
    ScoreRepository, ScoreSheet, StudentId, StudentRecord, SubjectResult,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type StudentKey = (BatchId, StudentId);

fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryScoreRepository {
    batches: Arc<Mutex<HashMap<BatchId, ReportBatch>>>,
    students: Arc<Mutex<HashMap<BatchId, Vec<StudentRecord>>>>,
    results: Arc<Mutex<HashMap<StudentKey, Vec<SubjectResult>>>>,
    remarks: Arc<Mutex<HashMap<StudentKey, ManualRemarks>>>,
}

impl InMemoryScoreRepository {
    /// Stores the batch and every student on the sheet, replacing earlier data for the batch.
    pub(crate) fn load_sheet(
        &self,
        batch: ReportBatch,
        sheet: &ScoreSheet,
    ) -> Result<usize, RepositoryError> {
        let students = sheet.students();
        let mut results = guard(&self.results)?;
        results.retain(|(batch_id, _), _| batch_id != &batch.id);
        for student in &students {
            results.insert(
                (batch.id.clone(), student.id.clone()),
                sheet.results_for(&student.id),
            );
        }
        let count = students.len();
        guard(&self.students)?.insert(batch.id.clone(), students);
        guard(&self.batches)?.insert(batch.id.clone(), batch);
        Ok(count)
    }

    pub(crate) fn set_remarks(
        &self,
        batch: &BatchId,
        student: &StudentId,
        remarks: ManualRemarks,
    ) -> Result<(), RepositoryError> {
        guard(&self.remarks)?.insert((batch.clone(), student.clone()), remarks);
        Ok(())
    }
}

impl ScoreRepository for InMemoryScoreRepository {
    fn batch(&self, id: &BatchId) -> Result<Option<ReportBatch>, RepositoryError> {
        Ok(guard(&self.batches)?.get(id).cloned())
    }

    fn students(&self, batch: &BatchId) -> Result<Vec<StudentRecord>, RepositoryError> {
        Ok(guard(&self.students)?
            .get(batch)
            .cloned()
            .unwrap_or_default())
    }

    fn student(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        Ok(guard(&self.students)?
            .get(batch)
            .and_then(|students| students.iter().find(|record| &record.id == student))
            .cloned())
    }

    fn results(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Vec<SubjectResult>, RepositoryError> {
        Ok(guard(&self.results)?
            .get(&(batch.clone(), student.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn manual_remarks(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Option<ManualRemarks>, RepositoryError> {
        Ok(guard(&self.remarks)?
            .get(&(batch.clone(), student.clone()))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPolicyRepository {
    policies: Arc<Mutex<HashMap<PolicyId, GradingPolicy>>>,
}

impl InMemoryPolicyRepository {
    pub(crate) fn insert(&self, policy: GradingPolicy) -> Result<(), RepositoryError> {
        guard(&self.policies)?.insert(policy.id.clone(), policy);
        Ok(())
    }
}

impl PolicyRepository for InMemoryPolicyRepository {
    fn policy(&self, id: &PolicyId) -> Result<Option<GradingPolicy>, RepositoryError> {
        Ok(guard(&self.policies)?.get(id).cloned())
    }

    fn default_policy(
        &self,
        school: &SchoolId,
        applicability: SchoolType,
    ) -> Result<Option<GradingPolicy>, RepositoryError> {
        let policies = guard(&self.policies)?;
        // lowest id wins when a school flags several defaults for the same type
        let mut candidates: Vec<&GradingPolicy> = policies
            .values()
            .filter(|policy| {
                policy.is_default
                    && &policy.school_id == school
                    && policy.applicability == applicability
            })
            .collect();
        candidates.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(candidates.first().map(|policy| (*policy).clone()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRoster {
    sizes: Arc<Mutex<HashMap<BatchId, u32>>>,
}

impl InMemoryRoster {
    pub(crate) fn set_class_size(&self, batch: &BatchId, size: u32) -> Result<(), RepositoryError> {
        guard(&self.sizes)?.insert(batch.clone(), size);
        Ok(())
    }
}

impl ClassRoster for InMemoryRoster {
    fn class_size(&self, batch: &BatchId) -> Result<Option<u32>, RepositoryError> {
        Ok(guard(&self.sizes)?.get(batch).copied())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
