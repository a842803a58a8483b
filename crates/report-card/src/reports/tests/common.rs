use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::grading::{GradeBand, GradingEngine, GradingPolicy, PolicyId, SchoolId, SchoolType};
use crate::reports::{
    BatchId, ClassRoster, ManualRemarks, PolicyRepository, ReportBatch, ReportCardService,
    RepositoryError, ScoreRepository, StudentId, StudentRecord, SubjectResult,
};

type StudentKey = (BatchId, StudentId);

#[derive(Default, Clone)]
pub(super) struct MemoryScores {
    batches: Arc<Mutex<HashMap<BatchId, ReportBatch>>>,
    students: Arc<Mutex<HashMap<BatchId, Vec<StudentRecord>>>>,
    results: Arc<Mutex<HashMap<StudentKey, Vec<SubjectResult>>>>,
    remarks: Arc<Mutex<HashMap<StudentKey, ManualRemarks>>>,
}

impl MemoryScores {
    pub(super) fn add_batch(&self, batch: ReportBatch) {
        self.batches
            .lock()
            .expect("lock")
            .insert(batch.id.clone(), batch);
    }

    pub(super) fn add_student(
        &self,
        batch: &BatchId,
        id: &str,
        name: &str,
        results: Vec<SubjectResult>,
    ) {
        let student = StudentRecord {
            id: StudentId(id.to_string()),
            name: name.to_string(),
        };
        self.results
            .lock()
            .expect("lock")
            .insert((batch.clone(), student.id.clone()), results);
        self.students
            .lock()
            .expect("lock")
            .entry(batch.clone())
            .or_default()
            .push(student);
    }

    pub(super) fn set_remarks(&self, batch: &BatchId, student: &str, remarks: ManualRemarks) {
        self.remarks
            .lock()
            .expect("lock")
            .insert((batch.clone(), StudentId(student.to_string())), remarks);
    }
}

impl ScoreRepository for MemoryScores {
    fn batch(&self, id: &BatchId) -> Result<Option<ReportBatch>, RepositoryError> {
        Ok(self.batches.lock().expect("lock").get(id).cloned())
    }

    fn students(&self, batch: &BatchId) -> Result<Vec<StudentRecord>, RepositoryError> {
        Ok(self
            .students
            .lock()
            .expect("lock")
            .get(batch)
            .cloned()
            .unwrap_or_default())
    }

    fn student(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        Ok(self
            .students(batch)?
            .into_iter()
            .find(|record| &record.id == student))
    }

    fn results(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Vec<SubjectResult>, RepositoryError> {
        Ok(self
            .results
            .lock()
            .expect("lock")
            .get(&(batch.clone(), student.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn manual_remarks(
        &self,
        batch: &BatchId,
        student: &StudentId,
    ) -> Result<Option<ManualRemarks>, RepositoryError> {
        Ok(self
            .remarks
            .lock()
            .expect("lock")
            .get(&(batch.clone(), student.clone()))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPolicies {
    policies: Arc<Mutex<Vec<GradingPolicy>>>,
}

impl MemoryPolicies {
    pub(super) fn add(&self, policy: GradingPolicy) {
        self.policies.lock().expect("lock").push(policy);
    }
}

impl PolicyRepository for MemoryPolicies {
    fn policy(&self, id: &PolicyId) -> Result<Option<GradingPolicy>, RepositoryError> {
        Ok(self
            .policies
            .lock()
            .expect("lock")
            .iter()
            .find(|policy| &policy.id == id)
            .cloned())
    }

    fn default_policy(
        &self,
        school: &SchoolId,
        applicability: SchoolType,
    ) -> Result<Option<GradingPolicy>, RepositoryError> {
        Ok(self
            .policies
            .lock()
            .expect("lock")
            .iter()
            .find(|policy| {
                policy.is_default
                    && &policy.school_id == school
                    && policy.applicability == applicability
            })
            .cloned())
    }
}

/// Counts lookups so tests can check the roster is read once per batch.
#[derive(Default)]
pub(super) struct CountingRoster {
    pub(super) size: Option<u32>,
    pub(super) lookups: Mutex<usize>,
}

impl CountingRoster {
    pub(super) fn with_size(size: u32) -> Self {
        Self {
            size: Some(size),
            lookups: Mutex::new(0),
        }
    }

    pub(super) fn lookups(&self) -> usize {
        *self.lookups.lock().expect("lock")
    }
}

impl ClassRoster for CountingRoster {
    fn class_size(&self, _batch: &BatchId) -> Result<Option<u32>, RepositoryError> {
        *self.lookups.lock().expect("lock") += 1;
        Ok(self.size)
    }
}

pub(super) struct UnavailableScores;

impl ScoreRepository for UnavailableScores {
    fn batch(&self, _id: &BatchId) -> Result<Option<ReportBatch>, RepositoryError> {
        Err(RepositoryError::Unavailable("score store offline".to_string()))
    }

    fn students(&self, _batch: &BatchId) -> Result<Vec<StudentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("score store offline".to_string()))
    }

    fn student(
        &self,
        _batch: &BatchId,
        _student: &StudentId,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("score store offline".to_string()))
    }

    fn results(
        &self,
        _batch: &BatchId,
        _student: &StudentId,
    ) -> Result<Vec<SubjectResult>, RepositoryError> {
        Err(RepositoryError::Unavailable("score store offline".to_string()))
    }

    fn manual_remarks(
        &self,
        _batch: &BatchId,
        _student: &StudentId,
    ) -> Result<Option<ManualRemarks>, RepositoryError> {
        Err(RepositoryError::Unavailable("score store offline".to_string()))
    }
}

pub(super) type MemoryService = ReportCardService<MemoryScores, MemoryPolicies, CountingRoster>;

pub(super) fn school() -> SchoolId {
    SchoolId("sch-hillside".to_string())
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 9).expect("valid date")
}

pub(super) fn batch(id: &str, class_level_group: &str, policy: Option<&str>) -> ReportBatch {
    ReportBatch {
        id: BatchId(id.to_string()),
        school_id: school(),
        school_name: "Hillside Primary".to_string(),
        school_type: SchoolType::Primary,
        class_name: "P5 Blue".to_string(),
        class_level_group: class_level_group.to_string(),
        term_name: "Term II".to_string(),
        year_name: "2024".to_string(),
        policy_id: policy.map(|id| PolicyId(id.to_string())),
        term_end_date: NaiveDate::from_ymd_opt(2024, 8, 16),
        next_term_begin_date: NaiveDate::from_ymd_opt(2024, 9, 9),
    }
}

pub(super) fn nine_point_policy(id: &str) -> GradingPolicy {
    let bands = [
        ("D1", 80.0, 100.0, 1.0, "Distinction"),
        ("D2", 75.0, 79.99, 2.0, "Distinction"),
        ("C3", 70.0, 74.99, 3.0, "Credit"),
        ("C4", 65.0, 69.99, 4.0, "Credit"),
        ("C5", 60.0, 64.99, 5.0, "Credit"),
        ("C6", 50.0, 59.99, 6.0, "Credit"),
        ("P7", 45.0, 49.99, 7.0, "Pass"),
        ("P8", 40.0, 44.99, 8.0, "Pass"),
        ("F9", 0.0, 39.99, 9.0, "Fail"),
    ];
    bands.into_iter().fold(
        GradingPolicy::new(
            PolicyId(id.to_string()),
            school(),
            "Nine point",
            SchoolType::Primary,
        )
        .expect("named policy"),
        |policy, (label, min, max, points, comment)| {
            policy
                .with_band(GradeBand::new(label, min, max, Some(points), comment))
                .expect("disjoint bands")
        },
    )
}

/// Pass/fail policy used to tell explicit and default policies apart.
pub(super) fn pass_fail_policy(id: &str, applicability: SchoolType) -> GradingPolicy {
    let pass = GradeBand::new("PASS", 50.0, 100.0, Some(1.0), "Pass");
    let fail = GradeBand::new("FAIL", 0.0, 49.99, Some(9.0), "Fail");
    GradingPolicy::new(PolicyId(id.to_string()), school(), "Pass/fail", applicability)
        .and_then(|policy| policy.with_band(pass))
        .and_then(|policy| policy.with_band(fail))
        .expect("valid policy")
}

pub(super) fn core_results(values: [Option<f64>; 4]) -> Vec<SubjectResult> {
    ["MTC", "ENG", "SCI", "SST"]
        .into_iter()
        .zip(values)
        .map(|(code, value)| SubjectResult::new(code, value))
        .collect()
}

pub(super) struct Fixture {
    pub(super) scores: MemoryScores,
    pub(super) policies: MemoryPolicies,
    pub(super) roster: Arc<CountingRoster>,
    pub(super) service: MemoryService,
}

pub(super) fn fixture() -> Fixture {
    let scores = MemoryScores::default();
    let policies = MemoryPolicies::default();
    let roster = Arc::new(CountingRoster::with_size(38));
    let service = ReportCardService::new(
        Arc::new(scores.clone()),
        Arc::new(policies.clone()),
        roster.clone(),
        Arc::new(GradingEngine::default()),
    );
    Fixture {
        scores,
        policies,
        roster,
        service,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
