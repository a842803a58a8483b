use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::domain::{BatchId, StudentId};
use super::repository::{ClassRoster, PolicyRepository, ScoreRepository};
use super::service::{ReportCardService, ReportServiceError};
use crate::error::AppError;
use crate::grading::{
    score_from_value, Classification, ClassificationView, GradeBandTable, GradeTier,
    GradingEngine, LowerTierSummary, OverallSummary, RemarkVoice, SubjectScore, SummaryRow,
    UpperTierSummary,
};

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// Number, numeric text, or anything else (treated as not graded).
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub bands: GradeBandTable,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub result: Classification,
    pub display: ClassificationView,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub class_level_group: String,
    pub scores: Vec<SubjectScore>,
    #[serde(default)]
    pub bands: GradeBandTable,
    /// Overrides the configured core subjects for this request.
    #[serde(default)]
    pub core_subjects: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub tier: GradeTier,
    pub summary: OverallSummary,
    pub rows: Vec<SummaryRow>,
}

/// Summary accepted by the remarks route: either the `/summary` response
/// shape (with its `tier` tag) or a bare tier summary. Counts the remarks
/// never read may be left out.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RemarksSummary {
    Tagged(OverallSummary),
    Upper(UpperTierSummary),
    Lower(LowerTierSummary),
}

impl From<RemarksSummary> for OverallSummary {
    fn from(summary: RemarksSummary) -> Self {
        match summary {
            RemarksSummary::Tagged(summary) => summary,
            RemarksSummary::Upper(summary) => OverallSummary::Upper(summary),
            RemarksSummary::Lower(summary) => OverallSummary::Lower(summary),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemarksRequest {
    #[serde(default)]
    pub summary: Option<RemarksSummary>,
    #[serde(default)]
    pub student_name: String,
    pub class_level_group: String,
    #[serde(default)]
    pub school_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RemarksResponse {
    pub class_teacher: String,
    pub head_teacher: String,
}

/// Stateless grading endpoints over the engine.
pub fn grading_router(engine: Arc<GradingEngine>) -> Router {
    Router::new()
        .route("/api/v1/grading/classify", post(classify_handler))
        .route("/api/v1/grading/summary", post(summary_handler))
        .route("/api/v1/grading/remarks", post(remarks_handler))
        .with_state(engine)
}

/// Report card endpoints backed by the report service.
pub fn report_router<S, P, R>(service: Arc<ReportCardService<S, P, R>>) -> Router
where
    S: ScoreRepository + 'static,
    P: PolicyRepository + 'static,
    R: ClassRoster + 'static,
{
    Router::new()
        .route("/api/v1/reports/:batch_id", get(batch_handler::<S, P, R>))
        .route(
            "/api/v1/reports/:batch_id/students/:student_id",
            get(student_handler::<S, P, R>),
        )
        .with_state(service)
}

pub(crate) async fn classify_handler(
    State(engine): State<Arc<GradingEngine>>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_request)?;
    let result = engine.classify(score_from_value(&request.score), &request.bands);
    let display = result.view();
    Ok(Json(ClassifyResponse { result, display }))
}

pub(crate) async fn summary_handler(
    State(engine): State<Arc<GradingEngine>>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_request)?;
    let tier = GradeTier::from_class_level_group(&request.class_level_group);
    let summary = match &request.core_subjects {
        Some(core) => {
            engine.summarize_with_core(tier, &request.scores, &request.bands, core.as_slice())
        }
        None => engine.summarize(tier, &request.scores, &request.bands),
    };
    debug!(tier = %tier, subjects = request.scores.len(), "computed summary");
    let rows = summary.display_rows(tier);
    Ok(Json(SummaryResponse {
        tier,
        summary,
        rows,
    }))
}

pub(crate) async fn remarks_handler(
    State(engine): State<Arc<GradingEngine>>,
    payload: Result<Json<RemarksRequest>, JsonRejection>,
) -> Result<Json<RemarksResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_request)?;
    let tier = GradeTier::from_class_level_group(&request.class_level_group);
    let summary = request.summary.map(OverallSummary::from);
    let summary = summary.as_ref();
    let school = request.school_name.as_deref();

    Ok(Json(RemarksResponse {
        class_teacher: engine.remark(
            RemarkVoice::ClassTeacher,
            summary,
            &request.student_name,
            tier,
            school,
        ),
        head_teacher: engine.remark(
            RemarkVoice::HeadTeacher,
            summary,
            &request.student_name,
            tier,
            school,
        ),
    }))
}

pub(crate) async fn batch_handler<S, P, R>(
    State(service): State<Arc<ReportCardService<S, P, R>>>,
    Path(batch_id): Path<String>,
) -> Response
where
    S: ScoreRepository + 'static,
    P: PolicyRepository + 'static,
    R: ClassRoster + 'static,
{
    let today = chrono::Local::now().date_naive();
    match service.batch_reports(&BatchId(batch_id), today) {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(error) => report_error(error),
    }
}

pub(crate) async fn student_handler<S, P, R>(
    State(service): State<Arc<ReportCardService<S, P, R>>>,
    Path((batch_id, student_id)): Path<(String, String)>,
) -> Response
where
    S: ScoreRepository + 'static,
    P: PolicyRepository + 'static,
    R: ClassRoster + 'static,
{
    let today = chrono::Local::now().date_naive();
    match service.student_report(&BatchId(batch_id), &StudentId(student_id), today) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => report_error(error),
    }
}

fn report_error(error: ReportServiceError) -> Response {
    match error {
        ReportServiceError::BatchNotFound(_) | ReportServiceError::StudentNotFound { .. } => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        other => AppError::from(other).into_response(),
    }
}

fn invalid_request(rejection: JsonRejection) -> AppError {
    AppError::InvalidRequest(rejection.body_text())
}
