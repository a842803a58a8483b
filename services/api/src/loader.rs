use crate::infra::{InMemoryPolicyRepository, InMemoryRoster, InMemoryScoreRepository};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use report_card::error::AppError;
use report_card::grading::{GradingPolicy, SchoolId, SchoolType};
use report_card::reports::{BatchId, ReportBatch, ScoreSheet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where a class's scores come from and how the batch is labelled on the card.
#[derive(Args, Debug, Clone)]
pub(crate) struct BatchArgs {
    /// CSV score sheet (student_id, student_name, subject_code, eot_score)
    #[arg(long)]
    pub(crate) scores: Option<PathBuf>,
    /// Grading policy document (JSON) used for the batch
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Identifier the batch is served under
    #[arg(long, default_value = "current")]
    pub(crate) batch_id: String,
    #[arg(long, default_value = "default")]
    pub(crate) school_id: String,
    /// School name printed on the card; falls back to APP_SCHOOL_NAME
    #[arg(long)]
    pub(crate) school_name: Option<String>,
    #[arg(long, default_value = "primary")]
    pub(crate) school_type: SchoolType,
    #[arg(long, default_value = "")]
    pub(crate) class_name: String,
    /// Class-level group, e.g. "primary_lower (P1-P3)", "primary_upper", "S2"
    #[arg(long, default_value = "primary_upper")]
    pub(crate) class_level_group: String,
    #[arg(long, default_value = "Term I")]
    pub(crate) term: String,
    /// Academic year label (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Last day of term (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) term_end: Option<NaiveDate>,
    /// First day of next term (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) next_term_begin: Option<NaiveDate>,
    /// Enrolment used for "out of" figures (defaults to the students on the sheet)
    #[arg(long)]
    pub(crate) class_size: Option<u32>,
}

impl Default for BatchArgs {
    fn default() -> Self {
        Self {
            scores: None,
            policy: None,
            batch_id: "current".to_string(),
            school_id: "default".to_string(),
            school_name: None,
            school_type: SchoolType::Primary,
            class_name: String::new(),
            class_level_group: "primary_upper".to_string(),
            term: "Term I".to_string(),
            year: None,
            term_end: None,
            next_term_begin: None,
            class_size: None,
        }
    }
}

impl BatchArgs {
    pub(crate) fn batch_id(&self) -> BatchId {
        BatchId(self.batch_id.clone())
    }

    fn batch(&self, policy: Option<&GradingPolicy>) -> ReportBatch {
        ReportBatch {
            id: self.batch_id(),
            school_id: SchoolId(self.school_id.clone()),
            school_name: self.school_name.clone().unwrap_or_default(),
            school_type: self.school_type,
            class_name: self.class_name.clone(),
            class_level_group: self.class_level_group.clone(),
            term_name: self.term.clone(),
            year_name: self
                .year
                .clone()
                .unwrap_or_else(|| Local::now().year().to_string()),
            policy_id: policy.map(|policy| policy.id.clone()),
            term_end_date: self.term_end,
            next_term_begin_date: self.next_term_begin,
        }
    }
}

/// In-memory stores seeded from the files named on the command line.
#[derive(Default, Clone)]
pub(crate) struct SeededStores {
    pub(crate) scores: InMemoryScoreRepository,
    pub(crate) policies: InMemoryPolicyRepository,
    pub(crate) roster: InMemoryRoster,
}

pub(crate) fn load_policy(path: &Path) -> Result<GradingPolicy, AppError> {
    let file = File::open(path)?;
    let policy = GradingPolicy::from_json_reader(BufReader::new(file))?;
    if let Err(err) = policy.validate() {
        warn!(
            policy = %policy.id.0,
            path = %path.display(),
            error = %err,
            "grading policy breaks authoring rules; bands are matched in stored order"
        );
    }
    Ok(policy)
}

pub(crate) fn seed_stores(args: &BatchArgs) -> Result<SeededStores, AppError> {
    let stores = SeededStores::default();

    let policy = args.policy.as_deref().map(load_policy).transpose()?;
    if let Some(policy) = &policy {
        stores.policies.insert(policy.clone()).map_err(repository_error)?;
    }

    let Some(path) = args.scores.as_deref() else {
        return Ok(stores);
    };
    let sheet = ScoreSheet::from_path(path)?;
    if sheet.is_empty() {
        warn!(path = %path.display(), "score sheet has no rows");
    }

    let batch = args.batch(policy.as_ref());
    let batch_id = batch.id.clone();
    let students = stores
        .scores
        .load_sheet(batch, &sheet)
        .map_err(repository_error)?;
    let class_size = args
        .class_size
        .unwrap_or_else(|| u32::try_from(students).unwrap_or(u32::MAX));
    stores
        .roster
        .set_class_size(&batch_id, class_size)
        .map_err(repository_error)?;

    info!(
        batch = %batch_id,
        students,
        class_size,
        path = %path.display(),
        "loaded score sheet"
    );
    Ok(stores)
}

fn repository_error(err: report_card::reports::RepositoryError) -> AppError {
    AppError::Report(err.into())
}
