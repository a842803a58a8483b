//! Score classification, overall summaries, and narrative remarks.
//!
//! Everything in this module is a pure function of its inputs. Callers load the band table for
//! the applicable policy, classify each subject, fold the subjects into one [`OverallSummary`],
//! and render remarks from that summary.

mod aggregate;
mod bands;
mod classifier;
mod policy;
pub mod remarks;
mod tier;

#[cfg(test)]
mod tests;

pub use aggregate::{
    aggregate_lower, aggregate_upper, Division, LowerTierSummary, OverallSummary, SubjectScore,
    SummaryRow, UpperTierSummary,
};
pub use bands::{BandTableError, GradeBand, GradeBandTable};
pub use classifier::{
    classify, parse_score, score_from_value, Classification, ClassificationView, NOT_AVAILABLE,
    NOT_GRADED, OUT_OF_RANGE_COMMENT,
};
pub use policy::{GradingPolicy, PolicyError, PolicyId, SchoolId};
pub use remarks::{
    first_name, generate_remark, RemarkBracket, RemarkGenerator, RemarkTemplates, RemarkVoice,
};
pub use tier::{GradeTier, SchoolType, UnknownSchoolType, LOWER_TIER_MARKER};

/// Core subjects used for division aggregates when a school does not configure its own.
pub const DEFAULT_CORE_SUBJECTS: [&str; 4] = ["MTC", "ENG", "SCI", "SST"];

/// Stateless engine bundling the school's core subjects with its remark templates.
#[derive(Debug, Clone)]
pub struct GradingEngine {
    core_subjects: Vec<String>,
    remarks: RemarkGenerator,
}

impl Default for GradingEngine {
    fn default() -> Self {
        Self::new(
            DEFAULT_CORE_SUBJECTS.iter().map(|code| code.to_string()).collect(),
            RemarkTemplates::default(),
        )
    }
}

impl GradingEngine {
    pub fn new(core_subjects: Vec<String>, templates: RemarkTemplates) -> Self {
        Self {
            core_subjects,
            remarks: RemarkGenerator::new(templates),
        }
    }

    pub fn core_subjects(&self) -> &[String] {
        &self.core_subjects
    }

    pub fn classify(&self, score: Option<f64>, bands: &GradeBandTable) -> Classification {
        classify(score, bands)
    }

    /// Picks the summary shape from `tier`: averages for lower primary, divisions otherwise.
    pub fn summarize(
        &self,
        tier: GradeTier,
        scores: &[SubjectScore],
        bands: &GradeBandTable,
    ) -> OverallSummary {
        self.summarize_with_core(tier, scores, bands, &self.core_subjects)
    }

    pub fn summarize_with_core<S: AsRef<str>>(
        &self,
        tier: GradeTier,
        scores: &[SubjectScore],
        bands: &GradeBandTable,
        core_subjects: &[S],
    ) -> OverallSummary {
        if tier.is_lower() {
            OverallSummary::Lower(aggregate_lower(scores, bands))
        } else {
            OverallSummary::Upper(aggregate_upper(scores, bands, core_subjects))
        }
    }

    pub fn remark(
        &self,
        voice: RemarkVoice,
        summary: Option<&OverallSummary>,
        student_name: &str,
        tier: GradeTier,
        school_name: Option<&str>,
    ) -> String {
        self.remarks
            .generate(voice, summary, student_name, tier, school_name)
    }
}

/// Plain-number rendering: at most two decimals, no trailing zeros (`240`, `80.5`).
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}
