//! Teacher-voice and head-of-school-voice narrative remarks.

mod templates;

pub use templates::{RemarkBracket, RemarkTemplateOverrides, RemarkTemplates, RemarkVoice};

use super::aggregate::OverallSummary;
use super::tier::GradeTier;
use templates::render;

const UNNAMED_STUDENT: &str = "The student";
const UNNAMED_SCHOOL: &str = "Our school";

/// First whitespace-delimited token of a full name.
pub fn first_name(full_name: &str) -> Option<&str> {
    full_name.split_whitespace().next()
}

/// Renders remarks from a template table. Never fails and never returns an empty string.
#[derive(Debug, Clone, Default)]
pub struct RemarkGenerator {
    templates: RemarkTemplates,
}

impl RemarkGenerator {
    pub fn new(templates: RemarkTemplates) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &RemarkTemplates {
        &self.templates
    }

    pub fn generate(
        &self,
        voice: RemarkVoice,
        summary: Option<&OverallSummary>,
        student_name: &str,
        tier: GradeTier,
        school_name: Option<&str>,
    ) -> String {
        let bracket = select_bracket(summary, tier);
        let (division, aggregates) = match summary.and_then(OverallSummary::as_upper) {
            Some(upper) => (
                upper.division.label().to_string(),
                upper.aggregate_points.to_string(),
            ),
            None => (String::new(), String::new()),
        };
        let name = first_name(student_name).unwrap_or(UNNAMED_STUDENT);
        let school = school_name
            .map(str::trim)
            .filter(|school| !school.is_empty())
            .unwrap_or(UNNAMED_SCHOOL);

        let rendered = render(self.templates.template(voice, bracket), |key| {
            let value = match key {
                "name" => name,
                "school" => school,
                "division" => division.as_str(),
                "aggregates" => aggregates.as_str(),
                _ => return None,
            };
            Some(escape(value))
        });

        if rendered.trim().is_empty() {
            format!("{} has completed the term.", escape(name))
        } else {
            rendered
        }
    }
}

/// Renders a remark with the built-in templates, reading the tier from a class-level group.
pub fn generate_remark(
    voice: RemarkVoice,
    summary: Option<&OverallSummary>,
    student_name: &str,
    class_level_group: &str,
    school_name: Option<&str>,
) -> String {
    RemarkGenerator::default().generate(
        voice,
        summary,
        student_name,
        GradeTier::from_class_level_group(class_level_group),
        school_name,
    )
}

fn select_bracket(summary: Option<&OverallSummary>, tier: GradeTier) -> RemarkBracket {
    let Some(summary) = summary else {
        return RemarkBracket::Awaiting;
    };

    if tier.is_lower() {
        match summary.as_lower() {
            Some(lower) => RemarkBracket::for_average(lower.average_score),
            None => RemarkBracket::PendingAverage,
        }
    } else {
        match summary.as_upper() {
            Some(upper) => RemarkBracket::for_division(&upper.division),
            None => RemarkBracket::PendingDivision,
        }
    }
}

fn escape(value: &str) -> String {
    html_escape::encode_quoted_attribute(value).into_owned()
}
