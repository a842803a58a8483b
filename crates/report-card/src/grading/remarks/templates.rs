use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::aggregate::Division;

/// Who signs the remark on the report card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemarkVoice {
    ClassTeacher,
    HeadTeacher,
}

/// Performance bracket selecting one narrative template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemarkBracket {
    /// No summary exists yet.
    Awaiting,
    /// Lower tier class but no average-based summary.
    PendingAverage,
    /// Upper tier class but no division-based summary.
    PendingDivision,
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    Fair,
    Weak,
    DivisionI,
    DivisionII,
    DivisionIII,
    DivisionIV,
    DivisionU,
    DivisionX,
    DivisionOther,
}

impl RemarkBracket {
    /// Lower bounds are inclusive: exactly 80.00 is excellent, 79.99 is not.
    pub fn for_average(average: f64) -> Self {
        if average >= 80.0 {
            RemarkBracket::Excellent
        } else if average >= 70.0 {
            RemarkBracket::VeryGood
        } else if average >= 60.0 {
            RemarkBracket::Good
        } else if average >= 50.0 {
            RemarkBracket::Satisfactory
        } else if average >= 40.0 {
            RemarkBracket::Fair
        } else {
            RemarkBracket::Weak
        }
    }

    pub fn for_division(division: &Division) -> Self {
        match division {
            Division::I => RemarkBracket::DivisionI,
            Division::II => RemarkBracket::DivisionII,
            Division::III => RemarkBracket::DivisionIII,
            Division::IV => RemarkBracket::DivisionIV,
            Division::U => RemarkBracket::DivisionU,
            Division::X => RemarkBracket::DivisionX,
            Division::Unrecognized(_) => RemarkBracket::DivisionOther,
        }
    }
}

const GENERIC_REMARK: &str = "{name} has completed the term. Keep working hard.";

const CLASS_TEACHER_DEFAULTS: &[(RemarkBracket, &str)] = &[
    (
        RemarkBracket::Awaiting,
        "Awaiting overall assessment. Keep working hard and ensure all work is submitted.",
    ),
    (
        RemarkBracket::PendingAverage,
        "{name} has some pending results. Overall performance will be assessed once all marks are available. Please ensure all work is completed.",
    ),
    (
        RemarkBracket::PendingDivision,
        "{name} has some pending results. Overall performance will be assessed once all marks are available. Ensure all assessments are completed.",
    ),
    (
        RemarkBracket::Excellent,
        "{name} has demonstrated excellent understanding and application of concepts. Keep up the great work and continue to explore new ideas!",
    ),
    (
        RemarkBracket::VeryGood,
        "{name} has shown very good progress and understanding. A commendable effort! Continue to strive for excellence.",
    ),
    (
        RemarkBracket::Good,
        "{name} has made good progress this term. Consistent effort will yield even better results. Keep pushing yourself!",
    ),
    (
        RemarkBracket::Satisfactory,
        "{name} has shown satisfactory performance. Focus on areas of weakness for improvement and participate more actively.",
    ),
    (
        RemarkBracket::Fair,
        "{name} has made some progress but needs to put in more effort in key areas. Consistent practice is recommended.",
    ),
    (
        RemarkBracket::Weak,
        "{name} needs significant improvement. Consistent effort, regular attendance, and seeking help are advised to improve performance.",
    ),
    (
        RemarkBracket::DivisionI,
        "{name} has achieved an excellent result with {aggregates} aggregates. This is a commendable performance. Keep up the dedication and hard work!",
    ),
    (
        RemarkBracket::DivisionII,
        "{name} has performed very well, attaining Division {division} with {aggregates} aggregates. Your hard work is paying off. Continue to strive for even better!",
    ),
    (
        RemarkBracket::DivisionIII,
        "{name} has shown good effort, resulting in Division {division} with {aggregates} aggregates. With increased focus and consistent revision, you can achieve even better results.",
    ),
    (
        RemarkBracket::DivisionIV,
        "{name} has made a fair attempt, achieving Division {division} with {aggregates} aggregates. Consistent revision and practice are needed for improvement. Don't be discouraged, keep working hard.",
    ),
    (
        RemarkBracket::DivisionU,
        "{name} needs to put in significantly more effort to improve performance. Seek assistance from teachers and dedicate more time to studies.",
    ),
    (
        RemarkBracket::DivisionX,
        "{name} has incomplete results or did not meet the minimum requirements for grading. Please consult the school administration for clarification.",
    ),
    (
        RemarkBracket::DivisionOther,
        "{name} has completed the term with {aggregates} aggregates. Overall performance is {division}. Strive for improvement in the next term.",
    ),
];

const HEAD_TEACHER_DEFAULTS: &[(RemarkBracket, &str)] = &[
    (
        RemarkBracket::Awaiting,
        "The school encourages continuous effort and dedication from all students. We look forward to seeing your progress.",
    ),
    (
        RemarkBracket::PendingAverage,
        "The school administration acknowledges {name}'s participation and encourages completion of all assessments for a comprehensive evaluation of progress.",
    ),
    (
        RemarkBracket::PendingDivision,
        "The school administration acknowledges {name}'s participation and looks forward to seeing complete results for a full evaluation. We encourage continuous effort.",
    ),
    (
        RemarkBracket::Excellent,
        "An outstanding performance, {name}! {school} is proud of your achievements. Keep aiming high and continue to be a role model for your peers.",
    ),
    (
        RemarkBracket::VeryGood,
        "A very good performance, {name}. Your dedication is commendable. {school} encourages you to continue to excel and inspire others.",
    ),
    (
        RemarkBracket::Good,
        "{name}, you have made good progress this term. {school} appreciates your consistent effort and encourages you to aim for even greater heights next term.",
    ),
    (
        RemarkBracket::Satisfactory,
        "{name}, your performance is satisfactory. {school} encourages you to identify areas for growth and work towards them diligently. Keep up the effort!",
    ),
    (
        RemarkBracket::Fair,
        "{name}, you have made some progress this term. {school} encourages you to put more effort into key areas and to practise consistently.",
    ),
    (
        RemarkBracket::Weak,
        "{name}, there is significant room for improvement. {school} encourages you to seek support from teachers and parents and apply yourself more consistently to achieve your potential.",
    ),
    (
        RemarkBracket::DivisionI,
        "Excellent performance, {name}! {school} congratulates you on achieving Division I with {aggregates} aggregates. This reflects your hard work and dedication. Maintain this high standard and continue to inspire.",
    ),
    (
        RemarkBracket::DivisionII,
        "Well done, {name}, on achieving Division II with {aggregates} aggregates. Your hard work is paying off. {school} encourages you to keep striving for excellence and aim even higher.",
    ),
    (
        RemarkBracket::DivisionIII,
        "{name}, a good effort resulting in Division III with {aggregates} aggregates. {school} is pleased with your progress and encourages continued focus for even better results in the future.",
    ),
    (
        RemarkBracket::DivisionIV,
        "{name}, you have passed in Division IV with {aggregates} aggregates. {school} encourages you to dedicate more time and effort to your studies for significant improvement. We believe in your potential.",
    ),
    (
        RemarkBracket::DivisionU,
        "{name}, your performance needs significant improvement. {school} urges you to work closely with your teachers and parents to identify challenges and improve your results. Consistent effort is key.",
    ),
    (
        RemarkBracket::DivisionX,
        "{name} has incomplete results or did not meet the minimum requirements for grading. Please consult the school administration for clarification. The school is committed to supporting your academic journey.",
    ),
    (
        RemarkBracket::DivisionOther,
        "{name}, you have completed the term. {school} encourages you to reflect on your performance, identify areas for growth, and aim for continuous improvement in the next term.",
    ),
];

/// Narrative templates keyed by voice and bracket.
///
/// Placeholders: `{name}`, `{school}`, `{division}`, `{aggregates}`. Unknown placeholders are
/// left in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemarkTemplates {
    class_teacher: BTreeMap<RemarkBracket, String>,
    head_teacher: BTreeMap<RemarkBracket, String>,
}

/// Partial template table, as read from a JSON override document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemarkTemplateOverrides {
    #[serde(default)]
    pub class_teacher: BTreeMap<RemarkBracket, String>,
    #[serde(default)]
    pub head_teacher: BTreeMap<RemarkBracket, String>,
}

impl Default for RemarkTemplates {
    fn default() -> Self {
        Self {
            class_teacher: to_table(CLASS_TEACHER_DEFAULTS),
            head_teacher: to_table(HEAD_TEACHER_DEFAULTS),
        }
    }
}

impl RemarkTemplates {
    /// Built-in templates with `overrides` applied. Blank overrides are ignored so every bracket
    /// keeps a usable template.
    pub fn with_overrides(overrides: RemarkTemplateOverrides) -> Self {
        let mut templates = Self::default();
        for (bracket, text) in overrides.class_teacher {
            if !text.trim().is_empty() {
                templates.class_teacher.insert(bracket, text);
            }
        }
        for (bracket, text) in overrides.head_teacher {
            if !text.trim().is_empty() {
                templates.head_teacher.insert(bracket, text);
            }
        }
        templates
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let overrides: RemarkTemplateOverrides = serde_json::from_str(raw)?;
        Ok(Self::with_overrides(overrides))
    }

    pub fn template(&self, voice: RemarkVoice, bracket: RemarkBracket) -> &str {
        let table = match voice {
            RemarkVoice::ClassTeacher => &self.class_teacher,
            RemarkVoice::HeadTeacher => &self.head_teacher,
        };
        table
            .get(&bracket)
            .map(String::as_str)
            .unwrap_or(GENERIC_REMARK)
    }
}

fn to_table(entries: &[(RemarkBracket, &str)]) -> BTreeMap<RemarkBracket, String> {
    entries
        .iter()
        .map(|(bracket, text)| (*bracket, (*text).to_string()))
        .collect()
}

/// Substitutes placeholders in one pass so substituted values are never re-scanned.
pub(crate) fn render(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                if key.contains('{') {
                    // stray brace; rescan from the next one
                    out.push('{');
                    rest = after;
                    continue;
                }
                match lookup(key) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
