use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Class-level group text marking the average-based (lower primary) tier.
pub const LOWER_TIER_MARKER: &str = "primary_lower";
const UPPER_PRIMARY_MARKER: &str = "primary_upper";

/// Grade tier of a class, which decides the shape of its overall summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeTier {
    PrimaryLower,
    PrimaryUpper,
    Secondary,
}

impl GradeTier {
    /// Reads the tier from a free-form class-level group such as `"primary_lower (P1-P3)"`.
    /// Anything that is not recognisably primary is treated as secondary.
    pub fn from_class_level_group(group: &str) -> Self {
        let group = group.to_ascii_lowercase();
        if group.contains(LOWER_TIER_MARKER) {
            GradeTier::PrimaryLower
        } else if group.contains(UPPER_PRIMARY_MARKER) {
            GradeTier::PrimaryUpper
        } else {
            GradeTier::Secondary
        }
    }

    /// Lower tier summaries are average based; every other tier uses aggregates and divisions.
    pub fn is_lower(self) -> bool {
        self == GradeTier::PrimaryLower
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeTier::PrimaryLower => "primary_lower",
            GradeTier::PrimaryUpper => "primary_upper",
            GradeTier::Secondary => "secondary",
        }
    }
}

impl fmt::Display for GradeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// School type a grading policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolType {
    Primary,
    Secondary,
    Other,
    Any,
}

impl SchoolType {
    pub fn label(self) -> &'static str {
        match self {
            SchoolType::Primary => "primary",
            SchoolType::Secondary => "secondary",
            SchoolType::Other => "other",
            SchoolType::Any => "any",
        }
    }
}

impl FromStr for SchoolType {
    type Err = UnknownSchoolType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(SchoolType::Primary),
            "secondary" => Ok(SchoolType::Secondary),
            "other" => Ok(SchoolType::Other),
            "any" => Ok(SchoolType::Any),
            _ => Err(UnknownSchoolType(value.to_string())),
        }
    }
}

impl fmt::Display for SchoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown school type '{0}' (expected primary, secondary, other, or any)")]
pub struct UnknownSchoolType(pub String);
