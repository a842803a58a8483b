use std::io::Read;

use serde::{Deserialize, Serialize};

use super::bands::{BandTableError, GradeBand, GradeBandTable};
use super::tier::SchoolType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchoolId(pub String);

/// A named, school-scoped set of grade bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingPolicy {
    pub id: PolicyId,
    pub school_id: SchoolId,
    pub name: String,
    pub applicability: SchoolType,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    bands: GradeBandTable,
}

impl GradingPolicy {
    pub fn new(
        id: PolicyId,
        school_id: SchoolId,
        name: impl Into<String>,
        applicability: SchoolType,
    ) -> Result<Self, PolicyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PolicyError::EmptyName);
        }
        Ok(Self {
            id,
            school_id,
            name,
            applicability,
            is_default: false,
            bands: GradeBandTable::empty(),
        })
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Adds a band after checking it against the bands already in the policy. Overlapping
    /// intervals are rejected here so new policies never depend on first-match ordering.
    pub fn add_band(&mut self, band: GradeBand) -> Result<(), PolicyError> {
        band.check()?;
        if let Some(existing) = self.bands.iter().find(|existing| existing.overlaps(&band)) {
            return Err(BandTableError::Overlap {
                first: existing.grade_label.clone(),
                second: band.grade_label.clone(),
            }
            .into());
        }
        self.bands.push(band);
        self.bands.reorder();
        Ok(())
    }

    pub fn with_band(mut self, band: GradeBand) -> Result<Self, PolicyError> {
        self.add_band(band)?;
        Ok(self)
    }

    /// Bands in matching order (`order_index` ascending, then highest minimum first).
    pub fn bands(&self) -> &GradeBandTable {
        &self.bands
    }

    pub fn applies_to(&self, school_type: SchoolType) -> bool {
        self.applicability == SchoolType::Any || self.applicability == school_type
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::EmptyName);
        }
        self.bands.validate()?;
        Ok(())
    }

    /// Loads a stored policy. Legacy documents are accepted as-is (overlaps included); call
    /// [`GradingPolicy::validate`] to enforce authoring rules.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, PolicyError> {
        let mut policy: GradingPolicy = serde_json::from_reader(reader)?;
        policy.bands.reorder();
        Ok(policy)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("policy name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Band(#[from] BandTableError),
    #[error("malformed policy document: {0}")]
    Malformed(#[from] serde_json::Error),
}
