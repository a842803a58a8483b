use serde::{Deserialize, Serialize};

/// One scoring interval of a grading policy. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub grade_label: String,
    pub min_score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub comment: String,
    /// Display position inside the policy; lower values are matched first.
    #[serde(default)]
    pub order_index: i32,
}

impl GradeBand {
    pub fn new(
        grade_label: impl Into<String>,
        min_score: f64,
        max_score: f64,
        points: Option<f64>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            grade_label: grade_label.into(),
            min_score,
            max_score,
            points,
            comment: comment.into(),
            order_index: 0,
        }
    }

    pub fn with_order_index(mut self, order_index: i32) -> Self {
        self.order_index = order_index;
        self
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min_score && score <= self.max_score
    }

    pub fn overlaps(&self, other: &GradeBand) -> bool {
        self.min_score <= other.max_score && other.min_score <= self.max_score
    }

    /// Checks the invariants a single band must satisfy when it is authored.
    pub fn check(&self) -> Result<(), BandTableError> {
        if self.grade_label.trim().is_empty() {
            return Err(BandTableError::EmptyLabel);
        }
        if !self.min_score.is_finite() || !self.max_score.is_finite() {
            return Err(BandTableError::NonFiniteBound {
                label: self.grade_label.clone(),
            });
        }
        if self.points.is_some_and(|points| !points.is_finite()) {
            return Err(BandTableError::NonFinitePoints {
                label: self.grade_label.clone(),
            });
        }
        if self.min_score > self.max_score {
            return Err(BandTableError::InvertedRange {
                label: self.grade_label.clone(),
                min: self.min_score,
                max: self.max_score,
            });
        }
        Ok(())
    }
}

/// Ordered set of bands belonging to one grading policy.
///
/// The order is the matching priority: [`GradeBandTable::first_match`] returns the first band
/// that contains a score, so overlapping tables still classify deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeBandTable {
    bands: Vec<GradeBand>,
}

impl GradeBandTable {
    /// Keeps the caller's order untouched.
    pub fn new(bands: Vec<GradeBand>) -> Self {
        Self { bands }
    }

    /// Orders bands the way stored policy levels are read: `order_index` ascending, then the
    /// higher `min_score` first.
    pub fn ordered(mut bands: Vec<GradeBand>) -> Self {
        bands.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| b.min_score.total_cmp(&a.min_score))
        });
        Self { bands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GradeBand> {
        self.bands.iter()
    }

    pub fn first_match(&self, score: f64) -> Option<&GradeBand> {
        self.bands.iter().find(|band| band.contains(score))
    }

    /// Rejects tables an administrator should not be able to save: malformed bands or
    /// intervals that overlap one another.
    pub fn validate(&self) -> Result<(), BandTableError> {
        for (idx, band) in self.bands.iter().enumerate() {
            band.check()?;
            if let Some(other) = self.bands[..idx].iter().find(|other| other.overlaps(band)) {
                return Err(BandTableError::Overlap {
                    first: other.grade_label.clone(),
                    second: band.grade_label.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, band: GradeBand) {
        self.bands.push(band);
    }

    pub(crate) fn reorder(&mut self) {
        let bands = std::mem::take(&mut self.bands);
        *self = Self::ordered(bands);
    }
}

impl FromIterator<GradeBand> for GradeBandTable {
    fn from_iter<T: IntoIterator<Item = GradeBand>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a GradeBandTable {
    type Item = &'a GradeBand;
    type IntoIter = std::slice::Iter<'a, GradeBand>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}

/// Authoring-time problems with a band or a band table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BandTableError {
    #[error("grade label must not be empty")]
    EmptyLabel,
    #[error("band '{label}' has a non-numeric score bound")]
    NonFiniteBound { label: String },
    #[error("band '{label}' has non-numeric points")]
    NonFinitePoints { label: String },
    #[error("band '{label}': minimum score {min} exceeds maximum score {max}")]
    InvertedRange { label: String, min: f64, max: f64 },
    #[error("band '{second}' overlaps band '{first}'")]
    Overlap { first: String, second: String },
}
