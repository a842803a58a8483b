use crate::grading::{GradeBand, GradeBandTable, SubjectScore};

/// Ugandan-style nine point scale: D1 is best, F9 fails.
pub(super) fn nine_point_bands() -> GradeBandTable {
    GradeBandTable::new(vec![
        GradeBand::new("D1", 80.0, 100.0, Some(1.0), "Distinction"),
        GradeBand::new("D2", 75.0, 79.99, Some(2.0), "Distinction"),
        GradeBand::new("C3", 70.0, 74.99, Some(3.0), "Credit"),
        GradeBand::new("C4", 65.0, 69.99, Some(4.0), "Credit"),
        GradeBand::new("C5", 60.0, 64.99, Some(5.0), "Credit"),
        GradeBand::new("C6", 50.0, 59.99, Some(6.0), "Credit"),
        GradeBand::new("P7", 45.0, 49.99, Some(7.0), "Pass"),
        GradeBand::new("P8", 40.0, 44.99, Some(8.0), "Pass"),
        GradeBand::new("F9", 0.0, 39.99, Some(9.0), "Fail"),
    ])
}

/// Bands with a gap between 40 and 50 and nothing above 90.
pub(super) fn gapped_bands() -> GradeBandTable {
    GradeBandTable::new(vec![
        GradeBand::new("A", 70.0, 90.0, Some(1.0), "Very good"),
        GradeBand::new("B", 50.0, 69.99, Some(2.0), "Good"),
        GradeBand::new("F", 0.0, 39.99, Some(9.0), "Fail"),
    ])
}

pub(super) fn core_subjects() -> Vec<String> {
    ["MTC", "ENG", "SCI", "SST"]
        .iter()
        .map(|code| code.to_string())
        .collect()
}

pub(super) fn score(code: &str, value: Option<f64>) -> SubjectScore {
    SubjectScore::new(code, value)
}
