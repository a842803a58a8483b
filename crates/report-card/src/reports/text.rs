use std::fmt::Write;

use chrono::NaiveDate;
use html_escape::decode_html_entities;

use super::domain::StudentReport;
use crate::grading::NOT_AVAILABLE;

const NO_RESULTS: &str =
    "No scores found for this student in this batch. Report card cannot be fully generated.";

/// Plain-text rendering of a report card, one section per block of the printed card.
/// Remarks are stored HTML-escaped and are printed decoded.
pub fn render_plain_text(report: &StudentReport) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &StudentReport) -> std::fmt::Result {
    writeln!(out, "{}", report.school_name.to_uppercase())?;
    writeln!(
        out,
        "END OF {} REPORT CARD",
        report.term.to_uppercase()
    )?;
    writeln!(out, "NAME: {}", report.student_name)?;
    writeln!(out, "CLASS: {}", report.class_name)?;
    writeln!(out, "REPORT DATE: {}", long_date(report.generated_on))?;
    writeln!(out)?;

    if !report.has_results() {
        writeln!(out, "{NO_RESULTS}")?;
    } else {
        writeln!(
            out,
            "{:<24} {:>7} {:<6} {:>6}  {}",
            "SUBJECT", "E.O.T", "GRADE", "POINTS", "REMARKS"
        )?;
        for line in &report.subjects {
            writeln!(
                out,
                "{:<24} {:>7} {:<6} {:>6}  {}",
                line.subject_name,
                line.score_label(),
                line.grade,
                line.points,
                line.comment
            )?;
        }
        writeln!(out)?;
        writeln!(out, "PERFORMANCE SUMMARY")?;
        for row in &report.summary_rows {
            writeln!(out, "{}: {}", row.label, row.value)?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "Class Teacher's Remark: {}",
            decode_html_entities(&report.class_teacher_remark)
        )?;
        writeln!(
            out,
            "Head Teacher's Remark: {}",
            decode_html_entities(&report.head_teacher_remark)
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Term Ends: {}. Next Term Begins: {}",
        optional_date(report.term_end_date),
        optional_date(report.next_term_begin_date)
    )
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(long_date)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
