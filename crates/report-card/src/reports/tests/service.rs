use std::sync::Arc;

use super::common::*;
use crate::grading::{Classification, Division, GradingEngine, OverallSummary, SchoolType};
use crate::reports::{
    BatchId, ManualRemarks, ReportCardService, ReportServiceError, RepositoryError, StudentId,
    SubjectResult,
};

fn student(id: &str) -> StudentId {
    StudentId(id.to_string())
}

#[test]
fn explicit_batch_policy_wins_over_school_default() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    fx.policies.add(pass_fail_policy("pol-pf", SchoolType::Primary));
    let batch = batch("b-1", "primary_upper", Some("pol-pf"));
    fx.scores.add_batch(batch.clone());
    fx.scores.add_student(
        &batch.id,
        "s-1",
        "Amina Nakato",
        vec![SubjectResult::new("MTC", Some(85.0))],
    );

    let report = fx
        .service
        .student_report(&batch.id, &student("s-1"), today())
        .expect("report builds");

    assert_eq!(report.subjects[0].grade, "PASS");
}

#[test]
fn school_default_policy_applies_without_explicit_policy() {
    let fx = fixture();
    fx.policies.add(pass_fail_policy("pol-pf", SchoolType::Primary));
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-1", "primary_upper", None);
    fx.scores.add_batch(batch.clone());

    let resolved = fx
        .service
        .resolve_policy(&batch)
        .expect("lookup succeeds")
        .expect("default policy found");

    assert_eq!(resolved.id.0, "pol-nine");
}

#[test]
fn missing_explicit_policy_falls_back_to_default() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-1", "primary_upper", Some("pol-deleted"));

    let bands = fx.service.band_table(&batch).expect("lookup succeeds");

    assert_eq!(bands.len(), 9);
}

#[test]
fn any_school_type_default_is_used_when_no_exact_match() {
    let fx = fixture();
    fx.policies
        .add(pass_fail_policy("pol-any", SchoolType::Any).as_default());
    let batch = batch("b-1", "primary_upper", None);

    let resolved = fx
        .service
        .resolve_policy(&batch)
        .expect("lookup succeeds")
        .expect("shared default found");

    assert_eq!(resolved.id.0, "pol-any");
}

#[test]
fn batch_without_any_policy_degrades_to_ungraded_lines() {
    let fx = fixture();
    let batch = batch("b-1", "primary_upper", None);
    fx.scores.add_batch(batch.clone());
    fx.scores.add_student(
        &batch.id,
        "s-1",
        "Amina Nakato",
        core_results([Some(81.0), Some(76.0), Some(71.0), Some(66.0)]),
    );

    let report = fx
        .service
        .student_report(&batch.id, &student("s-1"), today())
        .expect("report builds");

    for line in &report.subjects {
        assert_eq!(line.classification, Classification::Unclassified);
        assert_eq!(line.grade, "-");
        assert_eq!(line.points, "-");
        assert_eq!(line.comment, "N/A");
    }
    let upper = report
        .summary
        .as_ref()
        .and_then(OverallSummary::as_upper)
        .expect("upper summary");
    assert_eq!(upper.division, Division::X);
}

#[test]
fn lower_tier_report_carries_average_summary_and_remarks() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-lower", "primary_lower (P1-P3)", None);
    fx.scores.add_batch(batch.clone());
    fx.scores.add_student(
        &batch.id,
        "s-1",
        "Amina Grace Nakato",
        core_results([Some(70.0), Some(80.0), None, Some(90.0)]),
    );

    let report = fx
        .service
        .student_report(&batch.id, &student("s-1"), today())
        .expect("report builds");

    let lower = report
        .summary
        .as_ref()
        .and_then(OverallSummary::as_lower)
        .expect("lower summary");
    assert_eq!(lower.total_score, 240.0);
    assert_eq!(lower.average_score, 80.0);
    assert_eq!(lower.class_size, Some(38));
    assert_eq!(report.summary_rows[1].value, "80.00%");
    assert_eq!(report.summary_rows[3].value, "- out of 38");
    assert!(report
        .class_teacher_remark
        .starts_with("Amina has demonstrated excellent understanding"));
    assert!(report.head_teacher_remark.contains("Hillside Primary is proud"));
    assert_eq!(report.subjects[2].grade, "-");
    assert_eq!(report.subjects[2].score_label(), "-");
    assert_eq!(report.term, "Term II 2024");
    assert_eq!(report.generated_on, today());
}

#[test]
fn upper_tier_report_names_division_in_remarks() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-upper", "primary_upper", None);
    fx.scores.add_batch(batch.clone());
    fx.scores.add_student(
        &batch.id,
        "s-2",
        "Brian Okello",
        core_results([Some(81.0), Some(76.0), Some(71.0), Some(66.0)]),
    );

    let report = fx
        .service
        .student_report(&batch.id, &student("s-2"), today())
        .expect("report builds");

    let upper = report
        .summary
        .as_ref()
        .and_then(OverallSummary::as_upper)
        .expect("upper summary");
    assert_eq!(upper.aggregate_points, 10);
    assert_eq!(upper.division, Division::I);
    assert_eq!(report.summary_rows.len(), 3);
    assert_eq!(report.summary_rows[2].value, "38");
    assert!(report
        .head_teacher_remark
        .contains("congratulates you on achieving Division I with 10 aggregates"));
}

#[test]
fn manual_remarks_replace_generated_text() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-1", "primary_upper", None);
    fx.scores.add_batch(batch.clone());
    fx.scores.add_student(
        &batch.id,
        "s-1",
        "Amina Nakato",
        core_results([Some(81.0), Some(76.0), Some(71.0), Some(66.0)]),
    );
    fx.scores.set_remarks(
        &batch.id,
        "s-1",
        ManualRemarks {
            class_teacher: Some("Talk to me about the science project.".to_string()),
            head_teacher: Some("   ".to_string()),
        },
    );

    let report = fx
        .service
        .student_report(&batch.id, &student("s-1"), today())
        .expect("report builds");

    assert_eq!(
        report.class_teacher_remark,
        "Talk to me about the science project."
    );
    assert!(report.head_teacher_remark.starts_with("Excellent performance, Amina!"));
}

#[test]
fn subject_remark_replaces_band_comment() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-1", "primary_upper", None);
    fx.scores.add_batch(batch.clone());
    let mut maths = SubjectResult::new("MTC", Some(82.0));
    maths.subject_name = Some("Mathematics".to_string());
    maths.remark = Some("Excellent problem solving".to_string());
    maths.teacher_initials = Some("J.K".to_string());
    fx.scores.add_student(
        &batch.id,
        "s-1",
        "Amina Nakato",
        vec![maths, SubjectResult::new("ENG", Some(64.0))],
    );

    let report = fx
        .service
        .student_report(&batch.id, &student("s-1"), today())
        .expect("report builds");

    assert_eq!(report.subjects[0].subject_name, "Mathematics");
    assert_eq!(report.subjects[0].comment, "Excellent problem solving");
    assert_eq!(report.subjects[0].teacher_initials, "J.K");
    assert_eq!(report.subjects[1].subject_name, "ENG");
    assert_eq!(report.subjects[1].comment, "Credit");
    assert_eq!(report.subjects[1].teacher_initials, "-");
}

#[test]
fn student_without_results_gets_awaiting_remarks() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-1", "primary_lower", None);
    fx.scores.add_batch(batch.clone());
    fx.scores.add_student(&batch.id, "s-1", "Amina Nakato", Vec::new());

    let report = fx
        .service
        .student_report(&batch.id, &student("s-1"), today())
        .expect("report builds");

    assert!(!report.has_results());
    assert!(report.summary.is_none());
    assert!(report.summary_rows.is_empty());
    assert!(report
        .class_teacher_remark
        .starts_with("Awaiting overall assessment"));
}

#[test]
fn batch_reports_read_roster_once() {
    let fx = fixture();
    fx.policies.add(nine_point_policy("pol-nine").as_default());
    let batch = batch("b-1", "primary_upper", None);
    fx.scores.add_batch(batch.clone());
    for (id, name) in [("s-1", "Amina Nakato"), ("s-2", "Brian Okello"), ("s-3", "Cate Atim")] {
        fx.scores.add_student(
            &batch.id,
            id,
            name,
            core_results([Some(55.0), Some(62.0), Some(48.0), Some(71.0)]),
        );
    }

    let reports = fx
        .service
        .batch_reports(&batch.id, today())
        .expect("batch builds");

    let names: Vec<&str> = reports
        .iter()
        .map(|report| report.student_name.as_str())
        .collect();
    assert_eq!(names, vec!["Amina Nakato", "Brian Okello", "Cate Atim"]);
    assert_eq!(fx.roster.lookups(), 1);
}

#[test]
fn unknown_batch_and_student_are_reported() {
    let fx = fixture();
    let batch = batch("b-1", "primary_upper", None);
    fx.scores.add_batch(batch.clone());

    let missing_batch = fx
        .service
        .batch_reports(&BatchId("b-404".to_string()), today());
    let missing_student = fx
        .service
        .student_report(&batch.id, &student("s-404"), today());

    assert!(matches!(
        missing_batch,
        Err(ReportServiceError::BatchNotFound(ref id)) if id.0 == "b-404"
    ));
    assert!(matches!(
        missing_student,
        Err(ReportServiceError::StudentNotFound { .. })
    ));
}

#[test]
fn repository_outage_surfaces_as_repository_error() {
    let service = ReportCardService::new(
        Arc::new(UnavailableScores),
        Arc::new(MemoryPolicies::default()),
        Arc::new(CountingRoster::with_size(10)),
        Arc::new(GradingEngine::default()),
    );

    let result = service.batch_reports(&BatchId("b-1".to_string()), today());

    assert!(matches!(
        result,
        Err(ReportServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}

#[test]
fn configured_school_name_fills_blank_batch_name() {
    let scores = MemoryScores::default();
    let policies = MemoryPolicies::default();
    policies.add(nine_point_policy("pol-nine").as_default());
    let service = ReportCardService::new(
        Arc::new(scores.clone()),
        Arc::new(policies),
        Arc::new(CountingRoster::default()),
        Arc::new(GradingEngine::default()),
    )
    .with_default_school_name(Some("Kampala Junior".to_string()));
    let mut batch = batch("b-1", "primary_lower", None);
    batch.school_name = String::new();
    scores.add_batch(batch.clone());
    scores.add_student(
        &batch.id,
        "s-1",
        "Amina Nakato",
        core_results([Some(62.0), Some(64.0), Some(66.0), Some(68.0)]),
    );

    let report = service
        .student_report(&batch.id, &student("s-1"), today())
        .expect("report builds");

    assert!(report.head_teacher_remark.contains("Kampala Junior appreciates"));
    assert_eq!(report.summary_rows[3].value, "- out of -");
}
