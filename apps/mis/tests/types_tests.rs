//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use mis::api::{
    CalendarQuery, CalendarResponse, ClassReportRequest, EvaluateRequest, GradeRequest,
    GradeResponse, HealthResponse, PolicyResponse, PromotionRequest, PromotionResponse,
    ScaleResponse, parse_failed_count, parse_score,
};
use mis_core::{Grade, MisError, PromotionPolicy, PromotionStatus, Remark, Score, Term};
use serde_json::json;

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "School MIS API");
    assert!(!health.version.is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
}

// =============================================================================
// SCORE PARSING TESTS
// =============================================================================

#[test]
fn test_parse_score_number_and_string() {
    assert_eq!(parse_score(&json!(80)).unwrap(), Score::from_points(80).unwrap());
    assert_eq!(
        parse_score(&json!(79.5)).unwrap(),
        Score::from_hundredths(7950).unwrap()
    );
    assert_eq!(
        parse_score(&json!(" 64.99 ")).unwrap(),
        Score::from_hundredths(6499).unwrap()
    );
}

#[test]
fn test_parse_score_exponent_numbers() {
    assert_eq!(parse_score(&json!(1e-7)).unwrap(), Score::ZERO);
    assert_eq!(
        parse_score(&json!(4.5e1)).unwrap(),
        Score::from_points(45).unwrap()
    );
    assert!(matches!(
        parse_score(&json!(1e3)),
        Err(MisError::ScoreOutOfRange(_))
    ));
}

#[test]
fn test_parse_score_rejects_non_numbers() {
    assert!(matches!(
        parse_score(&json!(true)),
        Err(MisError::InvalidScore(_))
    ));
    assert!(matches!(
        parse_score(&json!([80])),
        Err(MisError::InvalidScore(_))
    ));
    assert!(matches!(
        parse_score(&json!(-0.5)),
        Err(MisError::ScoreOutOfRange(_))
    ));
}

// =============================================================================
// GRADE REQUEST/RESPONSE TESTS
// =============================================================================

#[test]
fn test_grade_request_deserialization() {
    let request: GradeRequest = serde_json::from_str(r#"{"score": 55}"#).unwrap();
    assert_eq!(request.to_score().unwrap(), Score::from_points(55).unwrap());
}

#[test]
fn test_grade_response_success_serialization() {
    let response = GradeResponse::success(
        Score::from_hundredths(7550).unwrap(),
        Grade::B2,
        Remark::VeryGood,
    );
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["score"], 75.5);
    assert_eq!(json["grade"], "B2");
    assert_eq!(json["remark"], "Very Good");
    assert_eq!(json["band_min_score"], 75);
    assert!(json["error"].is_null());
}

#[test]
fn test_grade_response_error() {
    let response = GradeResponse::error("Invalid score: 101");
    assert!(!response.success);
    assert!(response.grade.is_none());
    assert_eq!(response.error.as_deref(), Some("Invalid score: 101"));
}

// =============================================================================
// PROMOTION REQUEST/RESPONSE TESTS
// =============================================================================

#[test]
fn test_promotion_request_to_input() {
    let request: PromotionRequest =
        serde_json::from_str(r#"{"average_score": "47.25", "failed_subjects": 3}"#).unwrap();
    let input = request.to_input().unwrap();
    assert_eq!(input.average_score, Score::from_hundredths(4725).unwrap());
    assert_eq!(input.failed_subjects, 3);
}

#[test]
fn test_promotion_request_negative_failed() {
    let request = PromotionRequest {
        average_score: json!(60),
        failed_subjects: json!(-2),
    };
    assert!(matches!(
        request.to_input(),
        Err(MisError::NegativeFailedCount(-2))
    ));
}

#[test]
fn test_parse_failed_count() {
    assert_eq!(parse_failed_count(&json!(3)).unwrap(), 3);
    assert_eq!(parse_failed_count(&json!(" 2 ")).unwrap(), 2);
    assert_eq!(parse_failed_count(&json!(u64::MAX)).unwrap(), i64::MAX);
    for bad in [json!(2.5), json!("two"), json!(null), json!([1])] {
        assert!(matches!(
            parse_failed_count(&bad),
            Err(MisError::InvalidFailedCount(_))
        ));
    }
}

#[test]
fn test_promotion_request_fractional_failed() {
    let request: PromotionRequest =
        serde_json::from_str(r#"{"average_score": 50, "failed_subjects": 2.5}"#).unwrap();
    assert!(matches!(
        request.to_input(),
        Err(MisError::InvalidFailedCount(_))
    ));
}

#[test]
fn test_promotion_response_serialization() {
    let response = PromotionResponse::success(PromotionStatus::Conditional);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "Conditional");
    assert_eq!(json["description"], PromotionStatus::Conditional.description());
}

// =============================================================================
// EVALUATE REQUEST TESTS
// =============================================================================

fn evaluate_request(subjects: serde_json::Value) -> EvaluateRequest {
    serde_json::from_value(json!({
        "student_id": "STU-010",
        "term": "second",
        "academic_year": "2024-2025",
        "subjects": subjects,
    }))
    .unwrap()
}

#[test]
fn test_evaluate_request_accepts_loose_term_and_year() {
    let assessment = evaluate_request(json!([{"subject": "History", "score": 58}]))
        .to_assessment()
        .unwrap();
    assert_eq!(assessment.term, Term::Second);
    assert_eq!(assessment.academic_year.to_string(), "2024/2025");
}

#[test]
fn test_evaluate_request_names_bad_subject() {
    let err = evaluate_request(json!([{"subject": "History", "score": "lots"}]))
        .to_assessment()
        .unwrap_err();
    match err {
        MisError::InvalidSubject(msg) => assert!(msg.contains("History")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_evaluate_request_too_many_subjects() {
    let subjects: Vec<_> = (0..40)
        .map(|i| json!({"subject": format!("Subject {}", i), "score": 50}))
        .collect();
    let err = evaluate_request(json!(subjects))
        .to_assessment()
        .unwrap_err();
    assert!(matches!(err, MisError::TooManySubjects { count: 40, .. }));
}

#[test]
fn test_evaluate_request_blank_student_rejected() {
    let mut request = evaluate_request(json!([{"subject": "History", "score": 58}]));
    request.student_id = "   ".to_string();
    assert!(matches!(
        request.to_assessment(),
        Err(MisError::InvalidStudentId(_))
    ));
}

// =============================================================================
// CLASS REPORT REQUEST TESTS
// =============================================================================

#[test]
fn test_class_report_request_empty_class() {
    let request = ClassReportRequest {
        class_name: "Basic 6".to_string(),
        assessments: Vec::new(),
    };
    let summary = request.summarize(&PromotionPolicy::default()).unwrap();
    assert_eq!(summary.student_count, 0);
    assert!(summary.class_average.is_none());
    assert!(summary.term.is_none());
    assert_eq!(summary.grade_distribution.len(), 9);
    assert!(summary.positions.is_empty());
}

#[test]
fn test_class_report_request_ties_share_position() {
    let request = ClassReportRequest {
        class_name: "Basic 6".to_string(),
        assessments: vec![
            evaluate_request(json!([{"subject": "History", "score": 60}])),
            {
                let mut other = evaluate_request(json!([{"subject": "History", "score": 60}]));
                other.student_id = "STU-009".to_string();
                other
            },
            {
                let mut other = evaluate_request(json!([{"subject": "History", "score": 50}]));
                other.student_id = "STU-001".to_string();
                other
            },
        ],
    };
    let summary = request.summarize(&PromotionPolicy::default()).unwrap();
    let positions: Vec<usize> = summary.positions.iter().map(|p| p.position).collect();
    assert_eq!(positions, vec![1, 1, 3]);
    assert_eq!(summary.positions[0].student_id.as_str(), "STU-009");
}

// =============================================================================
// CALENDAR TESTS
// =============================================================================

#[test]
fn test_calendar_query_defaults_to_today() {
    let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    assert_eq!(CalendarQuery::default().to_date(today).unwrap(), today);
    let blank = CalendarQuery {
        date: Some(String::new()),
    };
    assert_eq!(blank.to_date(today).unwrap(), today);
}

#[test]
fn test_calendar_response_periods() {
    let january = CalendarResponse::success(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
    assert_eq!(january.term, Some(Term::First));
    assert_eq!(january.academic_year.unwrap().to_string(), "2025/2026");

    let june = CalendarResponse::success(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap());
    assert_eq!(june.term, Some(Term::Second));

    let json = serde_json::to_value(&january).unwrap();
    assert_eq!(json["term"], "First Term");
    assert_eq!(json["academic_year"], "2025/2026");
}

// =============================================================================
// SCALE / POLICY TESTS
// =============================================================================

#[test]
fn test_scale_response_roundtrip() {
    let scale = ScaleResponse::default();
    let json = serde_json::to_string(&scale).unwrap();
    let parsed: ScaleResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.bands, scale.bands);
}

#[test]
fn test_policy_response_from_policy() {
    let response = PolicyResponse::from(&PromotionPolicy::default());
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["promoted_min_average"], 50);
    assert_eq!(json["conditional_max_failed"], 3);
}
