//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Request bodies are kept loose (`serde_json::Value` for scores and
//! counts, plain strings for names) so that validation happens in the
//! `to_*` conversions. Bodies that are not JSON or miss a field are
//! rejected by the handlers with the same `400` shape.

use mis_core::{
    AcademicYear, AssessmentReport, ClassSummary, GRADE_SCALE, Grade, GradeBand, MisError,
    PromotionInput, PromotionPolicy, PromotionStatus, Remark, Score, StudentId, Subject,
    SubjectScore, Term, TermAssessment, band_for_grade,
    primitives::{MAX_CLASS_SIZE, MAX_SUBJECTS},
};
use serde::{Deserialize, Serialize};

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "School MIS API";

/// Parse a score sent as a JSON number or numeric string.
///
/// Numbers go through `f64`'s `Display`, which never uses exponent
/// notation, so `1e-7` parses like `0.0000001`.
pub fn parse_score(value: &serde_json::Value) -> Result<Score, MisError> {
    match value {
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => v.to_string().parse(),
            _ => Err(MisError::InvalidScore(n.to_string())),
        },
        serde_json::Value::String(s) => s.parse(),
        other => Err(MisError::InvalidScore(other.to_string())),
    }
}

/// Parse a failed-subject count sent as a JSON integer or integer string.
///
/// Counts past `i64::MAX` saturate; they classify the same as any other
/// count above the thresholds.
pub fn parse_failed_count(value: &serde_json::Value) -> Result<i64, MisError> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .ok_or_else(|| MisError::InvalidFailedCount(n.to_string())),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| MisError::InvalidFailedCount(s.clone())),
        other => Err(MisError::InvalidFailedCount(other.to_string())),
    }
}

/// Body for requests rejected before reaching a handler (auth, rate limit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =============================================================================
// GRADING SCALE RESPONSE
// =============================================================================

/// Grading scale response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleResponse {
    pub bands: Vec<GradeBand>,
}

impl Default for ScaleResponse {
    fn default() -> Self {
        Self {
            bands: GRADE_SCALE.to_vec(),
        }
    }
}

// =============================================================================
// POLICY RESPONSE
// =============================================================================

/// Active promotion thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResponse {
    pub promoted_min_average: Score,
    pub promoted_max_failed: u32,
    pub conditional_min_average: Score,
    pub conditional_max_failed: u32,
}

impl From<&PromotionPolicy> for PolicyResponse {
    fn from(policy: &PromotionPolicy) -> Self {
        Self {
            promoted_min_average: policy.promoted_min_average(),
            promoted_max_failed: policy.promoted_max_failed(),
            conditional_min_average: policy.conditional_min_average(),
            conditional_max_failed: policy.conditional_max_failed(),
        }
    }
}

// =============================================================================
// GRADE REQUEST/RESPONSE
// =============================================================================

/// Grade a single score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    pub score: serde_json::Value,
}

impl GradeRequest {
    pub fn to_score(&self) -> Result<Score, MisError> {
        parse_score(&self.score)
    }
}

/// Grade response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResponse {
    pub success: bool,
    pub score: Option<Score>,
    pub grade: Option<Grade>,
    pub remark: Option<Remark>,
    /// Lowest score of the band the grade belongs to.
    pub band_min_score: Option<Score>,
    pub error: Option<String>,
}

impl GradeResponse {
    pub fn success(score: Score, grade: Grade, remark: Remark) -> Self {
        Self {
            success: true,
            score: Some(score),
            grade: Some(grade),
            remark: Some(remark),
            band_min_score: Some(band_for_grade(grade).min_score),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            score: None,
            grade: None,
            remark: None,
            band_min_score: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// PROMOTION REQUEST/RESPONSE
// =============================================================================

/// Promotion status request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionRequest {
    pub average_score: serde_json::Value,
    pub failed_subjects: serde_json::Value,
}

impl PromotionRequest {
    /// Validate the average and failed count.
    pub fn to_input(&self) -> Result<PromotionInput, MisError> {
        let average = parse_score(&self.average_score)?;
        let failed = parse_failed_count(&self.failed_subjects)?;
        PromotionInput::new(average, failed)
    }
}

/// Promotion status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionResponse {
    pub success: bool,
    pub status: Option<PromotionStatus>,
    pub description: Option<String>,
    pub error: Option<String>,
}

impl PromotionResponse {
    pub fn success(status: PromotionStatus) -> Self {
        Self {
            success: true,
            status: Some(status),
            description: Some(status.description().to_string()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            description: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// EVALUATE REQUEST/RESPONSE
// =============================================================================

/// One subject score as sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectScoreJson {
    pub subject: String,
    pub score: serde_json::Value,
}

/// Term assessment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub student_id: String,
    pub term: String,
    pub academic_year: String,
    pub subjects: Vec<SubjectScoreJson>,
}

impl EvaluateRequest {
    /// Convert to a `TermAssessment`, validating every field.
    ///
    /// The subject count is checked before any subject is parsed so an
    /// oversized body is rejected without further work.
    pub fn to_assessment(&self) -> Result<TermAssessment, MisError> {
        if self.subjects.len() > MAX_SUBJECTS {
            return Err(MisError::TooManySubjects {
                count: self.subjects.len(),
                max: MAX_SUBJECTS,
            });
        }

        let subjects = self
            .subjects
            .iter()
            .map(|entry| {
                let subject = Subject::new(entry.subject.as_str())?;
                let score = parse_score(&entry.score).map_err(|e| {
                    MisError::InvalidSubject(format!("{}: {}", subject, e))
                })?;
                Ok(SubjectScore::new(subject, score))
            })
            .collect::<Result<Vec<_>, MisError>>()?;

        let assessment = TermAssessment {
            student_id: StudentId::new(self.student_id.as_str())?,
            term: self.term.parse::<Term>()?,
            academic_year: self.academic_year.parse::<AcademicYear>()?,
            subjects,
        };
        assessment.validate()?;
        Ok(assessment)
    }
}

/// Term assessment response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub success: bool,
    pub report: Option<AssessmentReport>,
    pub best_grade: Option<Grade>,
    pub error: Option<String>,
}

impl EvaluateResponse {
    pub fn success(report: AssessmentReport) -> Self {
        Self {
            success: true,
            best_grade: report.best_grade(),
            report: Some(report),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            report: None,
            best_grade: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// CLASS REPORT REQUEST/RESPONSE
// =============================================================================

/// Class report request: every student's assessment for one term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReportRequest {
    pub class_name: String,
    pub assessments: Vec<EvaluateRequest>,
}

impl ClassReportRequest {
    /// Evaluate every assessment and summarize the class.
    pub fn summarize(&self, policy: &PromotionPolicy) -> Result<ClassSummary, MisError> {
        if self.assessments.len() > MAX_CLASS_SIZE {
            return Err(MisError::TooManyStudents {
                count: self.assessments.len(),
                max: MAX_CLASS_SIZE,
            });
        }

        let reports = self
            .assessments
            .iter()
            .map(|request| {
                let assessment = request.to_assessment()?;
                assessment.evaluate(policy)
            })
            .collect::<Result<Vec<_>, MisError>>()?;

        ClassSummary::summarize(&self.class_name, &reports)
    }
}

/// Class report response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReportResponse {
    pub success: bool,
    pub summary: Option<ClassSummary>,
    pub error: Option<String>,
}

impl ClassReportResponse {
    pub fn success(summary: ClassSummary) -> Self {
        Self {
            success: true,
            summary: Some(summary),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// CALENDAR QUERY/RESPONSE
// =============================================================================

/// Optional `?date=YYYY-MM-DD`; today when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub date: Option<String>,
}

impl CalendarQuery {
    /// Resolve the requested date, falling back to `today`.
    pub fn to_date(&self, today: chrono::NaiveDate) -> Result<chrono::NaiveDate, MisError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(today),
            Some(text) => chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| {
                MisError::SerializationError(format!("Invalid date {:?}: {}", text, e))
            }),
        }
    }
}

/// Academic calendar response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub success: bool,
    pub date: Option<String>,
    pub academic_year: Option<AcademicYear>,
    pub term: Option<Term>,
    pub error: Option<String>,
}

impl CalendarResponse {
    pub fn success(date: chrono::NaiveDate) -> Self {
        let period = mis_core::AcademicPeriod::for_date(date);
        Self {
            success: true,
            date: Some(date.format("%Y-%m-%d").to_string()),
            academic_year: Some(period.academic_year),
            term: Some(period.term),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            date: None,
            academic_year: None,
            term: None,
            error: Some(msg.into()),
        }
    }
}
