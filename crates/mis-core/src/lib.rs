//! # mis-core
//!
//! The Assessment Evaluation Engine for the school MIS - THE ENGINE.
//!
//! This crate holds the only decision logic in the system: converting raw
//! scores into grades and remarks, and term averages plus failed-subject
//! counts into promotion decisions. Around that it offers the pure
//! aggregation the reporting layer needs (term reports, class summaries)
//! and the academic calendar.
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network, NO persistence (pure Rust)
//! - Stateless: every operation is a function of its arguments
//! - Fixed-point scores: no floating-point arithmetic anywhere
//! - Input is validated when values are constructed; the classifiers
//!   themselves are total and never fail

// =============================================================================
// MODULES
// =============================================================================

pub mod assessment;
pub mod calendar;
pub mod grading;
pub mod primitives;
pub mod promotion;
pub mod report;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{MisError, Score, StudentId, Subject};

// =============================================================================
// RE-EXPORTS: Evaluation Engine
// =============================================================================

pub use grading::{
    GRADE_SCALE, Grade, GradeBand, GradeResult, Remark, band_for_grade, grade_for_score,
};
pub use promotion::{PromotionInput, PromotionPolicy, PromotionStatus, promotion_status};

// =============================================================================
// RE-EXPORTS: Reports and Calendar
// =============================================================================

pub use assessment::{AssessmentReport, SubjectResult, SubjectScore, TermAssessment};
pub use calendar::{AcademicPeriod, AcademicYear, Term};
pub use report::{ClassPosition, ClassSummary, StatusCounts, SubjectAverage};
