//! # Evaluation Primitives
//!
//! Fixed constants for the evaluation engine.
//!
//! These are compiled into the binary and immutable at runtime. Anything a
//! school may reasonably want to tune (the promotion thresholds) lives in
//! [`crate::promotion::PromotionPolicy`] instead.

/// Scale of the fixed-point score representation.
///
/// A score is stored as hundredths of a point: `79.99` is `7999`.
pub const SCORE_SCALE: u16 = 100;

/// Highest valid score, in hundredths (100.00).
pub const MAX_SCORE_HUNDREDTHS: u16 = 100 * SCORE_SCALE;

/// Number of fractional digits kept when parsing a score.
///
/// Further digits are truncated, never rounded, so a score cannot be lifted
/// across a band boundary by parsing.
pub const SCORE_FRACTION_DIGITS: usize = 2;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of subjects in one term assessment.
pub const MAX_SUBJECTS: usize = 32;

/// Maximum length of a subject name, in bytes.
pub const MAX_SUBJECT_NAME_LENGTH: usize = 128;

/// Maximum length of a student identifier, in bytes.
pub const MAX_STUDENT_ID_LENGTH: usize = 64;

/// Maximum number of student reports in one class summary.
pub const MAX_CLASS_SIZE: usize = 500;

/// Maximum length of a class name, in bytes.
pub const MAX_CLASS_NAME_LENGTH: usize = 64;
