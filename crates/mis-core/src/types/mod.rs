//! # Core Type Definitions
//!
//! This module contains the value types shared by every engine module:
//! - The fixed-point [`Score`]
//! - Identifiers (`StudentId`, `Subject`)
//! - Error types (`MisError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Validate on construction, so engine functions over them are total

use crate::primitives::{
    MAX_SCORE_HUNDREDTHS, MAX_STUDENT_ID_LENGTH, MAX_SUBJECT_NAME_LENGTH, SCORE_FRACTION_DIGITS,
    SCORE_SCALE,
};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// SCORE
// =============================================================================

/// A score in the inclusive range 0–100, stored as hundredths of a point.
///
/// Out-of-range and malformed input is rejected at construction; a `Score`
/// that exists is always in domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(u16);

impl Score {
    /// Score of zero.
    pub const ZERO: Score = Score(0);

    /// Score of one hundred.
    pub const MAX: Score = Score(MAX_SCORE_HUNDREDTHS);

    /// Build a score from a whole number of hundredths without validation.
    /// Only for compile-time constants inside the crate.
    pub(crate) const fn from_hundredths_unchecked(hundredths: u16) -> Self {
        Self(hundredths)
    }

    /// Build a score from hundredths of a point (`7999` is `79.99`).
    pub fn from_hundredths(hundredths: u32) -> Result<Self, MisError> {
        if hundredths > u32::from(MAX_SCORE_HUNDREDTHS) {
            return Err(MisError::ScoreOutOfRange(format_hundredths(hundredths)));
        }
        Ok(Self(hundredths as u16))
    }

    /// Build a score from whole points (`80` is `80.00`).
    pub fn from_points(points: u32) -> Result<Self, MisError> {
        let hundredths = points
            .checked_mul(u32::from(SCORE_SCALE))
            .ok_or_else(|| MisError::ScoreOutOfRange(points.to_string()))?;
        Self::from_hundredths(hundredths)
    }

    /// Raw fixed-point value.
    #[must_use]
    pub const fn hundredths(self) -> u16 {
        self.0
    }

    /// Whole-point part of the score.
    #[must_use]
    pub const fn whole_points(self) -> u16 {
        self.0 / SCORE_SCALE
    }

    /// Floor of the arithmetic mean of `scores`, or `None` when empty.
    ///
    /// The mean of in-range scores is itself in range, so this never fails.
    #[must_use]
    pub fn floor_mean<I>(scores: I) -> Option<Score>
    where
        I: IntoIterator<Item = Score>,
    {
        let (sum, count) = scores
            .into_iter()
            .fold((0u64, 0u64), |(sum, count), s| {
                (sum.saturating_add(u64::from(s.0)), count.saturating_add(1))
            });

        if count == 0 {
            return None;
        }
        Some(Score((sum / count) as u16))
    }
}

fn format_hundredths(hundredths: u32) -> String {
    let scale = u32::from(SCORE_SCALE);
    let whole = hundredths / scale;
    let fraction = hundredths % scale;
    match fraction {
        0 => whole.to_string(),
        f if f % 10 == 0 => format!("{}.{}", whole, f / 10),
        f => format!("{}.{:02}", whole, f),
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_hundredths(u32::from(self.0)))
    }
}

impl FromStr for Score {
    type Err = MisError;

    /// Parse decimal text such as `"80"`, `"79.99"` or `".5"`.
    ///
    /// Digits past the second decimal place are truncated. Exponents, signs
    /// other than a leading `+`, and anything below zero or above 100 are
    /// rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || MisError::InvalidScore(text.to_string());
        let out_of_range = || MisError::ScoreOutOfRange(text.to_string());

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let int_digits = int_part.trim_start_matches('0');
        let is_zero = int_digits.is_empty() && frac_part.bytes().all(|b| b == b'0');
        if negative && !is_zero {
            return Err(out_of_range());
        }
        // Anything with more than three integer digits cannot be <= 100
        if int_digits.len() > 3 {
            return Err(out_of_range());
        }

        let whole: u32 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| invalid())?
        };

        let digit_at = |i: usize| {
            frac_part
                .as_bytes()
                .get(i)
                .map_or(0, |b| u32::from(b.saturating_sub(b'0')))
        };
        let hundredths = whole
            .saturating_mul(u32::from(SCORE_SCALE))
            .saturating_add(digit_at(0).saturating_mul(10))
            .saturating_add(digit_at(1));

        // 100.001 truncates to 100.00 but is still above the domain
        let truncated_nonzero = frac_part
            .bytes()
            .skip(SCORE_FRACTION_DIGITS)
            .any(|b| b != b'0');
        if hundredths >= u32::from(MAX_SCORE_HUNDREDTHS) && truncated_nonzero {
            return Err(out_of_range());
        }

        Score::from_hundredths(hundredths).map_err(|_| out_of_range())
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % SCORE_SCALE == 0 {
            return serializer.serialize_u16(self.whole_points());
        }
        // Shortest decimal text round-trips exactly through f64 parsing
        let value: f64 = self
            .to_string()
            .parse()
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_f64(value)
    }
}

struct ScoreVisitor;

impl Visitor<'_> for ScoreVisitor {
    type Value = Score;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a score between 0 and 100")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Score, E> {
        let points =
            u32::try_from(v).map_err(|_| E::custom(MisError::ScoreOutOfRange(v.to_string())))?;
        Score::from_points(points).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Score, E> {
        match u64::try_from(v) {
            Ok(unsigned) => self.visit_u64(unsigned),
            Err(_) => Err(E::custom(MisError::ScoreOutOfRange(v.to_string()))),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Score, E> {
        if !v.is_finite() {
            return Err(E::custom(MisError::InvalidScore(v.to_string())));
        }
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Score, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScoreVisitor)
    }
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a student as issued by the records system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct StudentId(String);

impl StudentId {
    /// Create a student id, rejecting empty or oversized values.
    pub fn new(s: impl Into<String>) -> Result<Self, MisError> {
        let id = s.into().trim().to_string();
        if id.is_empty() {
            return Err(MisError::InvalidStudentId("empty".to_string()));
        }
        if id.len() > MAX_STUDENT_ID_LENGTH {
            return Err(MisError::InvalidStudentId(format!(
                "length {} exceeds maximum {} bytes",
                id.len(),
                MAX_STUDENT_ID_LENGTH
            )));
        }
        Ok(Self(id))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StudentId {
    type Error = MisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Name of a subject (e.g. "Core Mathematics").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Subject(String);

impl Subject {
    /// Create a subject name. Surrounding whitespace is removed.
    pub fn new(s: impl Into<String>) -> Result<Self, MisError> {
        let name = s.into().trim().to_string();
        if name.is_empty() {
            return Err(MisError::InvalidSubject("empty subject name".to_string()));
        }
        if name.len() > MAX_SUBJECT_NAME_LENGTH {
            return Err(MisError::InvalidSubject(format!(
                "subject name length {} exceeds maximum {} bytes",
                name.len(),
                MAX_SUBJECT_NAME_LENGTH
            )));
        }
        Ok(Self(name))
    }

    /// Get the subject name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive key used for duplicate detection and grouping.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl TryFrom<String> for Subject {
    type Error = MisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the MIS engine.
///
/// - Raised only while validating input; classification never fails
/// - Use `Result<T, MisError>` for fallible operations
#[derive(Debug, Error)]
pub enum MisError {
    /// The score text is not a plain decimal number.
    #[error("Invalid score: {0:?}")]
    InvalidScore(String),

    /// The score is below 0 or above 100.
    #[error("Score {0} is outside the range 0-100")]
    ScoreOutOfRange(String),

    /// A failed-subject count below zero.
    #[error("Failed subject count cannot be negative: {0}")]
    NegativeFailedCount(i64),

    /// A failed-subject count that is not a whole number.
    #[error("Invalid failed subject count: {0}")]
    InvalidFailedCount(String),

    /// An assessment without any subjects.
    #[error("Assessment has no subjects")]
    EmptyAssessment,

    /// An assessment with more subjects than allowed.
    #[error("Subject count {count} exceeds maximum {max}")]
    TooManySubjects { count: usize, max: usize },

    /// A class summary over more reports than allowed.
    #[error("Student count {count} exceeds maximum {max}")]
    TooManyStudents { count: usize, max: usize },

    /// A malformed student identifier.
    #[error("Invalid student id: {0}")]
    InvalidStudentId(String),

    /// A malformed subject name.
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    /// The same subject appears twice in one assessment.
    #[error("Duplicate subject: {0}")]
    DuplicateSubject(String),

    /// The same student appears twice in one class summary.
    #[error("Duplicate student: {0}")]
    DuplicateStudent(String),

    /// A malformed class name.
    #[error("Invalid class name: {0}")]
    InvalidClassName(String),

    /// An academic year that is not `YYYY/YYYY+1`.
    #[error("Invalid academic year: {0:?}")]
    InvalidAcademicYear(String),

    /// An unknown term name.
    #[error("Invalid term: {0:?}")]
    InvalidTerm(String),

    /// Reports from different terms or academic years mixed in one summary.
    #[error("Reports span different periods: {0}")]
    MismatchedPeriod(String),

    /// Promotion thresholds that contradict each other.
    #[error("Invalid promotion policy: {0}")]
    InvalidPolicy(String),

    /// A configuration file or override could not be applied.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn score(s: &str) -> Score {
        s.parse().expect("valid score")
    }

    #[test]
    fn parses_whole_and_fractional_scores() {
        assert_eq!(score("80").hundredths(), 8000);
        assert_eq!(score("79.99").hundredths(), 7999);
        assert_eq!(score("79.9").hundredths(), 7990);
        assert_eq!(score(".5").hundredths(), 50);
        assert_eq!(score("0").hundredths(), 0);
        assert_eq!(score("100").hundredths(), 10000);
        assert_eq!(score(" +45 ").hundredths(), 4500);
    }

    #[test]
    fn truncates_extra_fraction_digits() {
        assert_eq!(score("44.999").hundredths(), 4499);
        assert_eq!(score("100.000").hundredths(), 10000);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!("-1".parse::<Score>(), Err(MisError::ScoreOutOfRange(_))));
        assert!(matches!("-0.01".parse::<Score>(), Err(MisError::ScoreOutOfRange(_))));
        assert!(matches!("100.01".parse::<Score>(), Err(MisError::ScoreOutOfRange(_))));
        assert!(matches!("100.001".parse::<Score>(), Err(MisError::ScoreOutOfRange(_))));
        assert!(matches!("1000".parse::<Score>(), Err(MisError::ScoreOutOfRange(_))));
    }

    #[test]
    fn negative_zero_is_zero() {
        assert_eq!(score("-0").hundredths(), 0);
        assert_eq!(score("-0.00").hundredths(), 0);
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", ".", "abc", "1e2", "12.3.4", "--5", "5-", "NaN"] {
            assert!(
                matches!(bad.parse::<Score>(), Err(MisError::InvalidScore(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(score("80").to_string(), "80");
        assert_eq!(score("79.5").to_string(), "79.5");
        assert_eq!(score("79.05").to_string(), "79.05");
    }

    #[test]
    fn from_points_bounds() {
        assert!(Score::from_points(100).is_ok());
        assert!(Score::from_points(101).is_err());
        assert!(Score::from_points(u32::MAX).is_err());
    }

    #[test]
    fn floor_mean_truncates() {
        let scores = [score("50"), score("49.99")];
        assert_eq!(Score::floor_mean(scores), Some(score("49.99")));
        assert_eq!(Score::floor_mean([score("1"), score("0"), score("0")]), Some(score("0.33")));
        assert_eq!(Score::floor_mean(std::iter::empty()), None);
    }

    #[test]
    fn score_json_shape() {
        assert_eq!(serde_json::to_string(&score("80")).expect("ser"), "80");
        assert_eq!(serde_json::to_string(&score("79.99")).expect("ser"), "79.99");

        let parsed: Score = serde_json::from_str("79.99").expect("de");
        assert_eq!(parsed.hundredths(), 7999);
        let parsed: Score = serde_json::from_str("\"45\"").expect("de");
        assert_eq!(parsed.hundredths(), 4500);
        assert!(serde_json::from_str::<Score>("-3").is_err());
        assert!(serde_json::from_str::<Score>("101").is_err());
    }

    #[test]
    fn subject_validation() {
        assert!(Subject::new("  ").is_err());
        assert!(Subject::new("x".repeat(MAX_SUBJECT_NAME_LENGTH + 1)).is_err());
        let subject = Subject::new(" English Language ").expect("valid");
        assert_eq!(subject.as_str(), "English Language");
        assert_eq!(subject.key(), "english language");
    }

    #[test]
    fn student_id_validation() {
        assert!(StudentId::new("").is_err());
        assert_eq!(StudentId::new("STU-001").expect("valid").as_str(), "STU-001");
    }
}
