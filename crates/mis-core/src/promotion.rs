//! # Promotion Classifier
//!
//! Decides whether a student advances, from their term average and the
//! number of subjects they failed.
//!
//! Rules are checked in order; the first that holds wins:
//!
//! 1. `average >= 50` and `failed <= 2` → `Promoted`
//! 2. `average >= 40` and `failed <= 3` → `Conditional`
//! 3. otherwise → `Repeat`
//!
//! The thresholds are carried by a [`PromotionPolicy`] value rather than a
//! global, so a school can run a stricter policy without touching callers.

use crate::types::{MisError, Score};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// DEFAULT THRESHOLDS
// =============================================================================

/// Minimum average for promotion, in whole points.
pub const PROMOTED_MIN_AVERAGE: u16 = 50;

/// Maximum failed subjects for promotion.
pub const PROMOTED_MAX_FAILED: u32 = 2;

/// Minimum average for conditional promotion, in whole points.
pub const CONDITIONAL_MIN_AVERAGE: u16 = 40;

/// Maximum failed subjects for conditional promotion.
pub const CONDITIONAL_MAX_FAILED: u32 = 3;

// =============================================================================
// PROMOTION STATUS
// =============================================================================

/// The advancement decision for a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PromotionStatus {
    Promoted,
    Conditional,
    Repeat,
}

impl PromotionStatus {
    /// Short description for report cards.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            PromotionStatus::Promoted => "Promoted to the next class",
            PromotionStatus::Conditional => "Promoted on condition of remedial work",
            PromotionStatus::Repeat => "To repeat the class",
        }
    }
}

impl fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// =============================================================================
// PROMOTION INPUT
// =============================================================================

/// Average score and failed-subject count for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionInput {
    pub average_score: Score,
    pub failed_subjects: u32,
}

impl PromotionInput {
    /// Build an input from a signed failed count as received from callers.
    ///
    /// Counts past `u32::MAX` saturate, which still classifies as `Repeat`.
    pub fn new(average_score: Score, failed_subjects: i64) -> Result<Self, MisError> {
        if failed_subjects < 0 {
            return Err(MisError::NegativeFailedCount(failed_subjects));
        }
        let failed_subjects = u32::try_from(failed_subjects).unwrap_or(u32::MAX);
        Ok(Self {
            average_score,
            failed_subjects,
        })
    }
}

// =============================================================================
// PROMOTION POLICY
// =============================================================================

/// Thresholds for the promotion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromotionPolicy {
    promoted_min_average: Score,
    promoted_max_failed: u32,
    conditional_min_average: Score,
    conditional_max_failed: u32,
}

impl Default for PromotionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl PromotionPolicy {
    /// The standard policy (50/2 promoted, 40/3 conditional).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            promoted_min_average: Score::from_hundredths_unchecked(PROMOTED_MIN_AVERAGE * 100),
            promoted_max_failed: PROMOTED_MAX_FAILED,
            conditional_min_average: Score::from_hundredths_unchecked(
                CONDITIONAL_MIN_AVERAGE * 100,
            ),
            conditional_max_failed: CONDITIONAL_MAX_FAILED,
        }
    }

    /// Create a policy with custom thresholds.
    ///
    /// The conditional band must be at least as lenient as the promoted band,
    /// otherwise a student could be promoted while failing the weaker test.
    pub fn with_thresholds(
        promoted_min_average: Score,
        promoted_max_failed: u32,
        conditional_min_average: Score,
        conditional_max_failed: u32,
    ) -> Result<Self, MisError> {
        if conditional_min_average > promoted_min_average {
            return Err(MisError::InvalidPolicy(format!(
                "conditional minimum average {} is above promoted minimum {}",
                conditional_min_average, promoted_min_average
            )));
        }
        if conditional_max_failed < promoted_max_failed {
            return Err(MisError::InvalidPolicy(format!(
                "conditional failed limit {} is below promoted limit {}",
                conditional_max_failed, promoted_max_failed
            )));
        }
        Ok(Self {
            promoted_min_average,
            promoted_max_failed,
            conditional_min_average,
            conditional_max_failed,
        })
    }

    #[must_use]
    pub fn promoted_min_average(&self) -> Score {
        self.promoted_min_average
    }

    #[must_use]
    pub fn promoted_max_failed(&self) -> u32 {
        self.promoted_max_failed
    }

    #[must_use]
    pub fn conditional_min_average(&self) -> Score {
        self.conditional_min_average
    }

    #[must_use]
    pub fn conditional_max_failed(&self) -> u32 {
        self.conditional_max_failed
    }

    /// Classify a student under this policy.
    #[must_use]
    pub fn classify(&self, average_score: Score, failed_subjects: u32) -> PromotionStatus {
        if average_score >= self.promoted_min_average
            && failed_subjects <= self.promoted_max_failed
        {
            PromotionStatus::Promoted
        } else if average_score >= self.conditional_min_average
            && failed_subjects <= self.conditional_max_failed
        {
            PromotionStatus::Conditional
        } else {
            PromotionStatus::Repeat
        }
    }

    /// Classify a prepared input under this policy.
    #[must_use]
    pub fn classify_input(&self, input: &PromotionInput) -> PromotionStatus {
        self.classify(input.average_score, input.failed_subjects)
    }
}

/// Classify under the standard policy.
#[must_use]
pub fn promotion_status(average_score: Score, failed_subjects: u32) -> PromotionStatus {
    PromotionPolicy::new().classify(average_score, failed_subjects)
}

// =============================================================================
// TESTS
// =============================================================================
