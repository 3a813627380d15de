//! # Grade Classifier
//!
//! Maps a [`Score`] to a WASSCE-style grade and remark.
//!
//! ## Grading Scale
//!
//! | Score ≥ | Grade | Remark |
//! |---------|-------|-----------|
//! | 80 | A1 | Excellent |
//! | 75 | B2 | Very Good |
//! | 70 | B3 | Good |
//! | 65 | C4 | Credit |
//! | 60 | C5 | Credit |
//! | 55 | C6 | Credit |
//! | 50 | D7 | Pass |
//! | 45 | D8 | Pass |
//! | else | F9 | Fail |
//!
//! Bands are half-open upward and checked from the highest threshold down;
//! the first band whose threshold is at or below the score wins.

use crate::types::Score;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// GRADE
// =============================================================================

/// Grade code. Declared best-first, so `A1 < F9` under `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A1,
    B2,
    B3,
    C4,
    C5,
    C6,
    D7,
    D8,
    F9,
}

impl Grade {
    /// All grades, best first.
    pub const ALL: [Grade; 9] = [
        Grade::A1,
        Grade::B2,
        Grade::B3,
        Grade::C4,
        Grade::C5,
        Grade::C6,
        Grade::D7,
        Grade::D8,
        Grade::F9,
    ];

    /// Numeric part of the grade code (A1 = 1 ... F9 = 9). Lower is better.
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            Grade::A1 => 1,
            Grade::B2 => 2,
            Grade::B3 => 3,
            Grade::C4 => 4,
            Grade::C5 => 5,
            Grade::C6 => 6,
            Grade::D7 => 7,
            Grade::D8 => 8,
            Grade::F9 => 9,
        }
    }

    /// The remark attached to this grade.
    #[must_use]
    pub fn remark(&self) -> Remark {
        match self {
            Grade::A1 => Remark::Excellent,
            Grade::B2 => Remark::VeryGood,
            Grade::B3 => Remark::Good,
            Grade::C4 | Grade::C5 | Grade::C6 => Remark::Credit,
            Grade::D7 | Grade::D8 => Remark::Pass,
            Grade::F9 => Remark::Fail,
        }
    }

    /// Whether the subject counts as failed.
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Grade::F9)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:?}", self))
    }
}

// =============================================================================
// REMARK
// =============================================================================

/// Qualitative label that accompanies a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Remark {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Credit,
    Pass,
    Fail,
}

impl Remark {
    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Remark::Excellent => "Excellent",
            Remark::VeryGood => "Very Good",
            Remark::Good => "Good",
            Remark::Credit => "Credit",
            Remark::Pass => "Pass",
            Remark::Fail => "Fail",
        }
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

// =============================================================================
// GRADE RESULT
// =============================================================================

/// Outcome of grading one score: `{ "grade": "A1", "remark": "Excellent" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeResult {
    pub grade: Grade,
    pub remark: Remark,
}

impl From<Grade> for GradeResult {
    fn from(grade: Grade) -> Self {
        Self {
            grade,
            remark: grade.remark(),
        }
    }
}

// =============================================================================
// GRADING SCALE
// =============================================================================

/// One row of the grading scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBand {
    /// Lowest score (inclusive) that earns this grade.
    pub min_score: Score,
    pub grade: Grade,
    pub remark: Remark,
}

const fn band(points: u16, grade: Grade, remark: Remark) -> GradeBand {
    GradeBand {
        min_score: Score::from_hundredths_unchecked(points * 100),
        grade,
        remark,
    }
}

/// The grading scale, highest threshold first. The last band starts at zero
/// so every score lands in exactly one band.
pub const GRADE_SCALE: [GradeBand; 9] = [
    band(80, Grade::A1, Remark::Excellent),
    band(75, Grade::B2, Remark::VeryGood),
    band(70, Grade::B3, Remark::Good),
    band(65, Grade::C4, Remark::Credit),
    band(60, Grade::C5, Remark::Credit),
    band(55, Grade::C6, Remark::Credit),
    band(50, Grade::D7, Remark::Pass),
    band(45, Grade::D8, Remark::Pass),
    band(0, Grade::F9, Remark::Fail),
];

/// Grade a single score.
#[must_use]
pub fn grade_for_score(score: Score) -> GradeResult {
    GRADE_SCALE
        .iter()
        .find(|band| score >= band.min_score)
        .map_or(GradeResult::from(Grade::F9), |band| GradeResult {
            grade: band.grade,
            remark: band.remark,
        })
}

/// The band a grade belongs to.
#[must_use]
pub fn band_for_grade(grade: Grade) -> GradeBand {
    GRADE_SCALE
        .iter()
        .copied()
        .find(|band| band.grade == grade)
        .unwrap_or(band(0, Grade::F9, Remark::Fail))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(s: &str) -> Grade {
        grade_for_score(s.parse().expect("valid score")).grade
    }

    #[test]
    fn scale_is_strictly_descending() {
        for pair in GRADE_SCALE.windows(2) {
            assert!(pair[0].min_score > pair[1].min_score);
        }
        assert_eq!(GRADE_SCALE[GRADE_SCALE.len() - 1].min_score, Score::ZERO);
    }

    #[test]
    fn scale_remarks_match_grade_remarks() {
        for band in GRADE_SCALE {
            assert_eq!(band.grade.remark(), band.remark);
        }
    }

    #[test]
    fn lower_edges_are_inclusive() {
        assert_eq!(grade("80"), Grade::A1);
        assert_eq!(grade("79.99"), Grade::B2);
        assert_eq!(grade("75"), Grade::B2);
        assert_eq!(grade("70"), Grade::B3);
        assert_eq!(grade("65"), Grade::C4);
        assert_eq!(grade("60"), Grade::C5);
        assert_eq!(grade("55"), Grade::C6);
        assert_eq!(grade("50"), Grade::D7);
        assert_eq!(grade("45"), Grade::D8);
        assert_eq!(grade("44.99"), Grade::F9);
    }

    #[test]
    fn extremes() {
        assert_eq!(grade_for_score(Score::ZERO).grade, Grade::F9);
        assert_eq!(grade_for_score(Score::MAX).grade, Grade::A1);
    }

    #[test]
    fn credit_band_shares_remark() {
        for s in ["55", "60", "69.99"] {
            assert_eq!(
                grade_for_score(s.parse().expect("valid")).remark,
                Remark::Credit
            );
        }
    }

    #[test]
    fn grade_result_json_shape() {
        let result = grade_for_score("76".parse().expect("valid"));
        let json = serde_json::to_string(&result).expect("ser");
        assert_eq!(json, r#"{"grade":"B2","remark":"Very Good"}"#);
    }

    #[test]
    fn band_lookup_by_grade() {
        assert_eq!(band_for_grade(Grade::C6).min_score.whole_points(), 55);
        assert_eq!(band_for_grade(Grade::F9).min_score, Score::ZERO);
    }

    #[test]
    fn grade_numbers_follow_order() {
        for pair in Grade::ALL.windows(2) {
            assert!(pair[0].number() < pair[1].number());
            assert!(pair[0] < pair[1]);
        }
    }
}
