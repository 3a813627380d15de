//! # Academic Calendar
//!
//! Academic years run September to August and are written `"2025/2026"`.
//! Terms follow the calendar months:
//!
//! | Months | Term |
//! |--------|------|
//! | Jan–Apr | First Term |
//! | May–Aug | Second Term |
//! | Sep–Dec | Third Term |

use crate::types::MisError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// First month of the academic year.
pub const ACADEMIC_YEAR_START_MONTH: u32 = 9;

// =============================================================================
// ACADEMIC YEAR
// =============================================================================

/// An academic year, identified by the calendar year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicYear {
    start: i32,
}

impl AcademicYear {
    /// The academic year that starts in `start`.
    #[must_use]
    pub const fn starting(start: i32) -> Self {
        Self { start }
    }

    /// The academic year a date falls in.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= ACADEMIC_YEAR_START_MONTH {
            Self::starting(date.year())
        } else {
            Self::starting(date.year().saturating_sub(1))
        }
    }

    #[must_use]
    pub const fn start_year(&self) -> i32 {
        self.start
    }

    #[must_use]
    pub const fn end_year(&self) -> i32 {
        self.start.saturating_add(1)
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start, self.end_year())
    }
}

impl FromStr for AcademicYear {
    type Err = MisError;

    /// Parse `"2025/2026"` or `"2025-2026"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || MisError::InvalidAcademicYear(text.to_string());

        let (first, second) = text
            .split_once('/')
            .or_else(|| text.split_once('-'))
            .ok_or_else(invalid)?;

        let is_year = |part: &str| part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit());
        if !is_year(first) || !is_year(second) {
            return Err(invalid());
        }

        let start: i32 = first.parse().map_err(|_| invalid())?;
        let end: i32 = second.parse().map_err(|_| invalid())?;
        if start.checked_add(1) != Some(end) {
            return Err(invalid());
        }
        Ok(Self::starting(start))
    }
}

impl Serialize for AcademicYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AcademicYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TERM
// =============================================================================

/// School term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Term {
    #[serde(rename = "First Term")]
    First,
    #[serde(rename = "Second Term")]
    Second,
    #[serde(rename = "Third Term")]
    Third,
}

impl Term {
    /// All terms in calendar order.
    pub const ALL: [Term; 3] = [Term::First, Term::Second, Term::Third];

    /// The term a date falls in.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        match date.month() {
            1..=4 => Term::First,
            5..=8 => Term::Second,
            _ => Term::Third,
        }
    }

    /// Full display name, e.g. "First Term".
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Term::First => "First Term",
            Term::Second => "Second Term",
            Term::Third => "Third Term",
        }
    }

    /// Ordinal within the calendar year (1–3).
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        match self {
            Term::First => 1,
            Term::Second => 2,
            Term::Third => 3,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Term {
    type Err = MisError;

    /// Accepts "First Term", "first", "1" and so on, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let word = normalized
            .strip_suffix(" term")
            .unwrap_or(&normalized)
            .trim();

        Term::ALL
            .into_iter()
            .find(|term| {
                term.name().to_lowercase().strip_suffix(" term") == Some(word)
                    || term.ordinal().to_string() == word
            })
            .ok_or_else(|| MisError::InvalidTerm(s.trim().to_string()))
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Academic year and term of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcademicPeriod {
    pub academic_year: AcademicYear,
    pub term: Term,
}

impl AcademicPeriod {
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            academic_year: AcademicYear::containing(date),
            term: Term::for_date(date),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
