//! # Class Summary
//!
//! Class-level statistics over a set of graded term reports: averages,
//! promotion counts, grade distribution, per-subject averages and class
//! positions.

use crate::assessment::AssessmentReport;
use crate::calendar::{AcademicYear, Term};
use crate::grading::Grade;
use crate::primitives::{MAX_CLASS_NAME_LENGTH, MAX_CLASS_SIZE};
use crate::promotion::PromotionStatus;
use crate::types::{MisError, Score, StudentId, Subject};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// SUMMARY TYPES
// =============================================================================

/// How many students fell into each promotion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub promoted: usize,
    pub conditional: usize,
    pub repeat: usize,
}

impl StatusCounts {
    fn record(&mut self, status: PromotionStatus) {
        let slot = match status {
            PromotionStatus::Promoted => &mut self.promoted,
            PromotionStatus::Conditional => &mut self.conditional,
            PromotionStatus::Repeat => &mut self.repeat,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.promoted
            .saturating_add(self.conditional)
            .saturating_add(self.repeat)
    }
}

/// Average score for one subject across the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAverage {
    pub subject: Subject,
    pub average: Score,
    pub entries: usize,
}

/// A student's position in the class by term average.
///
/// Equal averages share a position; the next distinct average skips ahead
/// (1, 1, 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPosition {
    pub position: usize,
    pub student_id: StudentId,
    pub average: Score,
    pub status: PromotionStatus,
}

/// Statistics for one class in one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub class_name: String,
    pub term: Option<Term>,
    pub academic_year: Option<AcademicYear>,
    pub student_count: usize,
    pub class_average: Option<Score>,
    pub highest_average: Option<Score>,
    pub lowest_average: Option<Score>,
    pub status_counts: StatusCounts,
    /// Count of every subject result per grade; all nine grades present.
    pub grade_distribution: BTreeMap<Grade, usize>,
    /// Sorted by subject name, case-insensitively.
    pub subject_averages: Vec<SubjectAverage>,
    pub positions: Vec<ClassPosition>,
}

// =============================================================================
// SUMMARIZER
// =============================================================================

/// Validate a class name.
pub fn validate_class_name(class_name: &str) -> Result<String, MisError> {
    let name = class_name.trim();
    if name.is_empty() {
        return Err(MisError::InvalidClassName("empty".to_string()));
    }
    if name.len() > MAX_CLASS_NAME_LENGTH {
        return Err(MisError::InvalidClassName(format!(
            "length {} exceeds maximum {} bytes",
            name.len(),
            MAX_CLASS_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

impl ClassSummary {
    /// Summarize `reports` for `class_name`.
    ///
    /// All reports must belong to the same term and academic year, and each
    /// student may appear only once.
    pub fn summarize(class_name: &str, reports: &[AssessmentReport]) -> Result<Self, MisError> {
        let class_name = validate_class_name(class_name)?;

        if reports.len() > MAX_CLASS_SIZE {
            return Err(MisError::TooManyStudents {
                count: reports.len(),
                max: MAX_CLASS_SIZE,
            });
        }

        let mut seen = BTreeSet::new();
        for report in reports {
            if !seen.insert(&report.student_id) {
                return Err(MisError::DuplicateStudent(report.student_id.to_string()));
            }
        }

        let period = match reports.first() {
            Some(first) => {
                for report in reports {
                    if report.term != first.term || report.academic_year != first.academic_year {
                        return Err(MisError::MismatchedPeriod(format!(
                            "{} {} and {} {}",
                            first.term, first.academic_year, report.term, report.academic_year
                        )));
                    }
                }
                Some((first.term, first.academic_year))
            }
            None => None,
        };

        let averages: Vec<Score> = reports.iter().map(|r| r.average).collect();

        let mut status_counts = StatusCounts::default();
        let mut grade_distribution: BTreeMap<Grade, usize> =
            Grade::ALL.iter().map(|g| (*g, 0)).collect();
        let mut by_subject: BTreeMap<String, (Subject, Vec<Score>)> = BTreeMap::new();

        for report in reports {
            status_counts.record(report.status);
            for result in &report.subjects {
                if let Some(count) = grade_distribution.get_mut(&result.grade) {
                    *count = count.saturating_add(1);
                }
                by_subject
                    .entry(result.subject.key())
                    .or_insert_with(|| (result.subject.clone(), Vec::new()))
                    .1
                    .push(result.score);
            }
        }

        let subject_averages = by_subject
            .into_values()
            .filter_map(|(subject, scores)| {
                let entries = scores.len();
                Score::floor_mean(scores).map(|average| SubjectAverage {
                    subject,
                    average,
                    entries,
                })
            })
            .collect();

        Ok(Self {
            class_name,
            term: period.map(|(term, _)| term),
            academic_year: period.map(|(_, year)| year),
            student_count: reports.len(),
            class_average: Score::floor_mean(averages.iter().copied()),
            highest_average: averages.iter().copied().max(),
            lowest_average: averages.iter().copied().min(),
            status_counts,
            grade_distribution,
            subject_averages,
            positions: rank(reports),
        })
    }
}

/// Order students by average, best first, with competition ranking.
fn rank(reports: &[AssessmentReport]) -> Vec<ClassPosition> {
    let mut ordered: Vec<&AssessmentReport> = reports.iter().collect();
    ordered.sort_by(|a, b| {
        b.average
            .cmp(&a.average)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    let mut positions = Vec::with_capacity(ordered.len());
    let mut previous: Option<(Score, usize)> = None;

    for (index, report) in ordered.into_iter().enumerate() {
        let position = match previous {
            Some((average, position)) if average == report.average => position,
            _ => index.saturating_add(1),
        };
        previous = Some((report.average, position));
        positions.push(ClassPosition {
            position,
            student_id: report.student_id.clone(),
            average: report.average,
            status: report.status,
        });
    }

    positions
}

// =============================================================================
// TESTS
// =============================================================================
