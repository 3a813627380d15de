//! # Term Assessment
//!
//! Turns one student's subject scores for a term into a graded report:
//! per-subject grade and remark, the floored average, the failed-subject
//! count (subjects graded F9), and the promotion status.

use crate::calendar::{AcademicYear, Term};
use crate::grading::{Grade, Remark, grade_for_score};
use crate::primitives::MAX_SUBJECTS;
use crate::promotion::{PromotionPolicy, PromotionStatus};
use crate::types::{MisError, Score, StudentId, Subject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// INPUT
// =============================================================================

/// A raw score for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject: Subject,
    pub score: Score,
}

impl SubjectScore {
    #[must_use]
    pub fn new(subject: Subject, score: Score) -> Self {
        Self { subject, score }
    }
}

/// All subject scores of one student for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAssessment {
    pub student_id: StudentId,
    pub term: Term,
    pub academic_year: AcademicYear,
    pub subjects: Vec<SubjectScore>,
}

impl TermAssessment {
    /// Check subject count and uniqueness.
    pub fn validate(&self) -> Result<(), MisError> {
        if self.subjects.is_empty() {
            return Err(MisError::EmptyAssessment);
        }
        if self.subjects.len() > MAX_SUBJECTS {
            return Err(MisError::TooManySubjects {
                count: self.subjects.len(),
                max: MAX_SUBJECTS,
            });
        }

        let mut seen = BTreeSet::new();
        for entry in &self.subjects {
            if !seen.insert(entry.subject.key()) {
                return Err(MisError::DuplicateSubject(entry.subject.to_string()));
            }
        }
        Ok(())
    }

    /// Grade every subject and classify the student under `policy`.
    pub fn evaluate(&self, policy: &PromotionPolicy) -> Result<AssessmentReport, MisError> {
        self.validate()?;

        let subjects: Vec<SubjectResult> = self
            .subjects
            .iter()
            .map(|entry| {
                let result = grade_for_score(entry.score);
                SubjectResult {
                    subject: entry.subject.clone(),
                    score: entry.score,
                    grade: result.grade,
                    remark: result.remark,
                }
            })
            .collect();

        let total_hundredths: u32 = subjects
            .iter()
            .map(|s| u32::from(s.score.hundredths()))
            .sum();
        let average = Score::floor_mean(subjects.iter().map(|s| s.score))
            .ok_or(MisError::EmptyAssessment)?;
        let failed_subjects = subjects.iter().filter(|s| s.grade.is_fail()).count() as u32;
        let status = policy.classify(average, failed_subjects);

        Ok(AssessmentReport {
            student_id: self.student_id.clone(),
            term: self.term,
            academic_year: self.academic_year,
            subjects,
            total_hundredths,
            average,
            failed_subjects,
            status,
        })
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Graded result for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub subject: Subject,
    pub score: Score,
    pub grade: Grade,
    pub remark: Remark,
}

/// Graded report for one student and term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub student_id: StudentId,
    pub term: Term,
    pub academic_year: AcademicYear,
    /// Subjects in the order they were submitted.
    pub subjects: Vec<SubjectResult>,
    /// Sum of all subject scores, in hundredths.
    pub total_hundredths: u32,
    pub average: Score,
    pub failed_subjects: u32,
    pub status: PromotionStatus,
}

impl AssessmentReport {
    /// Best grade obtained, if any subject was graded.
    #[must_use]
    pub fn best_grade(&self) -> Option<Grade> {
        self.subjects.iter().map(|s| s.grade).min()
    }

    /// Number of subjects graded.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
