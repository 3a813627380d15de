//! # Evaluation Benchmarks
//!
//! Performance benchmarks for mis-core classifiers and reports.
//!
//! Run with: `cargo bench -p mis-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mis_core::{
    AcademicYear, ClassSummary, PromotionPolicy, Score, StudentId, Subject, SubjectScore, Term,
    TermAssessment, grade_for_score, promotion_status,
};
use std::hint::black_box;

/// Create an assessment with `subjects` subjects and spread-out scores.
fn create_assessment(student: usize, subjects: usize) -> TermAssessment {
    TermAssessment {
        student_id: StudentId::new(format!("STU-{student:04}")).expect("id"),
        term: Term::First,
        academic_year: AcademicYear::starting(2025),
        subjects: (0..subjects)
            .map(|i| {
                let hundredths = ((student * 37 + i * 1_291) % 10_001) as u32;
                SubjectScore::new(
                    Subject::new(format!("Subject {i}")).expect("subject"),
                    Score::from_hundredths(hundredths).expect("score"),
                )
            })
            .collect(),
    }
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_grade_for_score(c: &mut Criterion) {
    let scores: Vec<Score> = (0..=10_000u32)
        .map(|h| Score::from_hundredths(h).expect("score"))
        .collect();

    c.bench_function("grade_for_score_full_range", |b| {
        b.iter(|| {
            for score in &scores {
                black_box(grade_for_score(*score));
            }
        });
    });
}

fn bench_promotion_status(c: &mut Criterion) {
    let average = Score::from_points(47).expect("score");
    c.bench_function("promotion_status", |b| {
        b.iter(|| black_box(promotion_status(black_box(average), black_box(3))));
    });
}

fn bench_class_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_summary");
    let policy = PromotionPolicy::default();

    for size in [10, 100, 500].iter() {
        let reports: Vec<_> = (0..*size)
            .map(|s| create_assessment(s, 9).evaluate(&policy).expect("evaluate"))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &reports, |b, reports| {
            b.iter(|| black_box(ClassSummary::summarize("SHS 1", reports).expect("summary")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_grade_for_score,
    bench_promotion_status,
    bench_class_summary
);
criterion_main!(benches);
