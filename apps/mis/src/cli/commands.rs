//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, CalendarQuery, ClassReportRequest, EvaluateRequest, PolicyResponse};
use crate::config::AppConfig;
use mis_core::{
    AcademicPeriod, AssessmentReport, ClassSummary, GRADE_SCALE, MisError, PromotionInput,
    PromotionPolicy, Score, band_for_grade, grade_for_score,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE INPUT
// =============================================================================

/// Maximum size of an input JSON file (10 MB).
const MAX_INPUT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Canonicalize `path` and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, MisError> {
    let canonical = path.canonicalize().map_err(|e| {
        MisError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(MisError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Reject files larger than `max_size` before reading them.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), MisError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MisError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MisError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Read and parse a JSON input file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, MisError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_INPUT_FILE_SIZE)?;

    let content = std::fs::read_to_string(&path)
        .map_err(|e| MisError::IoError(format!("Failed to read file: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| MisError::SerializationError(format!("Invalid JSON: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), MisError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("School MIS Assessment Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", config.server.host);
    println!("  Port:       {}", config.server.port);
    println!("  Rate limit: {} req/s", config.security.rate_limit);
    println!(
        "  Auth:       {}",
        if config.api_key().is_some() {
            "API key"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health                    - Health check");
    println!("  GET  /api/grades/scale          - Grading scale");
    println!("  GET  /api/policy                - Promotion thresholds");
    println!("  POST /api/assessments/grade     - Grade a score");
    println!("  POST /api/assessments/promotion - Promotion status");
    println!("  POST /api/assessments/evaluate  - Term report");
    println!("  POST /api/reports/class         - Class summary");
    println!("  GET  /api/calendar/current      - Academic year and term");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config).await
}

// =============================================================================
// GRADE COMMAND
// =============================================================================

/// Grade a single score.
pub fn cmd_grade(json_mode: bool, score: &str) -> Result<(), MisError> {
    let score: Score = score.parse()?;
    let result = grade_for_score(score);
    let band = band_for_grade(result.grade);

    if json_mode {
        print_json(&serde_json::json!({
            "score": score,
            "grade": result.grade,
            "remark": result.remark,
            "band_min_score": band.min_score,
        }));
        return Ok(());
    }

    println!("Score:  {}", score);
    println!("Grade:  {} (from {})", result.grade, band.min_score);
    println!("Remark: {}", result.remark);
    Ok(())
}

// =============================================================================
// PROMOTE COMMAND
// =============================================================================

/// Classify an average and failed-subject count.
pub fn cmd_promote(
    config: &AppConfig,
    json_mode: bool,
    average: &str,
    failed: i64,
) -> Result<(), MisError> {
    let policy = config.policy()?;
    let input = PromotionInput::new(average.parse()?, failed)?;
    let status = policy.classify_input(&input);

    if json_mode {
        print_json(&serde_json::json!({
            "average_score": input.average_score,
            "failed_subjects": input.failed_subjects,
            "status": status,
            "description": status.description(),
        }));
        return Ok(());
    }

    println!("Average:         {}", input.average_score);
    println!("Failed subjects: {}", input.failed_subjects);
    println!("Status:          {}", status);
    println!("                 {}", status.description());
    Ok(())
}

// =============================================================================
// EVALUATE COMMAND
// =============================================================================

/// Grade a term assessment read from a JSON file.
pub fn cmd_evaluate(config: &AppConfig, json_mode: bool, file: &Path) -> Result<(), MisError> {
    let policy = config.policy()?;
    let request: EvaluateRequest = read_json_file(file)?;
    let report = request.to_assessment()?.evaluate(&policy)?;

    tracing::debug!(
        student = %report.student_id,
        subjects = report.subject_count(),
        "Evaluated assessment from file"
    );

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &AssessmentReport) {
    println!("Term Report");
    println!("===========");
    println!("Student: {}", report.student_id);
    println!("Period:  {} {}", report.term, report.academic_year);
    println!();
    println!("{:<32} {:>7}  {:<5} Remark", "Subject", "Score", "Grade");
    for result in &report.subjects {
        println!(
            "{:<32} {:>7}  {:<5} {}",
            result.subject, result.score, result.grade, result.remark
        );
    }
    println!();
    println!("Average:         {}", report.average);
    if let Some(best) = report.best_grade() {
        println!("Best grade:      {}", best);
    }
    println!("Failed subjects: {}", report.failed_subjects);
    println!(
        "Status:          {} ({})",
        report.status,
        report.status.description()
    );
}

// =============================================================================
// CLASS REPORT COMMAND
// =============================================================================

/// Summarize a class read from a JSON file.
pub fn cmd_class_report(
    config: &AppConfig,
    json_mode: bool,
    file: &Path,
) -> Result<(), MisError> {
    let policy = config.policy()?;
    let request: ClassReportRequest = read_json_file(file)?;
    let summary = request.summarize(&policy)?;

    if json_mode {
        print_json(&summary);
        return Ok(());
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ClassSummary) {
    let or_dash = |value: Option<Score>| value.map_or_else(|| "-".to_string(), |s| s.to_string());

    println!("Class Summary: {}", summary.class_name);
    println!("==============");
    if let (Some(term), Some(year)) = (summary.term, summary.academic_year) {
        println!("Period:   {} {}", term, year);
    }
    println!("Students: {}", summary.student_count);
    println!("Average:  {}", or_dash(summary.class_average));
    println!("Highest:  {}", or_dash(summary.highest_average));
    println!("Lowest:   {}", or_dash(summary.lowest_average));
    println!();
    println!(
        "Promoted: {}  Conditional: {}  Repeat: {}",
        summary.status_counts.promoted,
        summary.status_counts.conditional,
        summary.status_counts.repeat
    );

    if !summary.positions.is_empty() {
        println!();
        println!("{:>4}  {:<24} {:>7}  Status", "Pos", "Student", "Average");
        for entry in &summary.positions {
            println!(
                "{:>4}  {:<24} {:>7}  {}",
                entry.position, entry.student_id, entry.average, entry.status
            );
        }
    }

    if !summary.subject_averages.is_empty() {
        println!();
        println!("Subject averages:");
        for entry in &summary.subject_averages {
            println!(
                "  {:<32} {:>7}  ({} students)",
                entry.subject, entry.average, entry.entries
            );
        }
    }
}

// =============================================================================
// CALENDAR COMMAND
// =============================================================================

/// Academic year and term for `date` (today when absent).
pub fn cmd_calendar(json_mode: bool, date: Option<String>) -> Result<(), MisError> {
    let today = chrono::Local::now().date_naive();
    let date = CalendarQuery { date }.to_date(today)?;
    let period = AcademicPeriod::for_date(date);

    if json_mode {
        print_json(&serde_json::json!({
            "date": date.format("%Y-%m-%d").to_string(),
            "academic_year": period.academic_year,
            "term": period.term,
        }));
        return Ok(());
    }

    println!("Date:          {}", date.format("%Y-%m-%d"));
    println!("Academic year: {}", period.academic_year);
    println!("Term:          {}", period.term);
    Ok(())
}

// =============================================================================
// SCALE / POLICY COMMANDS
// =============================================================================

/// Print the grading scale.
pub fn cmd_scale(json_mode: bool) -> Result<(), MisError> {
    if json_mode {
        print_json(&GRADE_SCALE);
        return Ok(());
    }

    println!("Grading Scale");
    println!("=============");
    println!("{:>7}  {:<5} Remark", "From", "Grade");
    for band in GRADE_SCALE {
        println!("{:>7}  {:<5} {}", band.min_score, band.grade, band.remark);
    }
    Ok(())
}

/// Print the active promotion thresholds.
pub fn cmd_policy(config: &AppConfig, json_mode: bool) -> Result<(), MisError> {
    let policy: PromotionPolicy = config.policy()?;

    if json_mode {
        print_json(&PolicyResponse::from(&policy));
        return Ok(());
    }

    println!("Promotion Policy");
    println!("================");
    println!(
        "Promoted:    average >= {} and failed <= {}",
        policy.promoted_min_average(),
        policy.promoted_max_failed()
    );
    println!(
        "Conditional: average >= {} and failed <= {}",
        policy.conditional_min_average(),
        policy.conditional_max_failed()
    );
    println!("Repeat:      otherwise");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn reads_evaluate_request_from_file() {
        let file = write_temp(
            r#"{
                "student_id": "STU-001",
                "term": "First Term",
                "academic_year": "2024/2025",
                "subjects": [
                    {"subject": "Mathematics", "score": 82},
                    {"subject": "English", "score": "47.5"}
                ]
            }"#,
        );
        let request: EvaluateRequest = read_json_file(file.path()).expect("read");
        let report = request
            .to_assessment()
            .expect("valid")
            .evaluate(&PromotionPolicy::default())
            .expect("evaluate");
        assert_eq!(report.subject_count(), 2);
        assert_eq!(report.failed_subjects, 0);
    }

    #[test]
    fn text_output_commands_succeed() {
        let file = write_temp(
            r#"{
                "student_id": "STU-002",
                "term": "2",
                "academic_year": "2024-2025",
                "subjects": [{"subject": "Science", "score": 71}]
            }"#,
        );
        assert!(cmd_evaluate(&AppConfig::default(), false, file.path()).is_ok());
        assert!(cmd_grade(false, "44.99").is_ok());
        assert!(cmd_promote(&AppConfig::default(), false, "90", i64::MAX).is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result: Result<EvaluateRequest, _> =
            read_json_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(MisError::IoError(_))));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().expect("dir");
        let result: Result<EvaluateRequest, _> = read_json_file(dir.path());
        assert!(matches!(result, Err(MisError::IoError(_))));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let file = write_temp("{ not json");
        let result: Result<ClassReportRequest, _> = read_json_file(file.path());
        assert!(matches!(result, Err(MisError::SerializationError(_))));
    }

    #[test]
    fn grade_command_rejects_out_of_range() {
        assert!(cmd_grade(false, "100.5").is_err());
        assert!(cmd_grade(false, "-1").is_err());
        assert!(cmd_grade(true, "64.99").is_ok());
    }

    #[test]
    fn promote_command_rejects_negative_failures() {
        let config = AppConfig::default();
        assert!(matches!(
            cmd_promote(&config, false, "60", -1),
            Err(MisError::NegativeFailedCount(-1))
        ));
        assert!(cmd_promote(&config, true, "60", 1).is_ok());
    }

    #[test]
    fn calendar_command_rejects_bad_date() {
        assert!(cmd_calendar(false, Some("2024-13-40".to_string())).is_err());
        assert!(cmd_calendar(true, Some("2024-09-02".to_string())).is_ok());
    }
}
