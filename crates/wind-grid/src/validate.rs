//! Sanity checks for assembled wind fields.
//!
//! Validation never fails; it reports what it found and leaves it to the
//! caller to decide how to surface the issues.

use serde::Serialize;
use tracing::debug;
use wind_common::WindField;

/// Fields with fewer points than this get a warning.
pub const MIN_EXPECTED_POINTS: usize = 10;

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            message: message.into(),
        }
    }
}

/// Outcome of [`validate_field`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// False iff any issue has error severity.
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues.iter().any(|i| i.severity == IssueSeverity::Error);
        Self { valid, issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == IssueSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
    }
}

/// Check a field for empty or sparse data, calm-only data, non-finite values
/// and points outside the declared bounding box.
pub fn validate_field(field: &WindField) -> ValidationReport {
    let mut issues = Vec::new();

    if field.points.is_empty() {
        issues.push(ValidationIssue::error("field has no points"));
        return ValidationReport::from_issues(issues);
    }

    if field.points.len() < MIN_EXPECTED_POINTS {
        issues.push(ValidationIssue::warning(format!(
            "field has only {} points (expected at least {})",
            field.points.len(),
            MIN_EXPECTED_POINTS
        )));
    }

    if !(field.metadata.max_speed > 0.0) {
        issues.push(ValidationIssue::error(format!(
            "max speed is {} (expected > 0)",
            field.metadata.max_speed
        )));
    }

    let non_finite = field.points.iter().filter(|p| !p.is_finite()).count();
    if non_finite > 0 {
        issues.push(ValidationIssue::error(format!(
            "{} points have NaN or infinite components",
            non_finite
        )));
    }

    let bbox = &field.metadata.bbox;
    let outside = field
        .points
        .iter()
        .filter(|p| p.is_finite() && !bbox.contains_point(p.lon, p.lat))
        .count();
    if outside > 0 {
        issues.push(ValidationIssue::error(format!(
            "{} points lie outside the declared bbox",
            outside
        )));
    }

    let report = ValidationReport::from_issues(issues);
    if !report.issues.is_empty() {
        debug!(
            source = %field.source(),
            valid = report.valid,
            issues = report.issues.len(),
            "Wind field validation found issues"
        );
    }
    report
}
