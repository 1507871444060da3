//! Common validation utilities.

use validator::ValidationError;

/// Validates that a subject is present. Length is unbounded.
///
/// Whitespace-only subjects count as empty.
pub fn validate_subject(subject: &str) -> Result<(), ValidationError> {
    if subject.trim().is_empty() {
        let mut err = ValidationError::new("subject_required");
        err.message = Some("Subject is required".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a duration estimate is a finite, non-negative number of hours.
pub fn validate_duration_hours(hours: f64) -> Result<(), ValidationError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("duration_range");
        err.message = Some("Duration must be a non-negative number of hours".into());
        Err(err)
    }
}

/// Parses a user-entered duration permissively.
///
/// Blank, non-numeric and negative input all yield `None` rather than an error.
pub fn parse_duration_hours(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|hours| validate_duration_hours(*hours).is_ok())
}
