use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::error::{DomainError, RepositoryError};
use domain::services::CalendarError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::Validation {
            details: vec![ValidationDetail {
                field: field.to_string(),
                message: message.clone(),
            }],
            message,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation { message, details }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => errors.into(),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Persistence(msg) => ApiError::Internal(msg),
            DomainError::Stage(stage) => ApiError::Conflict(stage.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::InvalidMonth(_) => ApiError::invalid_field("month", err.to_string()),
            CalendarError::InvalidYear(_) => ApiError::invalid_field("year", err.to_string()),
            CalendarError::Date(_) => ApiError::invalid_field("date", err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::error::StageError;
    use domain::models::Stage;
    use uuid::Uuid;

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::invalid_field("subject", "x"), StatusCode::BAD_REQUEST),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::NotFound("test".to_string()).to_string(),
            "Not found: test"
        );
        assert_eq!(
            ApiError::invalid_field("month", "bad month").to_string(),
            "Validation error: bad month"
        );
    }

    #[test]
    fn test_from_validation_errors_keeps_every_field() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("subject", validator::ValidationError::new("subject_required"));
        errors.add(
            "scheduled_date",
            validator::ValidationError::new("scheduled_date_required"),
        );

        match ApiError::from(errors) {
            ApiError::Validation { message, details } => {
                assert_eq!(message, "2 validation errors");
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["scheduled_date", "subject"]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_domain_errors() {
        let not_found: ApiError = DomainError::from(RepositoryError::request_not_found(Uuid::nil())).into();
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let backend: ApiError = RepositoryError::Backend("timeout".into()).into();
        assert!(matches!(backend, ApiError::Internal(_)));

        let stage: ApiError = DomainError::from(StageError {
            from: Stage::Scrap,
            to: Stage::New,
        })
        .into();
        assert!(matches!(stage, ApiError::Conflict(_)));
    }

    #[test]
    fn test_from_calendar_error() {
        let err: ApiError = CalendarError::InvalidMonth(13).into();
        match err {
            ApiError::Validation { details, .. } => assert_eq!(details[0].field, "month"),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }
}
