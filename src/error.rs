//! Failure taxonomy shared by the query layer and both JSON surfaces.

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::{Display, From};
use sea_orm::DbErr;
use serde::Serialize;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    /// The requested row does not exist. Carries the entity name.
    #[display(fmt = "{} not found", _0)]
    #[from(ignore)]
    NotFound(&'static str),
    /// The requester is not allowed to touch this row.
    #[display(fmt = "{}", _0)]
    #[from(ignore)]
    PermissionDenied(String),
    #[display(fmt = "Authentication required")]
    #[from(ignore)]
    Unauthorized,
    #[display(fmt = "Invalid input")]
    Validation(ValidationErrors),
    #[display(fmt = "Database error: {}", _0)]
    Database(DbErr),
    /// A failure outside the database, such as password hashing.
    #[display(fmt = "Internal error: {}", _0)]
    #[from(ignore)]
    Internal(String),
}

impl Error {
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        Error::PermissionDenied(msg.into())
    }

    /// Builds a validation error for a single field, for checks that span
    /// more than one field or need the database.
    pub fn invalid_field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, err);
        Error::Validation(errors)
    }

    /// Human readable list of field errors, for HTML error pages.
    pub fn field_messages(&self) -> Vec<String> {
        match self {
            Error::Validation(errors) => errors
                .field_errors()
                .iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| match &e.message {
                        Some(msg) => format!("{}: {}", field, msg),
                        None => format!("{}: {}", field, e.code),
                    })
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl From<&Error> for ErrorResponse {
    fn from(value: &Error) -> Self {
        match value {
            Error::Validation(errors) => Self {
                detail: value.to_string(),
                errors: serde_json::to_value(errors).ok(),
            },
            // Never leak driver messages to clients.
            Error::Database(_) | Error::Internal(_) => Self {
                detail: "Internal server error".to_string(),
                errors: None,
            },
            _ => Self {
                detail: value.to_string(),
                errors: None,
            },
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            Error::Database(e) => log::error!("database error: {}", e),
            Error::Internal(e) => log::error!("internal error: {}", e),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::NotFound("Movie").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::permission_denied("nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(Error::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::invalid_field("text", "required", "This field is required.").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let err = Error::Internal("argon2 says no".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorResponse::from(&err).detail, "Internal server error");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(Error::NotFound("Director").to_string(), "Director not found");
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = Error::Database(DbErr::Custom("secret table layout".into()));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.detail, "Internal server error");
        assert!(body.errors.is_none());
    }

    #[test]
    fn test_validation_errors_carry_fields() {
        let err = Error::invalid_field("addressee", "self_message", "You cannot message yourself.");
        let body = ErrorResponse::from(&err);
        let errors = body.errors.expect("field errors");
        assert!(errors.get("addressee").is_some());
        assert_eq!(
            err.field_messages(),
            vec!["addressee: You cannot message yourself.".to_string()]
        );
    }
}
