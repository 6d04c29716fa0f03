use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Message returned to callers for failures that are only detailed in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Unexpected error, check server logs";

/// `invalid_text_representation`, e.g. a malformed UUID literal.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    BadInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Classifies persistence failures into the caller-facing error kinds.
///
/// Unique violations become [`ProductError::Conflict`] carrying the database
/// detail, invalid text representations become [`ProductError::BadInput`], and
/// anything else is logged in full and reported with [`INTERNAL_ERROR_MESSAGE`].
impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return ProductError::Conflict(detail);
        }

        if postgres_code(&err).as_deref() == Some(INVALID_TEXT_REPRESENTATION) {
            return ProductError::BadInput(err.to_string());
        }

        tracing::error!(error = ?err, "Unhandled database error");
        ProductError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
    }
}

fn postgres_code(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(term) => {
                AppError::NotFound(format!("No product found for '{}'", term))
            }
            ProductError::Conflict(detail) => AppError::Conflict(detail),
            ProductError::BadInput(msg) => AppError::BadRequest(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_unclassified_db_error_is_opaque() {
        let err: ProductError = DbErr::Custom("connection reset by peer".to_string()).into();

        match err {
            ProductError::Internal(msg) => {
                assert_eq!(msg, INTERNAL_ERROR_MESSAGE);
                assert!(!msg.contains("connection reset"));
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn test_record_not_found_is_internal() {
        let err: ProductError = DbErr::RecordNotFound("products".to_string()).into();
        assert!(matches!(err, ProductError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ProductError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ProductError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ProductError::BadInput("bad".into()), StatusCode::BAD_REQUEST),
            (
                ProductError::Internal(INTERNAL_ERROR_MESSAGE.into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_not_found_message_names_term() {
        let app_error: AppError = ProductError::NotFound("blue_shirt".into()).into();
        assert!(app_error.to_string().contains("blue_shirt"));
    }
}
