use crate::utils::helpers::service_name;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Authorization Error: {0}")]
    AuthorizationError(String),

    #[error("Filter Error: {0}")]
    FilterError(String),

    #[error("Storage Error: {0}")]
    StorageError(String),

    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Bad Request: {0}")]
    BadRequestError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),
}

impl CustomError {
    /// Stable error code carried in the response envelope
    pub fn code(&self) -> &'static str {
        match *self {
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
            CustomError::AuthorizationError(..) => "AUTHORIZATION_ERROR",
            CustomError::FilterError(..) => "FILTER_ERROR",
            CustomError::StorageError(..) => "STORAGE_ERROR",
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
        }
    }
}

impl From<mongodb::error::Error> for CustomError {
    fn from(e: mongodb::error::Error) -> Self {
        CustomError::StorageError(e.to_string())
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::AuthorizationError(..) => StatusCode::FORBIDDEN,
            CustomError::FilterError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::StorageError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.code(),
            "service": service_name(),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}
