use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    TooManyRequests(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidRequest(msg) => HttpError::BadRequest(msg),

            ServiceError::NotFound(msg) => HttpError::NotFound(msg),

            ServiceError::Conflict(msg) => HttpError::Conflict(msg),

            ServiceError::InvalidCredentials => {
                HttpError::Unauthorized("Invalid credentials".to_string())
            }

            ServiceError::Jwt(_) => HttpError::Unauthorized("Invalid or expired token".into()),

            ServiceError::TokenExpired => HttpError::Unauthorized("Invalid or expired token".into()),

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                RepositoryError::Conflict(msg) => {
                    HttpError::Conflict(format!("Concurrent update, please retry: {msg}"))
                }
                RepositoryError::AlreadyExists(_) => {
                    HttpError::Conflict("Unique constraint violation".into())
                }
                RepositoryError::ForeignKey(msg) => {
                    HttpError::BadRequest(format!("Foreign key violation: {msg}"))
                }
                RepositoryError::Constraint(msg) => {
                    HttpError::BadRequest(format!("Constraint violation: {msg}"))
                }
                RepositoryError::Timeout => {
                    error!("❌ Store operation timed out");
                    HttpError::Internal("Transaction timed out".into())
                }
                other => {
                    error!("❌ Unclassified repository failure: {other}");
                    HttpError::Internal("Internal Server Error".into())
                }
            },

            ServiceError::Bcrypt(err) => {
                error!("❌ Password hashing failure: {err}");
                HttpError::Internal("Internal authentication error".into())
            }

            ServiceError::Internal(msg) => {
                error!("❌ Internal failure: {msg}");
                HttpError::Internal("Internal Server Error".into())
            }
        }
    }
}

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            HttpError::BadRequest(_) => "BAD_REQUEST",
            HttpError::Unauthorized(_) => "UNAUTHORIZED",
            HttpError::Forbidden(_) => "FORBIDDEN",
            HttpError::NotFound(_) => "NOT_FOUND",
            HttpError::Conflict(_) => "CONFLICT",
            HttpError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            HttpError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let msg = match self {
            HttpError::BadRequest(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::NotFound(msg)
            | HttpError::Conflict(msg)
            | HttpError::TooManyRequests(msg)
            | HttpError::Internal(msg) => msg,
        };

        (status, Json(ErrorResponse::new(code, msg))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_taxonomy_statuses() {
        let cases = vec![
            (ServiceError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::TokenExpired, StatusCode::UNAUTHORIZED),
            (
                ServiceError::Repo(RepositoryError::Conflict("40001".into())),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Repo(RepositoryError::AlreadyExists("email".into())),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Repo(RepositoryError::Timeout),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status_code(), expected);
        }
    }
}
