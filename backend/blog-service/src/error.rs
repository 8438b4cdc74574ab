/// Error types for blog-service
///
/// Every fallible operation in the service returns [`AppError`]. Errors are
/// converted to HTTP responses at the actix boundary; 404 and 500 bodies are
/// rendered by [`crate::handlers::errors::error_handlers`].
use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// SQLSTATE for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing group, user, post or follow edge.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The actor must log in first; `next` is the path to come back to.
    #[error("Authentication required for {next}")]
    AuthRequired { next: String },

    /// The actor is authenticated but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed request payload.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn auth_required(next: impl Into<String>) -> Self {
        AppError::AuthRequired { next: next.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) =>
            {
                AppError::Conflict(
                    db_err
                        .constraint()
                        .map(|c| format!("unique constraint {c} violated"))
                        .unwrap_or_else(|| db_err.message().to_string()),
                )
            }
            _ => AppError::Database(err),
        }
    }
}

/// Build the login URL for a protected path.
///
/// `/` stays unescaped inside `next` so the value reads like a path.
pub fn login_url(next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("/auth/login/?next={encoded}")
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthRequired { .. } => StatusCode::FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::AuthRequired { next } => HttpResponse::Found()
                .insert_header((header::LOCATION, login_url(next)))
                .finish(),
            AppError::Database(e) => {
                tracing::error!(error = ?e, "database error");
                HttpResponse::InternalServerError().finish()
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                HttpResponse::InternalServerError().finish()
            }
            other => {
                tracing::debug!(error = %other, "request failed");
                HttpResponse::build(other.status_code())
                    .content_type("text/plain; charset=utf-8")
                    .body(other.to_string())
            }
        }
    }
}
