use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use crate::blog::BlogError;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Blog(#[from] BlogError),

    #[error("Not found")]
    NotFound,

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Log `err` and answer with a bare 500. Details never reach the client.
fn internal_error(err: &dyn std::fmt::Display) -> Response {
    tracing::error!("Internal error: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Blog(err) => match err {
                BlogError::NotAuthenticated => Redirect::to(LOGIN_PATH).into_response(),
                BlogError::Denied(denied) => {
                    (StatusCode::FORBIDDEN, denied.message()).into_response()
                }
                BlogError::Validation(v) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(serde_json::json!({ "error": v.message, "values": v.values })),
                )
                    .into_response(),
                BlogError::PostNotFound(_) | BlogError::CommentNotFound { .. } => {
                    AppError::NotFound.into_response()
                }
                BlogError::Database(e) => internal_error(&e),
            },
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::Pool(e) => internal_error(&e),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
