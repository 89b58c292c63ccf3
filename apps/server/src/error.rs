use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use reserve_setting_core::errors::Error as CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    kind: Option<&'static str>,
    index: Option<usize>,
}

fn core_status(err: &CoreError) -> StatusCode {
    if err.is_not_found() {
        return StatusCode::NOT_FOUND;
    }
    if let Some(setting) = err.setting_error() {
        return if setting.is_conflict() {
            StatusCode::CONFLICT
        } else {
            StatusCode::BAD_REQUEST
        };
    }
    match err {
        CoreError::ChangeEntry { source, .. } => core_status(source),
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::ExchangeInfo(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, index) = match &self {
            ApiError::Core(e) => (
                core_status(e),
                e.setting_error().map(|s| s.kind()),
                e.entry_index(),
            ),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, None, None),
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            kind,
            index,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
