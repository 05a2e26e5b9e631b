use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use log::{ debug, error };
use thiserror::Error;
use crate::history::HistoryError;
use crate::models::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),
    /// `context` is the only part the caller sees.
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: HistoryError,
    },
}

impl ApiError {
    pub fn storage(context: &'static str) -> impl FnOnce(HistoryError) -> ApiError {
        move |source| ApiError::Storage { context, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => {
                debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, *message)
            }
            ApiError::Storage { context, .. } => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, *context)
            }
        };

        (status, Json(ErrorResponse { error: message.to_string() })).into_response()
    }
}
