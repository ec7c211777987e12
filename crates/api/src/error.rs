use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use runtime::EngineError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("live location feed is not enabled on this server")]
    LiveFeedUnavailable,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Engine(_) => StatusCode::CONFLICT,
            Self::LiveFeedUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
