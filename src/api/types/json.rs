//! JSON body extractor whose rejections use the API error envelope

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::error::{ApiError, ApiErrorType};

/// `axum::Json` with rejections reported as [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Json(value))
            .map_err(body_error)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Keep axum's status, but name the failure in `code`
fn body_error(rejection: JsonRejection) -> ApiError {
    let status = rejection.status();
    let (code, message) = match &rejection {
        JsonRejection::JsonDataError(err) => (
            "invalid_field",
            format!("Request body has a missing or mistyped field: {}", err.body_text()),
        ),
        JsonRejection::JsonSyntaxError(err) => (
            "malformed_json",
            format!("Request body is not valid JSON: {}", err.body_text()),
        ),
        JsonRejection::MissingJsonContentType(_) => (
            "unsupported_media_type",
            "Request body must be sent as 'application/json'".to_string(),
        ),
        other => ("unreadable_body", other.body_text()),
    };

    debug!(status = %status, code, "Rejected request body");
    ApiError::new(status, ApiErrorType::InvalidRequestError, message).with_code(code)
}
