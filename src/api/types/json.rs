//! JSON body extractor
//!
//! Malformed or incomplete request bodies are answered with the regular error
//! envelope and a 400 status, whatever stage of parsing failed.

use axum::{
    extract::{rejection::JsonRejection as AxumRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

/// Why a request body could not be turned into the expected type
#[derive(Debug)]
pub struct BodyRejection {
    code: &'static str,
    message: String,
}

impl BodyRejection {
    fn from_axum(rejection: &AxumRejection) -> Self {
        match rejection {
            AxumRejection::MissingJsonContentType(_) => Self {
                code: "unsupported_media_type",
                message: "Expected 'Content-Type: application/json'".to_string(),
            },
            AxumRejection::JsonSyntaxError(err) => Self {
                code: "json_parse_error",
                message: format!("Malformed JSON body: {}", err.body_text()),
            },
            AxumRejection::JsonDataError(err) => Self {
                code: "json_parse_error",
                message: format!("Unexpected JSON body: {}", err.body_text()),
            },
            other => Self {
                code: "json_parse_error",
                message: format!("Unreadable request body: {}", other.body_text()),
            },
        }
    }

    fn status(&self) -> StatusCode {
        match self.code {
            "unsupported_media_type" => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        ApiError::new(self.status(), ApiErrorType::InvalidRequestError, self.message)
            .with_code(self.code)
            .into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(|rejection| BodyRejection::from_axum(&rejection))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
