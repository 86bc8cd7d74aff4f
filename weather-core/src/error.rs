use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    provider::ProviderError,
    validate::{ValidationCode, ValidationError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    PlaceNotFound,
    ThemeNotFound,
    LangNotSupported,
    TzNotSupported,
    InvalidQuery,
    InvalidApiKey,
    ApiError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PlaceNotFound => "place_not_found",
            ErrorCode::ThemeNotFound => "theme_not_found",
            ErrorCode::LangNotSupported => "lang_not_supported",
            ErrorCode::TzNotSupported => "tz_not_supported",
            ErrorCode::InvalidQuery => "invalid_query",
            ErrorCode::InvalidApiKey => "invalid_api_key",
            ErrorCode::ApiError => "api_error",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

impl From<ValidationCode> for ErrorCode {
    fn from(code: ValidationCode) -> Self {
        match code {
            ValidationCode::PlaceNotFound => ErrorCode::PlaceNotFound,
            ValidationCode::ThemeNotFound => ErrorCode::ThemeNotFound,
            ValidationCode::LangNotSupported => ErrorCode::LangNotSupported,
            ValidationCode::TzNotSupported => ErrorCode::TzNotSupported,
        }
    }
}

/// Error as reported to the caller.
///
/// Everything past validation carries a fresh `error_id` that also appears in
/// the server log line for the failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} ({status}): {message}", .code.as_str())]
pub struct ApiError {
    pub code: ErrorCode,
    pub status: u16,
    pub message: String,
    pub error_id: Option<String>,
    /// Underlying cause, only set for `internal_error`.
    pub detail: Option<String>,
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub status: &'static str,
    pub code: ErrorCode,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<&'a str>,
}

fn new_error_id() -> String {
    Uuid::new_v4().to_string()
}

impl ApiError {
    fn with_id(code: ErrorCode, status: u16, message: String) -> Self {
        Self { code, status, message, error_id: Some(new_error_id()), detail: None }
    }

    /// Translate a failed provider call.
    pub fn from_provider(err: &ProviderError, place: &str) -> Self {
        match err {
            ProviderError::Status { status: 404, .. } => Self::with_id(
                ErrorCode::PlaceNotFound,
                404,
                format!("Place '{place}' not found."),
            ),
            ProviderError::Status { status: 401, .. } => Self::with_id(
                ErrorCode::InvalidApiKey,
                401,
                "Invalid or missing API key.".to_string(),
            ),
            ProviderError::Status { status, message } => {
                let reason = message
                    .clone()
                    .unwrap_or_else(|| format!("Request failed with status code {status}"));
                Self::with_id(ErrorCode::ApiError, *status, format!("External API error: {reason}"))
            }
            ProviderError::Transport(reason) => {
                Self::with_id(ErrorCode::ApiError, 502, format!("External API error: {reason}"))
            }
            ProviderError::MissingCredential | ProviderError::Decode(_) => Self::internal(err),
        }
    }

    /// Query string that could not be read at all, e.g. a repeated parameter.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidQuery,
            status: 400,
            message: message.into(),
            error_id: None,
            detail: None,
        }
    }

    /// Anything unexpected.
    pub fn internal(cause: impl Display) -> Self {
        Self {
            detail: Some(cause.to_string()),
            ..Self::with_id(ErrorCode::InternalError, 500, "Internal server error.".to_string())
        }
    }

    /// Same failure under a new `error_id`, for callers that joined someone
    /// else's failed request. Errors without an id stay as they are.
    pub fn reissued(&self) -> Self {
        match self.error_id {
            Some(_) => Self { error_id: Some(new_error_id()), ..self.clone() },
            None => self.clone(),
        }
    }

    pub fn body(&self) -> ErrorBody<'_> {
        ErrorBody {
            status: "error",
            code: self.code,
            message: &self.message,
            error: self.detail.as_deref(),
            error_id: self.error_id.as_deref(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self {
            code: err.code.into(),
            status: 400,
            message: err.message,
            error_id: None,
            detail: None,
        }
    }
}
