//! HTTP error response conversion
//!
//! Errors render in one of two modes: a structured JSON payload for clients
//! that ask for it (fetch/XHR via `X-Requested-With`, or an `Accept` header
//! preferring JSON), and a small HTML page for plain browser navigations.
//! Handlers return `Result<Response, HttpAppError>` and use
//! [`error_response`] when they need the negotiated rendering.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use cutout_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;
use std::convert::Infallible;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from cutout-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Negotiated error rendering for the requesting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Html,
}

impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let is_xhr = parts
            .headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false);

        let accepts_json = parts
            .headers
            .get(axum::http::header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        if is_xhr || accepts_json {
            Ok(ResponseFormat::Json)
        } else {
            Ok(ResponseFormat::Html)
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

fn json_body(app_error: &AppError) -> ErrorResponse {
    // Always hide details in production for security; in non-production, only
    // show details for non-sensitive errors.
    if is_production_env() || app_error.is_sensitive() {
        ErrorResponse {
            error: app_error.client_message(),
            details: None,
            error_type: None,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
        }
    } else {
        ErrorResponse {
            error: app_error.client_message(),
            details: Some(app_error.detailed_message()),
            error_type: Some(app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
        }
    }
}

fn html_body(status: StatusCode, message: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><title>{status}</title></head>\n\
         <body>\n<h1>{status}</h1>\n<p>{message}</p>\n</body>\n</html>\n",
        status = status,
        message = message,
    )
}

/// Render an error in the format the client negotiated.
pub fn error_response(error: HttpAppError, format: ResponseFormat) -> Response {
    let app_error = &error.0;

    let status = StatusCode::from_u16(app_error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    log_error(app_error);

    match format {
        ResponseFormat::Json => (status, Json(json_body(app_error))).into_response(),
        ResponseFormat::Html => {
            (status, Html(html_body(status, &app_error.client_message()))).into_response()
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        // Default rendering is JSON; handlers that hold a ResponseFormat use
        // error_response instead.
        error_response(self, ResponseFormat::Json)
    }
}
