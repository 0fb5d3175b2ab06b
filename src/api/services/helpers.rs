//! Response helpers shared by the ad handlers

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::AdError;

use super::error_code::ErrorCode;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    pub code: ErrorCode,
}

/// Build a JSON response.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response(
        status,
        &ErrorBody {
            error: message,
            code,
        },
    )
}

/// Map an `AdError` to its status code and body.
///
/// Server-side failures answer with a generic message; the detail stays in
/// the log.
pub fn error_from_ad(err: &AdError) -> HttpResponse {
    let status = err.http_status();
    let message = if status.is_server_error() {
        "Internal server error"
    } else {
        err.message()
    };
    error_response(status, ErrorCode::from(err), message)
}
