//! API error codes

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::AdError;

/// Numeric code carried in every error body.
///
/// Grouped by thousands:
/// - 0: success
/// - 1000-1099: generic
/// - 3000-3099: ad errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    AdValidationFailed = 3000,
    AdQuotaExceeded = 3001,
    AdStorageError = 3002,
    AdEncodingError = 3003,
}

impl From<&AdError> for ErrorCode {
    fn from(err: &AdError) -> Self {
        match err {
            AdError::Validation(_) => ErrorCode::AdValidationFailed,
            AdError::QuotaExceeded(_) => ErrorCode::AdQuotaExceeded,
            AdError::Storage(_) => ErrorCode::AdStorageError,
            AdError::Encoding(_) => ErrorCode::AdEncodingError,
            AdError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}
