//! Response envelope shared by every chart operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DryRunError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiCode {
    Ok,
    ValidationError,
    VersionMismatch,
    NotFound,
    InternalError,
}

impl ApiCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::VersionMismatch => "VERSION_MISMATCH",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ApiCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub code: ApiCode,
    pub message: String,
    pub trace_id: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: ApiCode::Ok,
            message: "success".to_string(),
            trace_id: new_trace_id(),
            data: Some(data),
        }
    }

    pub fn error(err: &DryRunError) -> Self {
        let response = Self {
            code: err.code(),
            message: err.to_string(),
            trace_id: new_trace_id(),
            data: None,
        };
        tracing::debug!(code = %response.code, trace_id = %response.trace_id, "error response");
        response
    }

    pub fn from_result(result: Result<T, DryRunError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::error(&err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ApiCode::Ok
    }
}

fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}
