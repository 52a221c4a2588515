use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::search::SearchError;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidPriceRange,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    #[serde(rename = "traceId", skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
    trace_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            trace_id: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
            trace_id: self.trace_id,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        // Backend failures get an opaque response; the trace id in the body
        // matches the one in the error log.
        let trace_id = uuid::Uuid::new_v4().simple().to_string();
        match err {
            SearchError::Validation(message) => {
                Self::bad_request(message).with_code(ErrorCode::InvalidPriceRange)
            }
            SearchError::Index(ref e) => {
                tracing::error!(%trace_id, "Search index error: {:?}", e);
                Self::internal("search is temporarily unavailable").with_trace_id(trace_id)
            }
            SearchError::Cache(ref e) => {
                tracing::error!(%trace_id, "Cache error: {:?}", e);
                Self::internal("search is temporarily unavailable").with_trace_id(trace_id)
            }
            SearchError::Serialization(ref e) => {
                tracing::error!(%trace_id, "Malformed index response: {:?}", e);
                Self::internal("search is temporarily unavailable").with_trace_id(trace_id)
            }
        }
    }
}
