// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mapping of workflow errors to REST error responses.
//!
//! Every failed request is answered with an [`ErrorResponse`] holding a single
//! entry. The status comes from the error class, the title from the operation
//! that failed and the details from the error message.
//!
//! # Status Mapping
//!
//! | Error | Status |
//! |-------|--------|
//! | `NotFound` | 404 |
//! | `ConfigurationInvalid` | 409 |
//! | `ConfigVolumeMissing` | 409 |
//! | `ResourceConflict` | 409 |
//! | `UnsupportedMutation` | 409 |
//! | `EnvironmentUnavailable` | 500 |
//! | `Platform` | 500 |
//! | `PartialFailure` | 500 |
//!
//! # Usage
//!
//! ```rust
//! use spark_clusters::errors::ClusterError;
//! use spark_clusters::http_errors::{ApiError, TITLE_GET};
//!
//! let err = ApiError::from_cluster(TITLE_GET, &ClusterError::not_found("No such cluster"));
//! assert_eq!(err.status.as_u16(), 404);
//! assert_eq!(err.body().errors[0].title, "Cannot get cluster");
//! ```

use crate::errors::ClusterError;
use crate::models::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Title of a failed create
pub const TITLE_CREATE: &str = "Cannot create cluster";

/// Title of a failed delete
pub const TITLE_DELETE: &str = "Cluster deletion failed";

/// Title of a failed find
pub const TITLE_GET: &str = "Cannot get cluster";

/// Title of a failed list
pub const TITLE_LIST: &str = "Cannot list clusters";

/// Title of a failed update
pub const TITLE_UPDATE: &str = "Cannot update cluster";

/// Title of a failed metrics scrape
pub const TITLE_METRICS: &str = "Cannot gather metrics";

/// A REST error ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub details: String,
}

impl ApiError {
    /// Map a workflow error, keeping its message as the details.
    #[must_use]
    pub fn from_cluster(title: &'static str, error: &ClusterError) -> Self {
        Self {
            status: status_for(error),
            title,
            details: error.to_string(),
        }
    }

    /// A request body that could not be read.
    #[must_use]
    pub fn bad_request(title: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            title,
            details: details.into(),
        }
    }

    /// A failure outside of the cluster workflows.
    #[must_use]
    pub fn internal(title: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            title,
            details: details.into(),
        }
    }

    #[must_use]
    pub fn body(&self) -> ErrorResponse {
        ErrorResponse::single(self.status.as_u16(), self.title, self.details.clone())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

/// HTTP status for a workflow error.
#[must_use]
pub fn status_for(error: &ClusterError) -> StatusCode {
    StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
