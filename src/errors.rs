// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error taxonomy for cluster lifecycle operations.
//!
//! Every workflow returns a [`ClusterError`] on failure. Each variant maps to
//! exactly one HTTP status class (see [`ClusterError::status_code`]); the REST
//! layer pairs it with a per-operation title in [`crate::http_errors`].

use crate::labels::Role;
use crate::platform::PlatformError;
use thiserror::Error;

/// Errors surfaced by the cluster workflows.
#[derive(Error, Debug, Clone)]
pub enum ClusterError {
    /// Namespace, image or platform client could not be determined (HTTP 500)
    #[error("{message}")]
    EnvironmentUnavailable {
        /// What could not be determined
        message: String,
    },

    /// The merged cluster configuration is invalid (HTTP 409)
    ///
    /// Covers a missing named profile, malformed stored values, an unreadable
    /// profile store and zero counts after merge.
    #[error("Cluster configuration error, err: {reason}")]
    ConfigurationInvalid {
        /// Explanation of what is invalid
        reason: String,
    },

    /// A referenced Spark configuration `ConfigMap` does not exist (HTTP 409)
    #[error("Error processing spark {role} configuration value, err: {reason}")]
    ConfigVolumeMissing {
        /// Whether the master or worker reference is missing
        role: Role,
        /// Name of the referenced `ConfigMap`
        name: String,
        /// Why the lookup failed
        reason: String,
    },

    /// The platform reported that a resource already exists (HTTP 409)
    #[error("{message}, err: {source}")]
    ResourceConflict {
        /// What was being attempted
        message: String,
        /// The underlying platform error
        source: PlatformError,
    },

    /// The cluster does not exist (HTTP 404)
    #[error("{message}")]
    NotFound {
        /// Human-readable explanation
        message: String,
    },

    /// The request tries to change something that cannot be changed (HTTP 409)
    #[error("{message}")]
    UnsupportedMutation {
        /// Human-readable explanation
        message: String,
    },

    /// Any other platform failure (HTTP 500)
    #[error("{message}{}", cause_suffix(.source.as_ref()))]
    Platform {
        /// What was being attempted
        message: String,
        /// The underlying platform error, when there was one
        source: Option<PlatformError>,
    },

    /// Teardown completed with non-fatal sub-step failures (HTTP 500)
    #[error("Deletion may be incomplete: {details}")]
    PartialFailure {
        /// Comma-joined list of every sub-step failure
        details: String,
    },
}

fn cause_suffix(source: Option<&PlatformError>) -> String {
    source.map(|e| format!(", err: {e}")).unwrap_or_default()
}

impl ClusterError {
    /// Map the error to its HTTP status class.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ClusterError::EnvironmentUnavailable { .. }
            | ClusterError::Platform { .. }
            | ClusterError::PartialFailure { .. } => 500,
            ClusterError::ConfigurationInvalid { .. }
            | ClusterError::ConfigVolumeMissing { .. }
            | ClusterError::ResourceConflict { .. }
            | ClusterError::UnsupportedMutation { .. } => 409,
            ClusterError::NotFound { .. } => 404,
        }
    }

    pub fn environment(message: impl Into<String>) -> Self {
        Self::EnvironmentUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            reason: reason.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedMutation {
            message: message.into(),
        }
    }

    pub fn platform(message: impl Into<String>, source: PlatformError) -> Self {
        Self::Platform {
            message: message.into(),
            source: Some(source),
        }
    }

    /// A platform-class failure with no underlying platform error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
            source: None,
        }
    }

    /// Classify a failed create call: "already exists" is a conflict,
    /// everything else a platform failure.
    pub fn from_create(message: impl Into<String>, source: PlatformError) -> Self {
        if source.is_already_exists() {
            Self::ResourceConflict {
                message: message.into(),
                source,
            }
        } else {
            Self::platform(message, source)
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
