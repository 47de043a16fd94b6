// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime environment: target namespace, Spark image and REST coordinates.

use crate::errors::ClusterError;
use crate::templates::RestCoordinates;
use std::path::Path;
use tracing::debug;

/// Values the workflows need from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnvironment {
    namespace: Option<String>,
    image: Option<String>,
    /// REST service coordinates handed to cluster pods
    pub rest: RestCoordinates,
    /// Name reported as `webServiceName` in the server info
    pub web_service_name: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RuntimeEnvironment {
    #[must_use]
    pub fn new(
        namespace: Option<String>,
        image: Option<String>,
        rest: RestCoordinates,
        web_service_name: String,
    ) -> Self {
        Self {
            namespace: non_blank(namespace),
            image: non_blank(image),
            rest,
            web_service_name,
        }
    }

    /// Namespace all cluster resources live in.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::EnvironmentUnavailable`] if none was configured.
    pub fn namespace(&self) -> Result<&str, ClusterError> {
        self.namespace
            .as_deref()
            .ok_or_else(|| ClusterError::environment("Cannot determine target namespace"))
    }

    /// Container image used for masters and workers.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::EnvironmentUnavailable`] if none was configured.
    pub fn image(&self) -> Result<&str, ClusterError> {
        self.image
            .as_deref()
            .ok_or_else(|| ClusterError::environment("Cannot determine name of spark image"))
    }
}

/// Pick the target namespace: explicit value, then the service account
/// namespace file, then the client's default namespace.
pub async fn resolve_namespace(
    explicit: Option<String>,
    service_account_file: &Path,
    client_default: &str,
) -> Option<String> {
    if let Some(namespace) = non_blank(explicit) {
        return Some(namespace);
    }

    match tokio::fs::read_to_string(service_account_file).await {
        Ok(contents) => {
            if let Some(namespace) = non_blank(Some(contents)) {
                debug!(path = %service_account_file.display(), namespace = %namespace, "Namespace from service account");
                return Some(namespace);
            }
        }
        Err(e) => {
            debug!(path = %service_account_file.display(), error = %e, "No service account namespace file");
        }
    }

    non_blank(Some(client_default.to_string()))
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod environment_tests;
