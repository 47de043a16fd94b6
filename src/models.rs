// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Request and response records exchanged with the REST layer.
//!
//! None of these are stored anywhere. A [`LogicalCluster`] is rebuilt from live
//! platform state on every read.

use crate::constants::{STATUS_MASTER_SERVICE_MISSING, STATUS_RUNNING};
use serde::{Deserialize, Serialize};

/// Cluster sizing and configuration as supplied by a caller.
///
/// Every field is optional. Zero counts and empty strings mean "no override",
/// not "set to zero".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigRequest {
    /// Named profile to start from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub master_count: i32,

    #[serde(default)]
    pub worker_count: i32,

    /// `ConfigMap` holding Spark configuration for the master
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spark_master_config: String,

    /// `ConfigMap` holding Spark configuration for the workers
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spark_worker_config: String,
}

/// Final, validated cluster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub master_count: i32,
    pub worker_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_master_config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_worker_config: Option<String>,
}

/// Body of create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCluster {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ClusterConfigRequest>,
}

/// One pod of a cluster as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodReport {
    pub ip: String,
    /// Pod phase (e.g. `Running`, `Pending`)
    pub status: String,
    /// Role label of the pod
    #[serde(rename = "type")]
    pub role: String,
}

/// Live view of a single cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalCluster {
    pub name: String,
    pub master_url: String,
    pub master_web_url: String,
    pub status: String,
    pub pods: Vec<PodReport>,
    pub config: ClusterConfig,
}

/// Response wrapper for single-cluster operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleCluster {
    pub cluster: LogicalCluster,
}

/// One entry of the cluster list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub name: String,
    pub href: String,
    pub master_url: String,
    pub master_web_url: String,
    pub status: String,
    /// Number of worker pods, or -1 when they could not be listed
    pub worker_count: i64,
}

/// Response body for the cluster list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterList {
    pub clusters: Vec<ClusterSummary>,
}

/// Application block of the server info response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    pub name: String,
    pub version: String,
    pub web_service_name: String,
}

/// Response body for `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub application: ApplicationInfo,
}

/// A single error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModel {
    pub status: u16,
    pub title: String,
    pub details: String,
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorModel>,
}

impl ErrorResponse {
    #[must_use]
    pub fn single(status: u16, title: &str, details: String) -> Self {
        Self {
            errors: vec![ErrorModel {
                status,
                title: title.to_string(),
                details,
            }],
        }
    }
}

/// Derive the reported cluster status from the master URL.
#[must_use]
pub fn derive_status(master_url: &str) -> &'static str {
    if master_url.is_empty() {
        STATUS_MASTER_SERVICE_MISSING
    } else {
        STATUS_RUNNING
    }
}
