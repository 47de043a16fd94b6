// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Compute platform abstraction.
//!
//! The workflows never talk to Kubernetes directly. They go through the
//! [`Platform`] trait, which covers the four resource kinds a Spark cluster is
//! made of plus `ConfigMap` lookups:
//!
//! - **Deployment** - desired-state object created per role
//! - **ReplicaSet** - the controller materialized from a deployment; its
//!   replica count is what discovery reports and teardown drains
//! - **Service** - master and web UI endpoints
//! - **Pod** - reported in cluster views
//!
//! Every call is scoped to a namespace and lists are filtered by a
//! [`ClusterSelector`]. [`kubernetes::KubePlatform`] is the production
//! implementation; tests use an in-memory fake.

pub mod kubernetes;
pub mod pagination;

#[cfg(test)]
pub mod fake;

use crate::selector::ClusterSelector;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Service};
use thiserror::Error;

/// Kind name for `Deployment` resources
pub const KIND_DEPLOYMENT: &str = "Deployment";

/// Kind name for `ReplicaSet` resources
pub const KIND_REPLICA_SET: &str = "ReplicaSet";

/// Kind name for `Service` resources
pub const KIND_SERVICE: &str = "Service";

/// Kind name for `Pod` resources
pub const KIND_POD: &str = "Pod";

/// Kind name for `ConfigMap` resources
pub const KIND_CONFIG_MAP: &str = "ConfigMap";

/// Classified failure of a platform call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A resource with the same name already exists (HTTP 409 `AlreadyExists`)
    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists {
        /// Resource kind
        kind: &'static str,
        /// Resource name
        name: String,
    },

    /// The resource does not exist (HTTP 404)
    #[error("{kind} \"{name}\" not found")]
    NotFound {
        /// Resource kind
        kind: &'static str,
        /// Resource name
        name: String,
    },

    /// Any other API error response
    #[error("{message} (HTTP {code})")]
    Api {
        /// HTTP status code returned by the API server
        code: u16,
        /// Message returned by the API server
        message: String,
    },

    /// The platform could not be reached or the response could not be decoded
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, PlatformError::AlreadyExists { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound { .. })
    }
}

/// Namespaced access to the resources a Spark cluster is built from.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn list_deployments(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Deployment>, PlatformError>;

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, PlatformError>;

    /// Set the desired replica count of a deployment.
    async fn scale_deployment(
        &self,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<(), PlatformError>;

    /// Delete a deployment, leaving its replica sets in place.
    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), PlatformError>;

    async fn list_controllers(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<ReplicaSet>, PlatformError>;

    async fn get_controller(&self, namespace: &str, name: &str)
        -> Result<ReplicaSet, PlatformError>;

    /// Replace a replica set with the given object (used to change replicas).
    async fn update_controller(
        &self,
        namespace: &str,
        controller: &ReplicaSet,
    ) -> Result<ReplicaSet, PlatformError>;

    async fn delete_controller(&self, namespace: &str, name: &str) -> Result<(), PlatformError>;

    async fn list_services(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Service>, PlatformError>;

    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<Service, PlatformError>;

    async fn delete_service(&self, namespace: &str, name: &str) -> Result<(), PlatformError>;

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Pod>, PlatformError>;

    /// Look up a `ConfigMap`; `Ok(None)` when it does not exist.
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, PlatformError>;
}
