// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource naming and label selector building.
//!
//! All workflows correlate the resources of one logical cluster through the
//! selectors built here. A selector is an AND of up to two equality
//! predicates: the role label and the cluster label. Leaving either out
//! broadens the query, e.g. "every resource of cluster `x`" or "every master
//! in the namespace".
//!
//! # Example
//!
//! ```rust
//! use spark_clusters::labels::Role;
//! use spark_clusters::selector::{selector, master_deployment_name};
//!
//! let sel = selector(Some(Role::Master), "demo");
//! assert_eq!(sel.to_string(), "spark-cluster-type=master,spark-cluster=demo");
//! assert_eq!(master_deployment_name("demo"), "demo-m");
//! ```

use crate::constants::{
    MASTER_DEPLOYMENT_SUFFIX, WEB_SERVICE_SUFFIX, WORKER_DEPLOYMENT_SUFFIX,
};
use crate::labels::{Role, CLUSTER_LABEL, TYPE_LABEL};
use kube::api::ListParams;
use std::collections::BTreeMap;
use std::fmt;

/// Label selector over the role and cluster labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClusterSelector {
    role: Option<Role>,
    cluster: Option<String>,
}

/// Build a selector for the given role and cluster name.
///
/// An empty `cluster` omits the cluster predicate; `None` omits the role
/// predicate. With both omitted the selector matches everything.
#[must_use]
pub fn selector(role: Option<Role>, cluster: &str) -> ClusterSelector {
    ClusterSelector {
        role,
        cluster: (!cluster.is_empty()).then(|| cluster.to_string()),
    }
}

impl ClusterSelector {
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    #[must_use]
    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }

    /// Check whether a label map satisfies every predicate of this selector.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let role_ok = self
            .role
            .is_none_or(|role| labels.get(TYPE_LABEL).map(String::as_str) == Some(role.as_str()));
        let cluster_ok = self
            .cluster
            .as_deref()
            .is_none_or(|name| labels.get(CLUSTER_LABEL).map(String::as_str) == Some(name));
        role_ok && cluster_ok
    }

    /// List parameters carrying this selector.
    #[must_use]
    pub fn list_params(&self) -> ListParams {
        let expr = self.to_string();
        if expr.is_empty() {
            ListParams::default()
        } else {
            ListParams::default().labels(&expr)
        }
    }
}

impl fmt::Display for ClusterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms = Vec::with_capacity(2);
        if let Some(role) = self.role {
            terms.push(format!("{TYPE_LABEL}={role}"));
        }
        if let Some(cluster) = &self.cluster {
            terms.push(format!("{CLUSTER_LABEL}={cluster}"));
        }
        f.write_str(&terms.join(","))
    }
}

/// Name of the master deployment for a cluster.
#[must_use]
pub fn master_deployment_name(cluster: &str) -> String {
    format!("{cluster}{MASTER_DEPLOYMENT_SUFFIX}")
}

/// Name of the worker deployment for a cluster.
#[must_use]
pub fn worker_deployment_name(cluster: &str) -> String {
    format!("{cluster}{WORKER_DEPLOYMENT_SUFFIX}")
}

/// Name of the master service. Pre-protocol-v2 Spark requires the master to
/// advertise the same hostname workers connect to, so this is the cluster name.
#[must_use]
pub fn master_service_name(cluster: &str) -> String {
    cluster.to_string()
}

/// Name of the master web UI service.
#[must_use]
pub fn web_service_name(cluster: &str) -> String {
    format!("{cluster}{WEB_SERVICE_SUFFIX}")
}

/// Labels identifying a resource of `role` within `cluster`.
#[must_use]
pub fn correlation_labels(role: Role, cluster: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(CLUSTER_LABEL.to_string(), cluster.to_string());
    labels.insert(TYPE_LABEL.to_string(), role.as_str().to_string());
    labels
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
