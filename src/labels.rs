// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label constants and the cluster role type.
//!
//! Every resource belonging to a Spark cluster carries the cluster label and a
//! role label. Discovery and teardown correlate resources purely through these
//! two labels; there is no other record of which clusters exist.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture (e.g., "spark-master")
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of the application
pub const K8S_NAME: &str = "app.kubernetes.io/name";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

/// Application name for Spark resources
pub const APP_NAME_SPARK: &str = "spark";

// ============================================================================
// Correlation Labels
// ============================================================================

/// Label holding the role of a resource within its cluster (master, worker, webui)
pub const TYPE_LABEL: &str = "spark-cluster-type";

/// Label holding the name of the cluster a resource belongs to
pub const CLUSTER_LABEL: &str = "spark-cluster";

// ============================================================================
// Role Values
// ============================================================================

/// Role value for master resources
pub const ROLE_MASTER: &str = "master";

/// Role value for worker resources
pub const ROLE_WORKER: &str = "worker";

/// Role value for the master web UI service
pub const ROLE_WEBUI: &str = "webui";

/// Role of a resource within a Spark cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Worker,
    #[serde(rename = "webui")]
    WebUi,
}

impl Role {
    /// Label value for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Master => ROLE_MASTER,
            Role::Worker => ROLE_WORKER,
            Role::WebUi => ROLE_WEBUI,
        }
    }

    /// Value used for the `app.kubernetes.io/component` label.
    #[must_use]
    pub const fn component(self) -> &'static str {
        match self {
            Role::Master => "spark-master",
            Role::Worker => "spark-worker",
            Role::WebUi => "spark-webui",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
