// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Spark cluster service.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

use std::time::Duration;

// ============================================================================
// Application Constants
// ============================================================================

/// Application name reported by the server info endpoint
pub const APP_NAME: &str = "spark-clusters";

/// Field manager / managed-by value for resources created by this service
pub const MANAGER_NAME: &str = "spark-clusters";

// ============================================================================
// Resource Naming
// ============================================================================

/// Suffix appended to the cluster name for the master deployment
pub const MASTER_DEPLOYMENT_SUFFIX: &str = "-m";

/// Suffix appended to the cluster name for the worker deployment
pub const WORKER_DEPLOYMENT_SUFFIX: &str = "-w";

/// Suffix appended to the cluster name (master hostname) for the web UI service
pub const WEB_SERVICE_SUFFIX: &str = "-ui";

// ============================================================================
// Spark Ports
// ============================================================================

/// Port name for the Spark master cluster protocol
pub const MASTER_PORT_NAME: &str = "spark-master";

/// Spark master cluster protocol port
pub const MASTER_PORT: i32 = 7077;

/// Port name for Spark web UIs (master and worker)
pub const WEB_PORT_NAME: &str = "spark-webui";

/// Spark master web UI port
pub const WEB_PORT: i32 = 8080;

/// Spark worker web UI port
pub const WORKER_WEB_PORT: i32 = 8081;

// ============================================================================
// Spark Container Configuration
// ============================================================================

/// Mount point for Spark configuration `ConfigMap` volumes
pub const SPARK_CONF_DIR: &str = "/etc/spark-cluster-configs";

/// Number of replicas for the master deployment
pub const MASTER_REPLICAS: i32 = 1;

/// Image pull policy for Spark containers
pub const IMAGE_PULL_POLICY: &str = "IfNotPresent";

/// Env var carrying the cluster name into Spark pods
pub const ENV_CLUSTER_NAME: &str = "SPARK_CLUSTER_NAME";

/// Env var carrying the REST service host into Spark pods
pub const ENV_REST_HOST: &str = "SPARK_CLUSTERS_REST_HOST";

/// Env var carrying the REST service port into Spark pods
pub const ENV_REST_PORT: &str = "SPARK_CLUSTERS_REST_PORT";

/// Env var pointing Spark at the mounted configuration directory
pub const ENV_SPARK_CONF_DIR: &str = "SPARK_CONF_DIR";

/// Env var pointing workers at the master's cluster protocol address
pub const ENV_MASTER_ADDRESS: &str = "SPARK_MASTER_ADDRESS";

/// Env var pointing workers at the master's web UI address
pub const ENV_MASTER_UI_ADDRESS: &str = "SPARK_MASTER_UI_ADDRESS";

// ============================================================================
// Health Check Configuration
// ============================================================================

/// Liveness probe initial delay (seconds)
pub const LIVENESS_INITIAL_DELAY_SECS: i32 = 10;

/// Liveness probe period (seconds)
pub const LIVENESS_PERIOD_SECS: i32 = 10;

/// Liveness probe timeout (seconds)
pub const LIVENESS_TIMEOUT_SECS: i32 = 5;

/// Liveness probe failure threshold
pub const LIVENESS_FAILURE_THRESHOLD: i32 = 3;

/// Readiness probe initial delay (seconds)
pub const READINESS_INITIAL_DELAY_SECS: i32 = 5;

/// Readiness probe period (seconds)
pub const READINESS_PERIOD_SECS: i32 = 5;

/// Readiness probe timeout (seconds)
pub const READINESS_TIMEOUT_SECS: i32 = 3;

/// Readiness probe failure threshold
pub const READINESS_FAILURE_THRESHOLD: i32 = 3;

// ============================================================================
// Cluster Status Values
// ============================================================================

/// Status reported when the master service resolves to an address
pub const STATUS_RUNNING: &str = "Running";

/// Status reported when no master service could be found
pub const STATUS_MASTER_SERVICE_MISSING: &str = "MasterServiceMissing";

/// Worker count reported when worker pods could not be listed
pub const WORKER_COUNT_UNKNOWN: i64 = -1;

// ============================================================================
// Named Profile Configuration
// ============================================================================

/// Name of the profile applied to every request before any named profile
pub const DEFAULT_PROFILE_NAME: &str = "default";

/// Fallback master count when no default profile overrides it
pub const FALLBACK_MASTER_COUNT: i32 = 1;

/// Fallback worker count when no default profile overrides it
pub const FALLBACK_WORKER_COUNT: i32 = 1;

/// Profile key holding the master count
pub const PROFILE_KEY_MASTER_COUNT: &str = "mastercount";

/// Profile key holding the worker count
pub const PROFILE_KEY_WORKER_COUNT: &str = "workercount";

/// Profile key holding the master Spark configuration `ConfigMap` name
pub const PROFILE_KEY_MASTER_CONFIG: &str = "sparkmasterconfig";

/// Profile key holding the worker Spark configuration `ConfigMap` name
pub const PROFILE_KEY_WORKER_CONFIG: &str = "sparkworkerconfig";

// ============================================================================
// Wait / Polling Configuration
// ============================================================================

/// Attempts made while waiting for controllers to materialize after create
pub const MATERIALIZE_WAIT_ATTEMPTS: u32 = 4;

/// Interval between materialization checks
pub const MATERIALIZE_WAIT_INTERVAL: Duration = Duration::from_millis(250);

/// Attempts made while waiting for a scaled-down controller to drain
pub const DRAIN_WAIT_ATTEMPTS: u32 = 5;

/// Interval between drain checks
pub const DRAIN_WAIT_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// Kubernetes API Client Configuration
// ============================================================================

/// Page size for Kubernetes API list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

/// Service account namespace file used when no namespace is configured
pub const SERVICE_ACCOUNT_NAMESPACE_PATH: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

// ============================================================================
// REST Server Configuration
// ============================================================================

/// Default listen address for the REST server
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Default listen port for the REST server
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Base path for cluster resources
pub const CLUSTERS_PATH: &str = "/clusters";
