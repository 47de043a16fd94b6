// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Discovery and aggregation: build cluster views from labeled resources.

use super::{observe, OP_FIND, OP_LIST};
use crate::constants::{CLUSTERS_PATH, WORKER_COUNT_UNKNOWN};
use crate::context::Context;
use crate::errors::ClusterError;
use crate::labels::{Role, CLUSTER_LABEL, TYPE_LABEL};
use crate::models::{derive_status, ClusterConfig, ClusterSummary, LogicalCluster, PodReport};
use crate::platform::{Platform, PlatformError};
use crate::selector::selector;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::Pod;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// A cluster exists iff both its master and worker deployments exist.
pub(crate) async fn cluster_exists(
    platform: &dyn Platform,
    namespace: &str,
    name: &str,
) -> Result<bool, PlatformError> {
    for role in [Role::Master, Role::Worker] {
        let deployments = platform
            .list_deployments(namespace, &selector(Some(role), name))
            .await?;
        if deployments.is_empty() {
            debug!(cluster = %name, role = %role, "No deployment for role");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Pick the controller with the latest creation timestamp.
///
/// Ties (and missing timestamps) keep the earliest listed candidate.
pub(crate) fn pick_latest(controllers: Vec<ReplicaSet>) -> Option<ReplicaSet> {
    let created = |rs: &ReplicaSet| rs.metadata.creation_timestamp.as_ref().map(|t| t.0);
    controllers.into_iter().reduce(|newest, candidate| {
        if created(&candidate) > created(&newest) {
            candidate
        } else {
            newest
        }
    })
}

/// The current controller for `role` in cluster `name`.
pub(crate) async fn latest_controller(
    platform: &dyn Platform,
    namespace: &str,
    role: Role,
    name: &str,
) -> Result<Option<ReplicaSet>, PlatformError> {
    let controllers = platform
        .list_controllers(namespace, &selector(Some(role), name))
        .await?;
    if controllers.len() > 1 {
        debug!(
            cluster = %name,
            role = %role,
            count = controllers.len(),
            "Multiple controllers match, using the newest"
        );
    }
    Ok(pick_latest(controllers))
}

fn desired_replicas(controller: &ReplicaSet) -> i32 {
    controller
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1)
}

/// URL of the first service for `role`, or `""` if none can be found.
pub(crate) async fn service_url(
    platform: &dyn Platform,
    namespace: &str,
    role: Role,
    name: &str,
) -> String {
    let services = match platform
        .list_services(namespace, &selector(Some(role), name))
        .await
    {
        Ok(services) => services,
        Err(e) => {
            debug!(cluster = %name, role = %role, error = %e, "Unable to list services");
            return String::new();
        }
    };

    let scheme = if role == Role::Master { "spark" } else { "http" };
    services
        .first()
        .and_then(|svc| {
            let port = svc.spec.as_ref()?.ports.as_ref()?.first()?.port;
            let svc_name = svc.metadata.name.as_deref()?;
            Some(format!("{scheme}://{svc_name}:{port}"))
        })
        .unwrap_or_default()
}

fn pod_report(pod: &Pod) -> PodReport {
    let status = pod.status.as_ref();
    PodReport {
        ip: status.and_then(|s| s.pod_ip.clone()).unwrap_or_default(),
        status: status.and_then(|s| s.phase.clone()).unwrap_or_default(),
        role: pod
            .metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(TYPE_LABEL).cloned())
            .unwrap_or_default(),
    }
}

/// Build the live view of cluster `name`, reporting `config` as its configuration.
pub(crate) async fn cluster_view(
    platform: &dyn Platform,
    namespace: &str,
    name: &str,
    config: ClusterConfig,
) -> Result<LogicalCluster, PlatformError> {
    let master_url = service_url(platform, namespace, Role::Master, name).await;
    let master_web_url = service_url(platform, namespace, Role::WebUi, name).await;

    let mut pods = Vec::new();
    for role in [Role::Master, Role::Worker] {
        let found = platform
            .list_pods(namespace, &selector(Some(role), name))
            .await?;
        pods.extend(found.iter().map(pod_report));
    }

    Ok(LogicalCluster {
        name: name.to_string(),
        status: derive_status(&master_url).to_string(),
        master_url,
        master_web_url,
        pods,
        config,
    })
}

async fn require_controller(
    platform: &dyn Platform,
    namespace: &str,
    role: Role,
    name: &str,
    message: &str,
) -> Result<ReplicaSet, ClusterError> {
    latest_controller(platform, namespace, role, name)
        .await
        .map_err(|e| ClusterError::platform(message, e))?
        .ok_or_else(|| ClusterError::internal(message))
}

/// Check existence and fail with the matching error.
pub(crate) async fn ensure_exists(
    platform: &dyn Platform,
    namespace: &str,
    name: &str,
) -> Result<(), ClusterError> {
    // An empty name drops the cluster predicate and would match any cluster.
    if name.is_empty() {
        return Err(ClusterError::not_found("No such cluster"));
    }
    let exists = cluster_exists(platform, namespace, name)
        .await
        .map_err(|e| ClusterError::platform("Error while looking up cluster", e))?;
    if exists {
        Ok(())
    } else {
        Err(ClusterError::not_found("No such cluster"))
    }
}

/// Find one cluster by name.
///
/// The reported master and worker counts are the desired replica counts of
/// the current controllers.
///
/// # Errors
///
/// - [`ClusterError::NotFound`] if either deployment is missing
/// - [`ClusterError::Platform`] if a controller is missing or a lookup fails
#[instrument(skip(ctx))]
pub async fn find_cluster(ctx: &Context, name: &str) -> Result<LogicalCluster, ClusterError> {
    let start = Instant::now();
    let result = find_cluster_inner(ctx, name).await;
    observe(OP_FIND, start, result)
}

async fn find_cluster_inner(ctx: &Context, name: &str) -> Result<LogicalCluster, ClusterError> {
    let namespace = ctx.environment.namespace()?;
    let platform = ctx.platform.as_ref();

    ensure_exists(platform, namespace, name).await?;

    let master = require_controller(
        platform,
        namespace,
        Role::Master,
        name,
        "Cannot find replication controller for spark master",
    )
    .await?;
    let worker = require_controller(
        platform,
        namespace,
        Role::Worker,
        name,
        "Cannot find replication controller for spark workers",
    )
    .await?;

    let config = ClusterConfig {
        master_count: desired_replicas(&master),
        worker_count: desired_replicas(&worker),
        spark_master_config: None,
        spark_worker_config: None,
    };

    cluster_view(platform, namespace, name, config)
        .await
        .map_err(|e| ClusterError::platform("Failed to construct a response object", e))
}

/// Summarize every cluster that has at least one master pod.
///
/// Clusters are reported in the order their first master pod is listed.
/// A worker count of `-1` means the worker pods could not be listed.
///
/// # Errors
///
/// Returns [`ClusterError::Platform`] if the master pods cannot be listed.
#[instrument(skip(ctx))]
pub async fn list_clusters(ctx: &Context) -> Result<Vec<ClusterSummary>, ClusterError> {
    let start = Instant::now();
    let result = list_clusters_inner(ctx).await;
    observe(OP_LIST, start, result)
}

async fn list_clusters_inner(ctx: &Context) -> Result<Vec<ClusterSummary>, ClusterError> {
    let namespace = ctx.environment.namespace()?;
    let platform = ctx.platform.as_ref();

    let masters = platform
        .list_pods(namespace, &selector(Some(Role::Master), ""))
        .await
        .map_err(|e| ClusterError::platform("Unable to find spark masters", e))?;

    let mut names: Vec<String> = Vec::new();
    for pod in &masters {
        let cluster = pod
            .metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(CLUSTER_LABEL))
            .filter(|c| !c.is_empty());
        match cluster {
            Some(cluster) if !names.contains(cluster) => names.push(cluster.clone()),
            Some(_) => {}
            None => debug!(pod = ?pod.metadata.name, "Master pod without cluster label, skipping"),
        }
    }

    let mut summaries = Vec::with_capacity(names.len());
    for name in names {
        let worker_count = match platform
            .list_pods(namespace, &selector(Some(Role::Worker), &name))
            .await
        {
            Ok(workers) => i64::try_from(workers.len()).unwrap_or(i64::MAX),
            Err(e) => {
                warn!(cluster = %name, error = %e, "Unable to count worker pods");
                WORKER_COUNT_UNKNOWN
            }
        };
        let master_url = service_url(platform, namespace, Role::Master, &name).await;
        let master_web_url = service_url(platform, namespace, Role::WebUi, &name).await;

        summaries.push(ClusterSummary {
            href: format!("{CLUSTERS_PATH}/{name}"),
            status: derive_status(&master_url).to_string(),
            master_url,
            master_web_url,
            worker_count,
            name,
        });
    }

    info!(namespace = %namespace, clusters = summaries.len(), "Listed clusters");
    Ok(summaries)
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod discovery_tests;
