// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Scaling: change the worker count of an existing cluster.

use super::discovery::{cluster_view, ensure_exists, latest_controller};
use super::{observe, OP_UPDATE};
use crate::cluster_config::resolve;
use crate::constants::MASTER_REPLICAS;
use crate::context::Context;
use crate::errors::ClusterError;
use crate::labels::Role;
use crate::models::{LogicalCluster, NewCluster};
use crate::selector::worker_deployment_name;
use k8s_openapi::api::apps::v1::ReplicaSetSpec;
use kube::ResourceExt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Update cluster `name` to match `request`.
///
/// Only the worker count may change. The new count is patched onto the worker
/// deployment first, then onto its current controller. If the controller update
/// fails the deployment is set back to the previous count.
///
/// # Errors
///
/// - [`ClusterError::NotFound`] if the cluster does not exist
/// - [`ClusterError::ConfigurationInvalid`] if the configuration does not resolve
/// - [`ClusterError::UnsupportedMutation`] if the name or master count would change
/// - [`ClusterError::Platform`] if the worker controller cannot be found, or the
///   controller or deployment cannot be updated
#[instrument(skip(ctx, request))]
pub async fn update_cluster(
    ctx: &Context,
    name: &str,
    request: &NewCluster,
) -> Result<LogicalCluster, ClusterError> {
    let start = Instant::now();
    let result = update_cluster_inner(ctx, name, request).await;
    observe(OP_UPDATE, start, result)
}

async fn update_cluster_inner(
    ctx: &Context,
    name: &str,
    request: &NewCluster,
) -> Result<LogicalCluster, ClusterError> {
    let namespace = ctx.environment.namespace()?;
    let platform = ctx.platform.as_ref();

    ensure_exists(platform, namespace, name).await?;

    let config = resolve(ctx.profiles.as_ref(), namespace, request.config.as_ref()).await?;

    if request.name != name {
        return Err(ClusterError::unsupported(
            "Changing the cluster name is not supported",
        ));
    }
    if config.master_count != MASTER_REPLICAS {
        return Err(ClusterError::unsupported(
            "Changing the master count is not supported",
        ));
    }

    let message = "Cannot find replication controller for spark workers";
    let controller = latest_controller(platform, namespace, Role::Worker, name)
        .await
        .map_err(|e| ClusterError::platform(message, e))?
        .ok_or_else(|| ClusterError::internal(message))?;

    let current = controller.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
    if current == config.worker_count {
        debug!(cluster = %name, workers = current, "Worker count unchanged");
    } else {
        let message = "Unable to update replication controller for spark workers";
        let deployment = worker_deployment_name(name);
        platform
            .scale_deployment(namespace, &deployment, config.worker_count)
            .await
            .map_err(|e| ClusterError::platform(message, e))?;

        let mut scaled = controller.clone();
        scaled.spec.get_or_insert_with(ReplicaSetSpec::default).replicas =
            Some(config.worker_count);
        if let Err(e) = platform.update_controller(namespace, &scaled).await {
            if let Err(restore) = platform
                .scale_deployment(namespace, &deployment, current)
                .await
            {
                warn!(
                    cluster = %name,
                    deployment = %deployment,
                    error = %restore,
                    "Could not restore worker deployment replicas"
                );
            }
            return Err(ClusterError::platform(message, e));
        }
        info!(
            cluster = %name,
            controller = %controller.name_any(),
            from = current,
            to = config.worker_count,
            "Scaled workers"
        );
    }

    cluster_view(platform, namespace, name, config)
        .await
        .map_err(|e| {
            ClusterError::platform("Updated cluster but failed to construct a response object", e)
        })
}

#[cfg(test)]
#[path = "scaling_tests.rs"]
mod scaling_tests;
