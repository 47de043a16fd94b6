// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provisioning: create the resources of a new cluster.
//!
//! Resources are created in order: master deployment, worker deployment,
//! master service, web UI service. A failure after the master deployment
//! exists tears down everything labeled with the cluster before the error is
//! returned. A missing web UI service is tolerated.

use super::discovery::{cluster_view, latest_controller};
use super::teardown::teardown;
use super::{observe, OP_CREATE};
use crate::cluster_config::resolve;
use crate::context::Context;
use crate::errors::ClusterError;
use crate::labels::Role;
use crate::metrics;
use crate::models::{LogicalCluster, NewCluster};
use crate::platform::{Platform, PlatformError};
use crate::templates::{build_cluster_resources, ClusterTemplate};
use crate::wait::wait_until;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Verify that a referenced Spark configuration `ConfigMap` exists.
async fn check_config_map(
    platform: &dyn Platform,
    namespace: &str,
    role: Role,
    name: &str,
) -> Result<(), ClusterError> {
    let missing = |reason: String| ClusterError::ConfigVolumeMissing {
        role,
        name: name.to_string(),
        reason,
    };
    match platform.get_config_map(namespace, name).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(missing(format!("ConfigMap '{name}' not found"))),
        Err(e) => Err(missing(e.to_string())),
    }
}

/// Undo a partially created cluster and return the error that caused it.
async fn rollback(
    ctx: &Context,
    namespace: &str,
    name: &str,
    message: &str,
    source: PlatformError,
) -> ClusterError {
    warn!(cluster = %name, error = %source, "{message}, rolling back");
    metrics::record_rollback();
    let report = teardown(ctx.platform.as_ref(), namespace, name, ctx.waits.drain).await;
    if !report.failures.is_empty() {
        warn!(cluster = %name, failures = %report.info(), "Rollback incomplete");
    }
    ClusterError::from_create(message, source)
}

async fn controllers_present(platform: &dyn Platform, namespace: &str, name: &str) -> bool {
    for role in [Role::Master, Role::Worker] {
        match latest_controller(platform, namespace, role, name).await {
            Ok(Some(_)) => {}
            _ => return false,
        }
    }
    true
}

/// Create a new cluster.
///
/// The returned view reports the resolved configuration and whatever pods
/// and services are visible once the controllers have had a moment to
/// appear.
///
/// # Errors
///
/// - [`ClusterError::EnvironmentUnavailable`] if namespace or image are unknown
/// - [`ClusterError::ConfigurationInvalid`] if the configuration does not resolve
/// - [`ClusterError::ConfigVolumeMissing`] if a referenced `ConfigMap` is missing
/// - [`ClusterError::ResourceConflict`] if a resource already exists
/// - [`ClusterError::Platform`] for any other platform failure
#[instrument(skip(ctx, request), fields(cluster = %request.name))]
pub async fn create_cluster(
    ctx: &Context,
    request: &NewCluster,
) -> Result<LogicalCluster, ClusterError> {
    let start = Instant::now();
    let result = create_cluster_inner(ctx, request).await;
    observe(OP_CREATE, start, result)
}

async fn create_cluster_inner(
    ctx: &Context,
    request: &NewCluster,
) -> Result<LogicalCluster, ClusterError> {
    let name = request.name.as_str();
    let namespace = ctx.environment.namespace()?;
    let image = ctx.environment.image()?;
    let platform = ctx.platform.as_ref();

    if name.is_empty() {
        return Err(ClusterError::configuration("Cluster name may not be empty"));
    }

    let config = resolve(ctx.profiles.as_ref(), namespace, request.config.as_ref()).await?;
    debug!(
        master_count = config.master_count,
        worker_count = config.worker_count,
        "Resolved cluster configuration"
    );

    if let Some(conf) = &config.spark_master_config {
        check_config_map(platform, namespace, Role::Master, conf).await?;
    }
    if let Some(conf) = &config.spark_worker_config {
        check_config_map(platform, namespace, Role::Worker, conf).await?;
    }

    let template = ClusterTemplate {
        namespace,
        image,
        cluster: name,
        config: &config,
        rest: &ctx.environment.rest,
    };
    let resources = build_cluster_resources(&template)
        .ok_or_else(|| ClusterError::internal("Unable to create spark master service endpoint"))?;

    platform
        .create_deployment(namespace, &resources.master)
        .await
        .map_err(|e| {
            ClusterError::from_create("Unable to create master deployment configuration", e)
        })?;

    if let Err(e) = platform.create_deployment(namespace, &resources.worker).await {
        return Err(rollback(
            ctx,
            namespace,
            name,
            "Unable to create worker deployment configuration",
            e,
        )
        .await);
    }

    if let Err(e) = platform
        .create_service(namespace, &resources.master_service)
        .await
    {
        return Err(rollback(
            ctx,
            namespace,
            name,
            "Unable to create spark master service endpoint",
            e,
        )
        .await);
    }

    if let Err(e) = platform.create_service(namespace, &resources.web_service).await {
        warn!(cluster = %name, error = %e, "Unable to create web UI service, continuing without it");
    }

    let outcome = wait_until(ctx.waits.materialize, "materialize", || {
        controllers_present(platform, namespace, name)
    })
    .await;
    if !outcome.observed() {
        debug!(cluster = %name, "Controllers not observed yet, building response anyway");
    }

    let view = cluster_view(platform, namespace, name, config)
        .await
        .map_err(|e| {
            ClusterError::platform("Created cluster but failed to construct a response object", e)
        })?;

    info!(cluster = %name, namespace = %namespace, "Created cluster");
    Ok(view)
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod provision_tests;
