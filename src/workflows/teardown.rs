// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Teardown: drain and delete every labeled resource of a cluster.
//!
//! Teardown never stops at the first failure. Each failed step is recorded
//! and the remaining steps still run, so it is safe to call for a cluster
//! that only partially exists (this is how provisioning rolls back).
//!
//! Order:
//!
//! 1. Delete the Deployments (orphaning their ReplicaSets)
//! 2. Scale every ReplicaSet to zero
//! 3. Wait for each scaled ReplicaSet to drain
//! 4. Delete the ReplicaSets
//! 5. Delete the Services

use super::{observe, OP_DELETE};
use crate::context::Context;
use crate::errors::ClusterError;
use crate::metrics;
use crate::platform::{Platform, PlatformError, KIND_DEPLOYMENT, KIND_REPLICA_SET, KIND_SERVICE};
use crate::selector::selector;
use crate::wait::{wait_until, WaitPolicy};
use k8s_openapi::api::apps::v1::ReplicaSetSpec;
use kube::ResourceExt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of a teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Every non-fatal failure, in the order it happened
    pub failures: Vec<String>,
    /// Whether any deployment, replica set or service was listed
    pub found_something: bool,
}

impl TeardownReport {
    /// Failures joined with `", "`; empty when teardown was clean.
    #[must_use]
    pub fn info(&self) -> String {
        self.failures.join(", ")
    }

    fn fail(&mut self, kind: &str, text: String) {
        warn!(kind = kind, failure = %text, "Teardown step failed");
        metrics::record_teardown_failure(kind);
        self.failures.push(text);
    }

    /// Record a failed delete; a resource that is already gone is not a failure.
    fn delete_failed(&mut self, kind: &str, what: &str, name: &str, err: &PlatformError) {
        if err.is_not_found() {
            debug!(kind = kind, name = %name, "Already deleted");
        } else {
            self.fail(kind, format!("unable to delete {what} {name} ({err})"));
        }
    }
}

async fn drained(platform: &dyn Platform, namespace: &str, name: &str) -> bool {
    match platform.get_controller(namespace, name).await {
        Ok(rs) => rs.status.map_or(0, |s| s.replicas) == 0,
        Err(e) if e.is_not_found() => true,
        Err(e) => {
            debug!(name = %name, error = %e, "Unable to read replica set while draining");
            false
        }
    }
}

/// Remove every resource labeled with cluster `name`.
pub async fn teardown(
    platform: &dyn Platform,
    namespace: &str,
    name: &str,
    drain: WaitPolicy,
) -> TeardownReport {
    let mut report = TeardownReport::default();
    // An empty name would select every cluster in the namespace.
    if name.is_empty() {
        return report;
    }
    let all = selector(None, name);

    // Deployments first so their controllers stop managing the replica sets.
    match platform.list_deployments(namespace, &all).await {
        Ok(deployments) => {
            report.found_something |= !deployments.is_empty();
            for deployment in deployments {
                let dep_name = deployment.name_any();
                if let Err(e) = platform.delete_deployment(namespace, &dep_name).await {
                    report.delete_failed(KIND_DEPLOYMENT, "deployment", &dep_name, &e);
                }
            }
        }
        Err(e) => report.fail(KIND_DEPLOYMENT, format!("unable to find deployments ({e})")),
    }

    let controllers = match platform.list_controllers(namespace, &all).await {
        Ok(controllers) => controllers,
        Err(e) => {
            report.fail(KIND_REPLICA_SET, format!("unable to find replica sets ({e})"));
            Vec::new()
        }
    };
    report.found_something |= !controllers.is_empty();

    let mut scaled = Vec::new();
    for controller in &controllers {
        let rs_name = controller.name_any();
        let mut zeroed = controller.clone();
        zeroed.spec.get_or_insert_with(ReplicaSetSpec::default).replicas = Some(0);
        match platform.update_controller(namespace, &zeroed).await {
            Ok(_) => scaled.push(rs_name),
            Err(e) if e.is_not_found() => debug!(name = %rs_name, "Replica set already gone"),
            Err(e) => report.fail(
                KIND_REPLICA_SET,
                format!("unable to scale replica set {rs_name} ({e})"),
            ),
        }
    }

    for rs_name in &scaled {
        let outcome = wait_until(drain, "drain", || drained(platform, namespace, rs_name)).await;
        if !outcome.observed() {
            debug!(name = %rs_name, "Replica set did not drain, deleting anyway");
        }
    }

    for controller in &controllers {
        let rs_name = controller.name_any();
        if let Err(e) = platform.delete_controller(namespace, &rs_name).await {
            report.delete_failed(KIND_REPLICA_SET, "replica set", &rs_name, &e);
        }
    }

    match platform.list_services(namespace, &all).await {
        Ok(services) => {
            report.found_something |= !services.is_empty();
            for service in services {
                let svc_name = service.name_any();
                if let Err(e) = platform.delete_service(namespace, &svc_name).await {
                    report.delete_failed(KIND_SERVICE, "service", &svc_name, &e);
                }
            }
        }
        Err(e) => report.fail(KIND_SERVICE, format!("unable to find services ({e})")),
    }

    report
}

/// Delete cluster `name`.
///
/// # Errors
///
/// - [`ClusterError::PartialFailure`] if any teardown step failed
/// - [`ClusterError::NotFound`] if nothing labeled with the cluster exists
#[instrument(skip(ctx))]
pub async fn delete_cluster(ctx: &Context, name: &str) -> Result<(), ClusterError> {
    let start = Instant::now();
    let result = delete_cluster_inner(ctx, name).await;
    observe(OP_DELETE, start, result)
}

async fn delete_cluster_inner(ctx: &Context, name: &str) -> Result<(), ClusterError> {
    let namespace = ctx.environment.namespace()?;
    let report = teardown(ctx.platform.as_ref(), namespace, name, ctx.waits.drain).await;

    let details = report.info();
    if !details.is_empty() {
        return Err(ClusterError::PartialFailure { details });
    }
    if !report.found_something {
        return Err(ClusterError::not_found("Cluster not found"));
    }

    info!(cluster = %name, namespace = %namespace, "Deleted cluster");
    Ok(())
}

#[cfg(test)]
#[path = "teardown_tests.rs"]
mod teardown_tests;
