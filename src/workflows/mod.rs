// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster lifecycle workflows.
//!
//! A Spark cluster has no record of its own. Its existence and shape are
//! derived on every call from the labeled resources found on the platform,
//! and every workflow here runs to completion against the [`Context`] it is
//! given.
//!
//! # Available Workflows
//!
//! - [`create_cluster`] - Provision deployments and services, rolling back on failure
//! - [`delete_cluster`] - Drain and delete every labeled resource of a cluster
//! - [`find_cluster`] - Build the live view of one cluster
//! - [`list_clusters`] - Summarize every cluster with a master pod
//! - [`update_cluster`] - Change the worker count
//!
//! # Example
//!
//! ```rust,no_run
//! use spark_clusters::context::Context;
//! use spark_clusters::workflows::find_cluster;
//!
//! async fn show(ctx: &Context) -> Result<(), spark_clusters::errors::ClusterError> {
//!     let cluster = find_cluster(ctx, "demo").await?;
//!     println!("{} is {}", cluster.name, cluster.status);
//!     Ok(())
//! }
//! ```

pub mod discovery;
pub mod provision;
pub mod scaling;
pub mod teardown;

pub use discovery::{find_cluster, list_clusters};
pub use provision::create_cluster;
pub use scaling::update_cluster;
pub use teardown::{delete_cluster, teardown, TeardownReport};

use crate::errors::ClusterError;
use crate::metrics::{self, OUTCOME_ERROR, OUTCOME_SUCCESS};
use std::time::Instant;

/// Operation label for create
pub const OP_CREATE: &str = "create";
/// Operation label for delete
pub const OP_DELETE: &str = "delete";
/// Operation label for find
pub const OP_FIND: &str = "find";
/// Operation label for list
pub const OP_LIST: &str = "list";
/// Operation label for update
pub const OP_UPDATE: &str = "update";

/// Record the outcome and duration of a workflow call.
fn observe<T>(
    operation: &str,
    start: Instant,
    result: Result<T, ClusterError>,
) -> Result<T, ClusterError> {
    let outcome = if result.is_ok() {
        OUTCOME_SUCCESS
    } else {
        OUTCOME_ERROR
    };
    metrics::record_operation(operation, outcome, start.elapsed());
    result
}
