// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # spark-clusters - Spark cluster lifecycle service for Kubernetes
//!
//! spark-clusters is a REST service that creates, inspects, scales and deletes
//! Apache Spark clusters made of ordinary Kubernetes objects.
//!
//! ## Overview
//!
//! A cluster is one master and a set of workers. Each role runs from its own
//! Deployment and the master is exposed by two Services (the Spark endpoint
//! and the web UI). There is no cluster record anywhere: every object carries
//! correlation labels and the cluster is reassembled from them on each call.
//!
//! ## Modules
//!
//! - [`workflows`] - Create, find, list, update and delete clusters
//! - [`cluster_config`] - Layered configuration from named profiles
//! - [`templates`] - Deployment and Service templates for each role
//! - [`platform`] - Kubernetes access behind the [`platform::Platform`] trait
//! - [`server`] - REST routes over the workflows
//! - [`context`] - Everything a workflow needs, shared by all requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use spark_clusters::cluster_config::ConfigMapProfileStore;
//! use spark_clusters::context::Context;
//! use spark_clusters::environment::RuntimeEnvironment;
//! use spark_clusters::models::NewCluster;
//! use spark_clusters::platform::kubernetes::KubePlatform;
//! use spark_clusters::templates::RestCoordinates;
//! use spark_clusters::workflows::create_cluster;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! let platform = Arc::new(KubePlatform::new(client));
//! let environment = RuntimeEnvironment::new(
//!     Some("spark".into()),
//!     Some("quay.io/radanalyticsio/openshift-spark".into()),
//!     RestCoordinates::default(),
//!     "spark-clusters".into(),
//! );
//! let ctx = Context::new(
//!     platform.clone(),
//!     Arc::new(ConfigMapProfileStore::new(platform)),
//!     environment,
//! );
//!
//! let cluster = create_cluster(&ctx, &NewCluster { name: "demo".into(), config: None }).await?;
//! println!("{} is {}", cluster.name, cluster.status);
//! # Ok(())
//! # }
//! ```

pub mod cluster_config;
pub mod constants;
pub mod context;
pub mod environment;
pub mod errors;
pub mod http_errors;
pub mod labels;
pub mod metrics;
pub mod models;
pub mod platform;
pub mod selector;
pub mod server;
pub mod templates;
pub mod wait;
pub mod workflows;
