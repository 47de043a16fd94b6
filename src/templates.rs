// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes resource builders for Spark clusters.
//!
//! A cluster named `demo` is made of:
//!
//! - Deployment `demo-m` running one Spark master
//! - Deployment `demo-w` running the workers
//! - Service `demo` exposing the master port (the name workers connect to)
//! - Service `demo-ui` exposing the master web UI
//!
//! Every resource carries the cluster and role labels used for discovery and
//! teardown. The builders are pure; nothing here talks to the platform.

use crate::constants::{
    ENV_CLUSTER_NAME, ENV_MASTER_ADDRESS, ENV_MASTER_UI_ADDRESS, ENV_REST_HOST, ENV_REST_PORT,
    ENV_SPARK_CONF_DIR, IMAGE_PULL_POLICY, LIVENESS_FAILURE_THRESHOLD,
    LIVENESS_INITIAL_DELAY_SECS, LIVENESS_PERIOD_SECS, LIVENESS_TIMEOUT_SECS, MANAGER_NAME,
    MASTER_PORT, MASTER_PORT_NAME, MASTER_REPLICAS, READINESS_FAILURE_THRESHOLD,
    READINESS_INITIAL_DELAY_SECS, READINESS_PERIOD_SECS, READINESS_TIMEOUT_SECS, SPARK_CONF_DIR,
    WEB_PORT, WEB_PORT_NAME, WORKER_WEB_PORT,
};
use crate::labels::{Role, APP_NAME_SPARK, K8S_COMPONENT, K8S_INSTANCE, K8S_MANAGED_BY, K8S_NAME};
use crate::models::ClusterConfig;
use crate::selector::{
    correlation_labels, master_deployment_name, master_service_name, web_service_name,
    worker_deployment_name,
};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, EnvVar, HTTPGetAction, PodSpec,
    PodTemplateSpec, Probe, Service, ServicePort, ServiceSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;
use tracing::debug;

/// Name of the volume holding a mounted Spark configuration `ConfigMap`
const SPARK_CONFIG_VOLUME: &str = "spark-config";

/// Where pods can reach the REST service; passed through as pod env.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestCoordinates {
    pub host: String,
    pub port: String,
}

/// Everything needed to build a cluster's resources.
#[derive(Debug, Clone, Copy)]
pub struct ClusterTemplate<'a> {
    pub namespace: &'a str,
    pub image: &'a str,
    pub cluster: &'a str,
    pub config: &'a ClusterConfig,
    pub rest: &'a RestCoordinates,
}

/// The four resources of a cluster, in creation order.
#[derive(Debug, Clone)]
pub struct ClusterResources {
    pub master: Deployment,
    pub worker: Deployment,
    pub master_service: Service,
    pub web_service: Service,
}

/// Labels carried by every resource of `role` in `cluster`.
///
/// The correlation labels plus the standard `app.kubernetes.io/*` labels.
#[must_use]
pub fn build_labels(role: Role, cluster: &str) -> BTreeMap<String, String> {
    let mut labels = correlation_labels(role, cluster);
    labels.insert(K8S_NAME.into(), APP_NAME_SPARK.into());
    labels.insert(K8S_INSTANCE.into(), cluster.into());
    labels.insert(K8S_COMPONENT.into(), role.component().into());
    labels.insert(K8S_MANAGED_BY.into(), MANAGER_NAME.into());
    labels
}

fn env(name: &str, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.into(),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn build_env(template: &ClusterTemplate<'_>, conf_mounted: bool) -> Vec<EnvVar> {
    let mut vars = vec![
        env(ENV_CLUSTER_NAME, template.cluster),
        env(ENV_REST_HOST, template.rest.host.clone()),
        env(ENV_REST_PORT, template.rest.port.clone()),
    ];
    if conf_mounted {
        vars.push(env(ENV_SPARK_CONF_DIR, SPARK_CONF_DIR));
    }
    vars
}

fn http_probe(
    port: i32,
    initial_delay: i32,
    period: i32,
    timeout: i32,
    failure_threshold: i32,
) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some("/".into()),
            port: IntOrString::Int(port),
            ..Default::default()
        }),
        initial_delay_seconds: Some(initial_delay),
        period_seconds: Some(period),
        timeout_seconds: Some(timeout),
        failure_threshold: Some(failure_threshold),
        ..Default::default()
    }
}

fn liveness_probe(port: i32) -> Probe {
    http_probe(
        port,
        LIVENESS_INITIAL_DELAY_SECS,
        LIVENESS_PERIOD_SECS,
        LIVENESS_TIMEOUT_SECS,
        LIVENESS_FAILURE_THRESHOLD,
    )
}

fn readiness_probe(port: i32) -> Probe {
    http_probe(
        port,
        READINESS_INITIAL_DELAY_SECS,
        READINESS_PERIOD_SECS,
        READINESS_TIMEOUT_SECS,
        READINESS_FAILURE_THRESHOLD,
    )
}

fn container_port(name: &str, port: i32) -> ContainerPort {
    ContainerPort {
        name: Some(name.into()),
        container_port: port,
        protocol: Some("TCP".into()),
        ..Default::default()
    }
}

/// Volume and mount for an optional Spark configuration `ConfigMap`.
fn config_volume(config_map: Option<&str>) -> (Option<Vec<Volume>>, Option<Vec<VolumeMount>>) {
    let Some(config_map) = config_map else {
        return (None, None);
    };
    let volume = Volume {
        name: SPARK_CONFIG_VOLUME.into(),
        config_map: Some(ConfigMapVolumeSource {
            name: config_map.into(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let mount = VolumeMount {
        name: SPARK_CONFIG_VOLUME.into(),
        mount_path: SPARK_CONF_DIR.into(),
        read_only: Some(true),
        ..Default::default()
    };
    (Some(vec![volume]), Some(vec![mount]))
}

fn build_deployment(
    name: String,
    role: Role,
    replicas: i32,
    template: &ClusterTemplate<'_>,
    container: Container,
    volumes: Option<Vec<Volume>>,
) -> Deployment {
    let labels = build_labels(role, template.cluster);

    Deployment {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(template.namespace.into()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(correlation_labels(role, template.cluster)),
                ..Default::default()
            },
            strategy: Some(DeploymentStrategy {
                type_: Some("RollingUpdate".into()),
                ..Default::default()
            }),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the master Deployment (`<cluster>-m`).
///
/// Always one replica. Exposes the master and web UI ports and checks
/// liveness and readiness against the web UI.
#[must_use]
pub fn build_master_deployment(template: &ClusterTemplate<'_>) -> Deployment {
    let name = master_deployment_name(template.cluster);
    debug!(name = %name, namespace = %template.namespace, "Building master Deployment");

    let (volumes, mounts) = config_volume(template.config.spark_master_config.as_deref());
    let container = Container {
        name: name.clone(),
        image: Some(template.image.into()),
        image_pull_policy: Some(IMAGE_PULL_POLICY.into()),
        ports: Some(vec![
            container_port(MASTER_PORT_NAME, MASTER_PORT),
            container_port(WEB_PORT_NAME, WEB_PORT),
        ]),
        env: Some(build_env(template, mounts.is_some())),
        volume_mounts: mounts,
        liveness_probe: Some(liveness_probe(WEB_PORT)),
        readiness_probe: Some(readiness_probe(WEB_PORT)),
        ..Default::default()
    };

    build_deployment(
        name,
        Role::Master,
        MASTER_REPLICAS,
        template,
        container,
        volumes,
    )
}

/// Builds the worker Deployment (`<cluster>-w`) with `workerCount` replicas.
///
/// Workers are pointed at the master through `SPARK_MASTER_ADDRESS` and
/// `SPARK_MASTER_UI_ADDRESS`. Only a liveness probe is set.
#[must_use]
pub fn build_worker_deployment(template: &ClusterTemplate<'_>) -> Deployment {
    let name = worker_deployment_name(template.cluster);
    debug!(
        name = %name,
        namespace = %template.namespace,
        replicas = template.config.worker_count,
        "Building worker Deployment"
    );

    let (volumes, mounts) = config_volume(template.config.spark_worker_config.as_deref());
    let mut env_vars = build_env(template, mounts.is_some());
    env_vars.push(env(
        ENV_MASTER_ADDRESS,
        format!(
            "spark://{}:{MASTER_PORT}",
            master_service_name(template.cluster)
        ),
    ));
    env_vars.push(env(
        ENV_MASTER_UI_ADDRESS,
        format!("http://{}:{WEB_PORT}", web_service_name(template.cluster)),
    ));

    let container = Container {
        name: name.clone(),
        image: Some(template.image.into()),
        image_pull_policy: Some(IMAGE_PULL_POLICY.into()),
        ports: Some(vec![container_port(WEB_PORT_NAME, WORKER_WEB_PORT)]),
        env: Some(env_vars),
        volume_mounts: mounts,
        liveness_probe: Some(liveness_probe(WORKER_WEB_PORT)),
        ..Default::default()
    };

    build_deployment(
        name,
        Role::Worker,
        template.config.worker_count,
        template,
        container,
        volumes,
    )
}

/// Find a named container port in a deployment's pod template.
#[must_use]
pub fn find_port(deployment: &Deployment, port_name: &str) -> Option<i32> {
    deployment
        .spec
        .as_ref()?
        .template
        .spec
        .as_ref()?
        .containers
        .iter()
        .flat_map(|c| c.ports.iter().flatten())
        .find(|p| p.name.as_deref() == Some(port_name))
        .map(|p| p.container_port)
}

fn pod_template_labels(deployment: &Deployment) -> Option<BTreeMap<String, String>> {
    deployment
        .spec
        .as_ref()?
        .template
        .metadata
        .as_ref()?
        .labels
        .clone()
}

/// Builds a Service selecting the master's pods on the named master port.
///
/// Returns `None` if the master template has no such port.
#[must_use]
pub fn build_service(
    name: String,
    role: Role,
    port_name: &str,
    template: &ClusterTemplate<'_>,
    master: &Deployment,
) -> Option<Service> {
    let port = find_port(master, port_name)?;
    Some(Service {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(template.namespace.into()),
            labels: Some(build_labels(role, template.cluster)),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: pod_template_labels(master),
            ports: Some(vec![ServicePort {
                name: Some(port_name.into()),
                port,
                target_port: Some(IntOrString::Int(port)),
                protocol: Some("TCP".into()),
                ..Default::default()
            }]),
            type_: Some("ClusterIP".into()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Builds the master Service (named after the cluster).
#[must_use]
pub fn build_master_service(template: &ClusterTemplate<'_>, master: &Deployment) -> Option<Service> {
    build_service(
        master_service_name(template.cluster),
        Role::Master,
        MASTER_PORT_NAME,
        template,
        master,
    )
}

/// Builds the web UI Service (`<cluster>-ui`).
#[must_use]
pub fn build_web_service(template: &ClusterTemplate<'_>, master: &Deployment) -> Option<Service> {
    build_service(
        web_service_name(template.cluster),
        Role::WebUi,
        WEB_PORT_NAME,
        template,
        master,
    )
}

/// Builds all four resources of a cluster.
///
/// Returns `None` only if the master template lacks one of its named ports.
#[must_use]
pub fn build_cluster_resources(template: &ClusterTemplate<'_>) -> Option<ClusterResources> {
    let master = build_master_deployment(template);
    let worker = build_worker_deployment(template);
    let master_service = build_master_service(template, &master)?;
    let web_service = build_web_service(template, &master)?;
    Some(ClusterResources {
        master,
        worker,
        master_service,
        web_service,
    })
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod templates_tests;
