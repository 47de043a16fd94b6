// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`Platform`] used by the workflow tests.
//!
//! Creating a deployment materializes a ReplicaSet and its pods right away
//! (unless disabled), scaling a ReplicaSet drains it immediately (unless
//! disabled) and deleting a deployment orphans its ReplicaSets, matching the
//! deletion semantics of the Kubernetes adapter. Any operation can be made to
//! fail for a given resource name.

use super::{
    Platform, PlatformError, KIND_CONFIG_MAP, KIND_DEPLOYMENT, KIND_REPLICA_SET, KIND_SERVICE,
};
use crate::cluster_config::ConfigMapProfileStore;
use crate::context::{Context, WaitSettings};
use crate::environment::RuntimeEnvironment;
use crate::selector::ClusterSelector;
use crate::models::ClusterConfig;
use crate::templates::{build_cluster_resources, ClusterTemplate, RestCoordinates};
use async_trait::async_trait;
use k8s_openapi::jiff::{SignedDuration, Timestamp};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, ReplicaSetSpec, ReplicaSetStatus};
use k8s_openapi::api::core::v1::{ConfigMap, Pod, PodStatus, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Namespace used by [`test_context`]
pub const TEST_NAMESPACE: &str = "spark";

/// Image used by [`test_context`]
pub const TEST_IMAGE: &str = "spark:test";

/// Context around `fake` with profiles read from its `ConfigMap`s and waits
/// that never pause.
pub fn test_context(fake: &Arc<FakePlatform>) -> Context {
    let environment = RuntimeEnvironment::new(
        Some(TEST_NAMESPACE.into()),
        Some(TEST_IMAGE.into()),
        RestCoordinates {
            host: "10.0.0.1".into(),
            port: "8080".into(),
        },
        "spark-clusters-web".into(),
    );
    Context::new(
        fake.clone(),
        Arc::new(ConfigMapProfileStore::new(fake.clone())),
        environment,
    )
    .with_waits(WaitSettings::immediate())
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOp {
    ListDeployments,
    CreateDeployment,
    ScaleDeployment,
    DeleteDeployment,
    ListControllers,
    GetController,
    UpdateController,
    DeleteController,
    ListServices,
    CreateService,
    DeleteService,
    ListPods,
    GetConfigMap,
}

#[derive(Default)]
struct State {
    deployments: Vec<Deployment>,
    controllers: Vec<ReplicaSet>,
    services: Vec<Service>,
    pods: Vec<Pod>,
    config_maps: Vec<ConfigMap>,
    failures: Vec<(FakeOp, String)>,
    calls: Vec<FakeOp>,
    no_materialize: bool,
    no_drain: bool,
    tick: i64,
    next_ip: u32,
}

impl State {
    fn record(&mut self, op: FakeOp, name: &str) -> Result<(), PlatformError> {
        self.calls.push(op);
        let fails = self
            .failures
            .iter()
            .any(|(f, n)| *f == op && (n.is_empty() || n == name));
        if fails {
            Err(PlatformError::Api {
                code: 500,
                message: format!("injected failure for {op:?} {name}"),
            })
        } else {
            Ok(())
        }
    }

    fn timestamp(&mut self) -> Time {
        self.tick += 1;
        Time(Timestamp::now() + SignedDuration::from_secs(self.tick))
    }

    fn spawn_pods(&mut self, owner: &str, labels: &BTreeMap<String, String>, count: i32) {
        for i in 0..count {
            self.next_ip += 1;
            self.pods.push(Pod {
                metadata: ObjectMeta {
                    name: Some(format!("{owner}-{i}")),
                    labels: Some(labels.clone()),
                    ..Default::default()
                },
                status: Some(PodStatus {
                    pod_ip: Some(format!("10.0.0.{}", self.next_ip)),
                    phase: Some("Running".into()),
                    ..Default::default()
                }),
                ..Default::default()
            });
        }
    }

    fn remove_pods(&mut self, owner: &str) {
        let prefix = format!("{owner}-");
        self.pods
            .retain(|p| !p.metadata.name.as_deref().unwrap_or("").starts_with(&prefix));
    }
}

fn labels_of(meta: &ObjectMeta) -> BTreeMap<String, String> {
    meta.labels.clone().unwrap_or_default()
}

fn name_of(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

/// In-memory platform with failure injection.
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Make `op` fail for resources named `name` (empty name: every call).
    ///
    /// List operations are matched on their rendered selector instead of a name.
    pub fn fail(&self, op: FakeOp, name: &str) {
        self.lock().failures.push((op, name.to_string()));
    }

    /// Remove all injected failures.
    pub fn heal(&self) {
        self.lock().failures.clear();
    }

    /// Stop creating ReplicaSets and pods when deployments are created.
    pub fn stop_materializing(&self) {
        self.lock().no_materialize = true;
    }

    /// Keep observed replica counts unchanged when a ReplicaSet is scaled.
    pub fn stop_draining(&self) {
        self.lock().no_drain = true;
    }

    /// Number of recorded calls of `op`.
    pub fn calls(&self, op: FakeOp) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn add_config_map(&self, name: &str, data: &[(&str, &str)]) {
        let data = data
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.lock().config_maps.push(ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.into()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        });
    }

    pub fn add_pod(&self, name: &str, labels: BTreeMap<String, String>, ip: &str) {
        self.lock().pods.push(Pod {
            metadata: ObjectMeta {
                name: Some(name.into()),
                labels: Some(labels),
                ..Default::default()
            },
            status: Some(PodStatus {
                pod_ip: Some(ip.into()),
                phase: Some("Running".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    /// Insert a ReplicaSet with an explicit creation timestamp offset.
    pub fn add_controller(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        replicas: i32,
        created_offset_secs: i64,
    ) {
        self.lock().controllers.push(ReplicaSet {
            metadata: ObjectMeta {
                name: Some(name.into()),
                labels: Some(labels),
                creation_timestamp: Some(Time(
                    Timestamp::now() + SignedDuration::from_secs(created_offset_secs),
                )),
                ..Default::default()
            },
            spec: Some(ReplicaSetSpec {
                replicas: Some(replicas),
                ..Default::default()
            }),
            status: Some(ReplicaSetStatus {
                replicas,
                ..Default::default()
            }),
        });
    }

    pub fn add_service(&self, service: Service) {
        self.lock().services.push(service);
    }

    pub fn deployment_names(&self) -> Vec<String> {
        self.lock()
            .deployments
            .iter()
            .map(|d| name_of(&d.metadata))
            .collect()
    }

    pub fn deployment(&self, name: &str) -> Option<Deployment> {
        self.lock()
            .deployments
            .iter()
            .find(|d| d.metadata.name.as_deref() == Some(name))
            .cloned()
    }

    pub fn controller_names(&self) -> Vec<String> {
        self.lock()
            .controllers
            .iter()
            .map(|c| name_of(&c.metadata))
            .collect()
    }

    pub fn controllers(&self) -> Vec<ReplicaSet> {
        self.lock().controllers.clone()
    }

    pub fn service_names(&self) -> Vec<String> {
        self.lock()
            .services
            .iter()
            .map(|s| name_of(&s.metadata))
            .collect()
    }

    pub fn pod_count(&self) -> usize {
        self.lock().pods.len()
    }

    /// Create the four resources of cluster `name` directly.
    pub async fn seed_cluster(&self, name: &str, workers: i32) {
        let config = ClusterConfig {
            master_count: 1,
            worker_count: workers,
            spark_master_config: None,
            spark_worker_config: None,
        };
        let rest = RestCoordinates::default();
        let template = ClusterTemplate {
            namespace: TEST_NAMESPACE,
            image: TEST_IMAGE,
            cluster: name,
            config: &config,
            rest: &rest,
        };
        let resources = build_cluster_resources(&template).unwrap();
        self.create_deployment(TEST_NAMESPACE, &resources.master)
            .await
            .unwrap();
        self.create_deployment(TEST_NAMESPACE, &resources.worker)
            .await
            .unwrap();
        self.create_service(TEST_NAMESPACE, &resources.master_service)
            .await
            .unwrap();
        self.create_service(TEST_NAMESPACE, &resources.web_service)
            .await
            .unwrap();
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn list_deployments(
        &self,
        _namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Deployment>, PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::ListDeployments, &selector.to_string())?;
        Ok(state
            .deployments
            .iter()
            .filter(|d| selector.matches(&labels_of(&d.metadata)))
            .cloned()
            .collect())
    }

    async fn create_deployment(
        &self,
        _namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, PlatformError> {
        let mut state = self.lock();
        let name = name_of(&deployment.metadata);
        state.record(FakeOp::CreateDeployment, &name)?;
        if state
            .deployments
            .iter()
            .any(|d| d.metadata.name.as_deref() == Some(name.as_str()))
        {
            return Err(PlatformError::AlreadyExists {
                kind: KIND_DEPLOYMENT,
                name,
            });
        }

        let mut created = deployment.clone();
        created.metadata.creation_timestamp = Some(state.timestamp());
        state.deployments.push(created.clone());

        if !state.no_materialize {
            let spec = deployment.spec.clone().unwrap_or_default();
            let replicas = spec.replicas.unwrap_or(1);
            let pod_labels = spec
                .template
                .metadata
                .as_ref()
                .map(labels_of)
                .unwrap_or_default();
            let rs_name = format!("{name}-{}", state.tick);
            let created_at = state.timestamp();
            state.controllers.push(ReplicaSet {
                metadata: ObjectMeta {
                    name: Some(rs_name.clone()),
                    labels: Some(pod_labels.clone()),
                    creation_timestamp: Some(created_at),
                    ..Default::default()
                },
                spec: Some(ReplicaSetSpec {
                    replicas: Some(replicas),
                    ..Default::default()
                }),
                status: Some(ReplicaSetStatus {
                    replicas,
                    ..Default::default()
                }),
            });
            state.spawn_pods(&rs_name, &pod_labels, replicas);
        }
        Ok(created)
    }

    async fn scale_deployment(
        &self,
        _namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::ScaleDeployment, name)?;
        let deployment = state
            .deployments
            .iter_mut()
            .find(|d| d.metadata.name.as_deref() == Some(name))
            .ok_or_else(|| PlatformError::NotFound {
                kind: KIND_DEPLOYMENT,
                name: name.to_string(),
            })?;
        if let Some(spec) = deployment.spec.as_mut() {
            spec.replicas = Some(replicas);
        }
        Ok(())
    }

    async fn delete_deployment(&self, _namespace: &str, name: &str) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::DeleteDeployment, name)?;
        let before = state.deployments.len();
        state
            .deployments
            .retain(|d| d.metadata.name.as_deref() != Some(name));
        if state.deployments.len() == before {
            return Err(PlatformError::NotFound {
                kind: KIND_DEPLOYMENT,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn list_controllers(
        &self,
        _namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<ReplicaSet>, PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::ListControllers, &selector.to_string())?;
        Ok(state
            .controllers
            .iter()
            .filter(|c| selector.matches(&labels_of(&c.metadata)))
            .cloned()
            .collect())
    }

    async fn get_controller(
        &self,
        _namespace: &str,
        name: &str,
    ) -> Result<ReplicaSet, PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::GetController, name)?;
        state
            .controllers
            .iter()
            .find(|c| c.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| PlatformError::NotFound {
                kind: KIND_REPLICA_SET,
                name: name.to_string(),
            })
    }

    async fn update_controller(
        &self,
        _namespace: &str,
        controller: &ReplicaSet,
    ) -> Result<ReplicaSet, PlatformError> {
        let mut state = self.lock();
        let name = name_of(&controller.metadata);
        state.record(FakeOp::UpdateController, &name)?;
        let drain = !state.no_drain;
        let index = state
            .controllers
            .iter()
            .position(|c| c.metadata.name.as_deref() == Some(name.as_str()))
            .ok_or_else(|| PlatformError::NotFound {
                kind: KIND_REPLICA_SET,
                name: name.clone(),
            })?;

        let previous_status = state.controllers[index].status.clone();
        let mut updated = controller.clone();
        let desired = updated
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or_default();
        if drain {
            updated.status = Some(ReplicaSetStatus {
                replicas: desired,
                ..Default::default()
            });
            let labels = labels_of(&updated.metadata);
            state.remove_pods(&name);
            state.spawn_pods(&name, &labels, desired);
        } else {
            updated.status = previous_status;
        }
        state.controllers[index] = updated.clone();
        Ok(updated)
    }

    async fn delete_controller(&self, _namespace: &str, name: &str) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::DeleteController, name)?;
        let before = state.controllers.len();
        state
            .controllers
            .retain(|c| c.metadata.name.as_deref() != Some(name));
        if state.controllers.len() == before {
            return Err(PlatformError::NotFound {
                kind: KIND_REPLICA_SET,
                name: name.to_string(),
            });
        }
        state.remove_pods(name);
        Ok(())
    }

    async fn list_services(
        &self,
        _namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Service>, PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::ListServices, &selector.to_string())?;
        Ok(state
            .services
            .iter()
            .filter(|s| selector.matches(&labels_of(&s.metadata)))
            .cloned()
            .collect())
    }

    async fn create_service(
        &self,
        _namespace: &str,
        service: &Service,
    ) -> Result<Service, PlatformError> {
        let mut state = self.lock();
        let name = name_of(&service.metadata);
        state.record(FakeOp::CreateService, &name)?;
        if state
            .services
            .iter()
            .any(|s| s.metadata.name.as_deref() == Some(name.as_str()))
        {
            return Err(PlatformError::AlreadyExists {
                kind: KIND_SERVICE,
                name,
            });
        }
        state.services.push(service.clone());
        Ok(service.clone())
    }

    async fn delete_service(&self, _namespace: &str, name: &str) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::DeleteService, name)?;
        let before = state.services.len();
        state
            .services
            .retain(|s| s.metadata.name.as_deref() != Some(name));
        if state.services.len() == before {
            return Err(PlatformError::NotFound {
                kind: KIND_SERVICE,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn list_pods(
        &self,
        _namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Pod>, PlatformError> {
        let mut state = self.lock();
        state.record(FakeOp::ListPods, &selector.to_string())?;
        Ok(state
            .pods
            .iter()
            .filter(|p| selector.matches(&labels_of(&p.metadata)))
            .cloned()
            .collect())
    }

    async fn get_config_map(
        &self,
        _namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, PlatformError> {
        let mut state = self.lock();
        state
            .record(FakeOp::GetConfigMap, name)
            .map_err(|_| PlatformError::Api {
                code: 500,
                message: format!("injected failure reading {KIND_CONFIG_MAP} {name}"),
            })?;
        Ok(state
            .config_maps
            .iter()
            .find(|c| c.metadata.name.as_deref() == Some(name))
            .cloned())
    }
}
