// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes implementation of [`Platform`].
//!
//! Desired-state objects are `apps/v1` Deployments and controllers are the
//! ReplicaSets they materialize. Deployments are deleted with orphan
//! propagation so teardown can drain and delete the ReplicaSets itself.

use super::pagination::list_all_paginated;
use super::{
    Platform, PlatformError, KIND_CONFIG_MAP, KIND_DEPLOYMENT, KIND_POD, KIND_REPLICA_SET,
    KIND_SERVICE,
};
use crate::selector::ClusterSelector;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Service};
use kube::api::{DeleteParams, Patch, PatchParams, PostParams, PropagationPolicy};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::debug;

/// [`Platform`] backed by a Kubernetes API client.
#[derive(Clone)]
pub struct KubePlatform {
    client: Client,
}

impl KubePlatform {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Classify a Kubernetes client error.
pub(crate) fn classify(err: kube::Error, kind: &'static str, name: &str) -> PlatformError {
    match err {
        kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
            PlatformError::AlreadyExists {
                kind,
                name: name.to_string(),
            }
        }
        kube::Error::Api(ae) if ae.code == 404 => PlatformError::NotFound {
            kind,
            name: name.to_string(),
        },
        kube::Error::Api(ae) => PlatformError::Api {
            code: ae.code,
            message: ae.message,
        },
        other => PlatformError::Unavailable(other.to_string()),
    }
}

fn orphan() -> DeleteParams {
    DeleteParams {
        propagation_policy: Some(PropagationPolicy::Orphan),
        ..Default::default()
    }
}

#[async_trait]
impl Platform for KubePlatform {
    async fn list_deployments(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Deployment>, PlatformError> {
        list_all_paginated(&self.api(namespace), selector.list_params())
            .await
            .map_err(|e| classify(e, KIND_DEPLOYMENT, ""))
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, PlatformError> {
        let name = deployment.name_any();
        debug!(namespace = %namespace, name = %name, kind = KIND_DEPLOYMENT, "Creating resource");
        self.api::<Deployment>(namespace)
            .create(&PostParams::default(), deployment)
            .await
            .map_err(|e| classify(e, KIND_DEPLOYMENT, &name))
    }

    async fn scale_deployment(
        &self,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<(), PlatformError> {
        let patch = json!({ "spec": { "replicas": replicas } });
        self.api::<Deployment>(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map(|_| ())
            .map_err(|e| classify(e, KIND_DEPLOYMENT, name))
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), PlatformError> {
        self.api::<Deployment>(namespace)
            .delete(name, &orphan())
            .await
            .map(|_| ())
            .map_err(|e| classify(e, KIND_DEPLOYMENT, name))
    }

    async fn list_controllers(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<ReplicaSet>, PlatformError> {
        list_all_paginated(&self.api(namespace), selector.list_params())
            .await
            .map_err(|e| classify(e, KIND_REPLICA_SET, ""))
    }

    async fn get_controller(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReplicaSet, PlatformError> {
        self.api::<ReplicaSet>(namespace)
            .get(name)
            .await
            .map_err(|e| classify(e, KIND_REPLICA_SET, name))
    }

    async fn update_controller(
        &self,
        namespace: &str,
        controller: &ReplicaSet,
    ) -> Result<ReplicaSet, PlatformError> {
        let name = controller.name_any();
        self.api::<ReplicaSet>(namespace)
            .replace(&name, &PostParams::default(), controller)
            .await
            .map_err(|e| classify(e, KIND_REPLICA_SET, &name))
    }

    async fn delete_controller(&self, namespace: &str, name: &str) -> Result<(), PlatformError> {
        self.api::<ReplicaSet>(namespace)
            .delete(name, &DeleteParams::background())
            .await
            .map(|_| ())
            .map_err(|e| classify(e, KIND_REPLICA_SET, name))
    }

    async fn list_services(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Service>, PlatformError> {
        list_all_paginated(&self.api(namespace), selector.list_params())
            .await
            .map_err(|e| classify(e, KIND_SERVICE, ""))
    }

    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<Service, PlatformError> {
        let name = service.name_any();
        debug!(namespace = %namespace, name = %name, kind = KIND_SERVICE, "Creating resource");
        self.api::<Service>(namespace)
            .create(&PostParams::default(), service)
            .await
            .map_err(|e| classify(e, KIND_SERVICE, &name))
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> Result<(), PlatformError> {
        self.api::<Service>(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| classify(e, KIND_SERVICE, name))
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &ClusterSelector,
    ) -> Result<Vec<Pod>, PlatformError> {
        list_all_paginated(&self.api(namespace), selector.list_params())
            .await
            .map_err(|e| classify(e, KIND_POD, ""))
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, PlatformError> {
        self.api::<ConfigMap>(namespace)
            .get_opt(name)
            .await
            .map_err(|e| classify(e, KIND_CONFIG_MAP, name))
    }
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod kubernetes_tests;
