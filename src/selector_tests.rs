// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `selector.rs`

use crate::labels::{Role, CLUSTER_LABEL, TYPE_LABEL};
use crate::selector::{
    correlation_labels, master_deployment_name, master_service_name, selector,
    web_service_name, worker_deployment_name,
};
use std::collections::BTreeMap;

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_selector_with_role_and_cluster() {
    let sel = selector(Some(Role::Worker), "alpha");
    assert_eq!(sel.to_string(), "spark-cluster-type=worker,spark-cluster=alpha");
    assert_eq!(sel.role(), Some(Role::Worker));
    assert_eq!(sel.cluster(), Some("alpha"));
}

#[test]
fn test_selector_cluster_only() {
    let sel = selector(None, "alpha");
    assert_eq!(sel.to_string(), "spark-cluster=alpha");
}

#[test]
fn test_selector_role_only() {
    let sel = selector(Some(Role::Master), "");
    assert_eq!(sel.to_string(), "spark-cluster-type=master");
    assert_eq!(sel.cluster(), None);
}

#[test]
fn test_empty_selector_matches_everything() {
    let sel = selector(None, "");
    assert_eq!(sel.to_string(), "");
    assert!(sel.matches(&BTreeMap::new()));
    assert!(sel.list_params().label_selector.is_none());
}

#[test]
fn test_list_params_carry_selector() {
    let params = selector(Some(Role::WebUi), "beta").list_params();
    assert_eq!(
        params.label_selector.as_deref(),
        Some("spark-cluster-type=webui,spark-cluster=beta")
    );
}

#[test]
fn test_matches_requires_both_predicates() {
    let sel = selector(Some(Role::Master), "alpha");

    assert!(sel.matches(&labels(&[(TYPE_LABEL, "master"), (CLUSTER_LABEL, "alpha")])));
    assert!(!sel.matches(&labels(&[(TYPE_LABEL, "worker"), (CLUSTER_LABEL, "alpha")])));
    assert!(!sel.matches(&labels(&[(TYPE_LABEL, "master"), (CLUSTER_LABEL, "beta")])));
    assert!(!sel.matches(&labels(&[(CLUSTER_LABEL, "alpha")])));
}

#[test]
fn test_cluster_selector_ignores_role() {
    let sel = selector(None, "alpha");
    assert!(sel.matches(&labels(&[(TYPE_LABEL, "webui"), (CLUSTER_LABEL, "alpha")])));
    assert!(sel.matches(&labels(&[(CLUSTER_LABEL, "alpha"), ("extra", "x")])));
}

#[test]
fn test_resource_names() {
    assert_eq!(master_deployment_name("spark"), "spark-m");
    assert_eq!(worker_deployment_name("spark"), "spark-w");
    assert_eq!(master_service_name("spark"), "spark");
    assert_eq!(web_service_name("spark"), "spark-ui");
}

#[test]
fn test_correlation_labels_match_selector() {
    let labels = correlation_labels(Role::Worker, "gamma");
    assert!(selector(Some(Role::Worker), "gamma").matches(&labels));
    assert!(selector(None, "gamma").matches(&labels));
    assert!(!selector(Some(Role::Master), "gamma").matches(&labels));
}
