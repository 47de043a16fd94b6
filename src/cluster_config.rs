// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster configuration resolution.
//!
//! The final [`ClusterConfig`] of a create or update request is built from
//! layers, lowest precedence first:
//!
//! 1. the hard-coded fallback `{masterCount: 1, workerCount: 1}`
//! 2. the `default` profile from the [`ProfileStore`] (may be missing)
//! 3. the profile named by the request (must exist when named)
//! 4. the explicit values in the request
//!
//! A zero count or an empty config reference in any layer means "keep the
//! lower layer's value". The merged result must have positive counts.
//!
//! Profiles live either in `ConfigMap`s named after the profile
//! ([`ConfigMapProfileStore`]) or in a directory of files named
//! `<profile>.<key>` ([`DirectoryProfileStore`]).

use crate::constants::{
    DEFAULT_PROFILE_NAME, FALLBACK_MASTER_COUNT, FALLBACK_WORKER_COUNT,
    PROFILE_KEY_MASTER_CONFIG, PROFILE_KEY_MASTER_COUNT, PROFILE_KEY_WORKER_CONFIG,
    PROFILE_KEY_WORKER_COUNT,
};
use crate::errors::ClusterError;
use crate::models::{ClusterConfig, ClusterConfigRequest};
use crate::platform::Platform;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failure to read a profile (distinct from the profile not existing).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The backing store could not be read
    #[error("unable to read profile '{profile}': {reason}")]
    Unavailable { profile: String, reason: String },

    /// A stored value could not be parsed
    #[error("profile '{profile}' has malformed value for '{key}': '{value}'")]
    Malformed {
        profile: String,
        key: String,
        value: String,
    },
}

/// One configuration layer. `None` leaves the lower layer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub master_count: Option<i32>,
    pub worker_count: Option<i32>,
    pub spark_master_config: Option<String>,
    pub spark_worker_config: Option<String>,
}

fn nonzero(value: i32) -> Option<i32> {
    (value != 0).then_some(value)
}

fn nonempty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Profile {
    /// Build a profile from stored key/value pairs. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Malformed`] if a count is not an integer.
    pub fn from_entries<'a>(
        profile: &str,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ProfileError> {
        let parse = |key: &str, value: &str| {
            value
                .trim()
                .parse::<i32>()
                .map(nonzero)
                .map_err(|_| ProfileError::Malformed {
                    profile: profile.to_string(),
                    key: key.to_string(),
                    value: value.trim().to_string(),
                })
        };

        let mut result = Profile::default();
        for (key, value) in entries {
            match key {
                PROFILE_KEY_MASTER_COUNT => result.master_count = parse(key, value)?,
                PROFILE_KEY_WORKER_COUNT => result.worker_count = parse(key, value)?,
                PROFILE_KEY_MASTER_CONFIG => result.spark_master_config = nonempty(value),
                PROFILE_KEY_WORKER_CONFIG => result.spark_worker_config = nonempty(value),
                _ => {}
            }
        }
        Ok(result)
    }

    /// Stack `upper` on top of `self`; values set in `upper` win.
    #[must_use]
    pub fn overlay(&self, upper: &Profile) -> Profile {
        Profile {
            master_count: upper.master_count.or(self.master_count),
            worker_count: upper.worker_count.or(self.worker_count),
            spark_master_config: upper
                .spark_master_config
                .clone()
                .or_else(|| self.spark_master_config.clone()),
            spark_worker_config: upper
                .spark_worker_config
                .clone()
                .or_else(|| self.spark_worker_config.clone()),
        }
    }

    /// Apply this layer to a config.
    pub fn apply_to(&self, config: &mut ClusterConfig) {
        if let Some(count) = self.master_count {
            config.master_count = count;
        }
        if let Some(count) = self.worker_count {
            config.worker_count = count;
        }
        if let Some(name) = &self.spark_master_config {
            config.spark_master_config = Some(name.clone());
        }
        if let Some(name) = &self.spark_worker_config {
            config.spark_worker_config = Some(name.clone());
        }
    }
}

impl From<&ClusterConfigRequest> for Profile {
    fn from(request: &ClusterConfigRequest) -> Self {
        Profile {
            master_count: nonzero(request.master_count),
            worker_count: nonzero(request.worker_count),
            spark_master_config: nonempty(&request.spark_master_config),
            spark_worker_config: nonempty(&request.spark_worker_config),
        }
    }
}

/// Source of named profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a profile; `Ok(None)` when it does not exist.
    async fn load(&self, namespace: &str, name: &str) -> Result<Option<Profile>, ProfileError>;
}

/// Profiles stored as `ConfigMap`s named after the profile.
pub struct ConfigMapProfileStore {
    platform: Arc<dyn Platform>,
}

impl ConfigMapProfileStore {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl ProfileStore for ConfigMapProfileStore {
    async fn load(&self, namespace: &str, name: &str) -> Result<Option<Profile>, ProfileError> {
        let config_map = self
            .platform
            .get_config_map(namespace, name)
            .await
            .map_err(|e| ProfileError::Unavailable {
                profile: name.to_string(),
                reason: e.to_string(),
            })?;

        let Some(config_map) = config_map else {
            return Ok(None);
        };
        let data = config_map.data.unwrap_or_default();
        Profile::from_entries(name, data.iter().map(|(k, v)| (k.as_str(), v.as_str()))).map(Some)
    }
}

/// Profiles stored as files named `<profile>.<key>` in one directory.
///
/// This is the layout produced by mounting a `ConfigMap` as a volume.
pub struct DirectoryProfileStore {
    dir: PathBuf,
}

impl DirectoryProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ProfileStore for DirectoryProfileStore {
    async fn load(&self, _namespace: &str, name: &str) -> Result<Option<Profile>, ProfileError> {
        let keys = [
            PROFILE_KEY_MASTER_COUNT,
            PROFILE_KEY_WORKER_COUNT,
            PROFILE_KEY_MASTER_CONFIG,
            PROFILE_KEY_WORKER_CONFIG,
        ];

        let mut entries = Vec::new();
        for key in keys {
            let path = self.dir.join(format!("{name}.{key}"));
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => entries.push((key, contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ProfileError::Unavailable {
                        profile: name.to_string(),
                        reason: format!("{}: {e}", path.display()),
                    })
                }
            }
        }

        if entries.is_empty() {
            return Ok(None);
        }
        Profile::from_entries(name, entries.iter().map(|(k, v)| (*k, v.as_str()))).map(Some)
    }
}

/// Resolve the final configuration of a request.
///
/// # Errors
///
/// Returns [`ClusterError::ConfigurationInvalid`] when the named profile does
/// not exist, the store cannot be read, a stored value is malformed, or a
/// merged count is not positive.
pub async fn resolve(
    store: &dyn ProfileStore,
    namespace: &str,
    overrides: Option<&ClusterConfigRequest>,
) -> Result<ClusterConfig, ClusterError> {
    let to_config_error = |e: ProfileError| ClusterError::configuration(e.to_string());

    let mut layers = store
        .load(namespace, DEFAULT_PROFILE_NAME)
        .await
        .map_err(to_config_error)?
        .unwrap_or_else(|| {
            debug!(namespace = %namespace, "No default profile, using built-in defaults");
            Profile::default()
        });

    if let Some(request) = overrides {
        if let Some(name) = request.name.as_deref().filter(|n| !n.is_empty()) {
            let named = store
                .load(namespace, name)
                .await
                .map_err(to_config_error)?
                .ok_or_else(|| {
                    ClusterError::configuration(format!("Named config '{name}' does not exist"))
                })?;
            layers = layers.overlay(&named);
        }
        layers = layers.overlay(&Profile::from(request));
    }

    let mut config = ClusterConfig {
        master_count: FALLBACK_MASTER_COUNT,
        worker_count: FALLBACK_WORKER_COUNT,
        spark_master_config: None,
        spark_worker_config: None,
    };
    layers.apply_to(&mut config);
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ClusterConfig) -> Result<(), ClusterError> {
    let check = |field: &str, value: i32| match value {
        0 => Err(ClusterError::configuration(format!(
            "Cluster configuration may not have {field} of 0"
        ))),
        v if v < 0 => Err(ClusterError::configuration(format!(
            "Cluster configuration may not have a negative {field}"
        ))),
        _ => Ok(()),
    };
    check("masterCount", config.master_count)?;
    check("workerCount", config.worker_count)
}

#[cfg(test)]
#[path = "cluster_config_tests.rs"]
mod cluster_config_tests;
