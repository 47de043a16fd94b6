// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all cluster workflows.
//!
//! Every workflow receives a [`Context`] that contains:
//! - the compute platform client
//! - the named profile store
//! - the runtime environment (namespace, image, REST coordinates)
//! - the bounded wait policies
//!
//! There is no process-wide state. The REST server holds one `Arc<Context>`;
//! tests build their own around an in-memory platform.

use crate::cluster_config::ProfileStore;
use crate::environment::RuntimeEnvironment;
use crate::platform::Platform;
use crate::wait::WaitPolicy;
use std::sync::Arc;

/// Wait policies used by provisioning and teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    /// Wait for controllers to appear after create
    pub materialize: WaitPolicy,
    /// Wait for scaled-down controllers to drain before delete
    pub drain: WaitPolicy,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            materialize: WaitPolicy::materialize(),
            drain: WaitPolicy::drain(),
        }
    }
}

impl WaitSettings {
    /// Default attempt counts without pauses.
    #[must_use]
    pub fn immediate() -> Self {
        let defaults = Self::default();
        Self {
            materialize: defaults.materialize.immediate(),
            drain: defaults.drain.immediate(),
        }
    }
}

/// Dependencies of the cluster workflows.
#[derive(Clone)]
pub struct Context {
    /// Compute platform all resources are created in
    pub platform: Arc<dyn Platform>,

    /// Source of named cluster profiles
    pub profiles: Arc<dyn ProfileStore>,

    /// Namespace, image and REST coordinates
    pub environment: RuntimeEnvironment,

    /// Bounded wait policies
    pub waits: WaitSettings,
}

impl Context {
    #[must_use]
    pub fn new(
        platform: Arc<dyn Platform>,
        profiles: Arc<dyn ProfileStore>,
        environment: RuntimeEnvironment,
    ) -> Self {
        Self {
            platform,
            profiles,
            environment,
            waits: WaitSettings::default(),
        }
    }

    #[must_use]
    pub fn with_waits(mut self, waits: WaitSettings) -> Self {
        self.waits = waits;
        self
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
