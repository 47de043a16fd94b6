// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bounded wait-for-convergence.
//!
//! The workflows wait briefly for the platform to catch up (controllers to
//! materialize after a create, replica counts to drain before a delete). These
//! waits never fail: when the condition is not observed within the policy the
//! caller gets [`WaitOutcome::GaveUp`] and carries on.

use crate::constants::{
    DRAIN_WAIT_ATTEMPTS, DRAIN_WAIT_INTERVAL, MATERIALIZE_WAIT_ATTEMPTS,
    MATERIALIZE_WAIT_INTERVAL,
};
use crate::metrics;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Number of probes and the fixed pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl WaitPolicy {
    /// Wait for controllers to appear after a create: 4 probes, 250ms apart.
    #[must_use]
    pub const fn materialize() -> Self {
        Self {
            attempts: MATERIALIZE_WAIT_ATTEMPTS,
            interval: MATERIALIZE_WAIT_INTERVAL,
        }
    }

    /// Wait for a scaled-down controller to drain: 5 probes, 1s apart.
    #[must_use]
    pub const fn drain() -> Self {
        Self {
            attempts: DRAIN_WAIT_ATTEMPTS,
            interval: DRAIN_WAIT_INTERVAL,
        }
    }

    /// Same number of probes, no pause between them.
    #[must_use]
    pub const fn immediate(self) -> Self {
        Self {
            attempts: self.attempts,
            interval: Duration::ZERO,
        }
    }
}

/// Result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Observed,
    GaveUp,
}

impl WaitOutcome {
    #[must_use]
    pub fn observed(self) -> bool {
        self == WaitOutcome::Observed
    }
}

/// Probe `condition` up to `policy.attempts` times, pausing between probes.
///
/// `what` names the wait in logs and in the give-up counter.
pub async fn wait_until<F, Fut>(policy: WaitPolicy, what: &str, mut condition: F) -> WaitOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start_time = Instant::now();

    for attempt in 1..=policy.attempts {
        if condition().await {
            debug!(
                wait = what,
                attempt = attempt,
                elapsed = ?start_time.elapsed(),
                "Condition observed"
            );
            return WaitOutcome::Observed;
        }
        if attempt < policy.attempts && !policy.interval.is_zero() {
            tokio::time::sleep(policy.interval).await;
        }
    }

    debug!(
        wait = what,
        attempts = policy.attempts,
        elapsed = ?start_time.elapsed(),
        "Condition not observed, giving up"
    );
    metrics::record_wait_give_up(what);
    WaitOutcome::GaveUp
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod wait_tests;
