// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `context.rs`

#[cfg(test)]
mod tests {
    use crate::cluster_config::ConfigMapProfileStore;
    use crate::context::{Context, WaitSettings};
    use crate::environment::RuntimeEnvironment;
    use crate::platform::fake::FakePlatform;
    use crate::wait::WaitPolicy;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_default_wait_settings() {
        let waits = WaitSettings::default();
        assert_eq!(waits.materialize, WaitPolicy::materialize());
        assert_eq!(waits.drain, WaitPolicy::drain());
    }

    #[test]
    fn test_immediate_keeps_attempts() {
        let waits = WaitSettings::immediate();
        assert_eq!(waits.materialize.attempts, 4);
        assert_eq!(waits.drain.attempts, 5);
        assert_eq!(waits.drain.interval, Duration::ZERO);
    }

    #[test]
    fn test_with_waits_overrides_defaults() {
        let fake = Arc::new(FakePlatform::new());
        let ctx = Context::new(
            fake.clone(),
            Arc::new(ConfigMapProfileStore::new(fake)),
            RuntimeEnvironment::default(),
        );
        assert_eq!(ctx.waits, WaitSettings::default());

        let ctx = ctx.with_waits(WaitSettings::immediate());
        assert_eq!(ctx.waits, WaitSettings::immediate());
    }
}
