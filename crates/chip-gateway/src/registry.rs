// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider name to adapter lookup.

use std::sync::Arc;

use chip_core::{ChipError, MessagingAdapter};
use dashmap::DashMap;
use tracing::info;

/// Live messaging adapters keyed by provider name.
///
/// Providers can be registered at any time, including while requests are
/// being served; dispatch code only ever goes through [`get`](Self::get).
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: DashMap<String, Arc<dyn MessagingAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` under its own name, returning any adapter it
    /// replaced.
    pub fn register(&self, adapter: Arc<dyn MessagingAdapter>) -> Option<Arc<dyn MessagingAdapter>> {
        let name = adapter.name().to_string();
        info!(provider = %name, endpoint = adapter.send_endpoint(), "registered messaging adapter");
        self.adapters.insert(name, adapter)
    }

    /// Look up a provider. Unknown names are [`ChipError::AdapterNotFound`].
    pub fn get(&self, name: &str) -> Result<Arc<dyn MessagingAdapter>, ChipError> {
        self.adapters
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ChipError::AdapterNotFound {
                name: name.to_string(),
            })
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::RecordingAdapter;

    use super::*;

    #[test]
    fn register_and_get() {
        let registry = AdapterRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(RecordingAdapter::named("loop")));
        registry.register(Arc::new(RecordingAdapter::named("twilio")));

        assert_eq!(registry.get("loop").unwrap().name(), "loop");
        assert_eq!(registry.names(), vec!["loop", "twilio"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_provider_is_not_found() {
        let registry = AdapterRegistry::new();
        let err = registry.get("carrier-pigeon").err().unwrap();
        assert!(matches!(err, ChipError::AdapterNotFound { ref name } if name == "carrier-pigeon"));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn re_registering_replaces() {
        let registry = AdapterRegistry::new();
        assert!(registry.register(Arc::new(RecordingAdapter::named("loop"))).is_none());
        assert!(registry.register(Arc::new(RecordingAdapter::named("loop"))).is_some());
        assert_eq!(registry.len(), 1);
    }
}
