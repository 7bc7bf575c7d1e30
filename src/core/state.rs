use std::sync::Arc;

use crate::core::config::Settings;
use crate::core::time::Clock;
use crate::store::AssessmentStore;

/// Shared handle bundling everything an attempt session needs from its host:
/// configuration, the store boundary and the time source.
#[derive(Clone)]
pub struct EngineContext {
    inner: Arc<InnerContext>,
}

struct InnerContext {
    settings: Settings,
    store: Arc<dyn AssessmentStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl EngineContext {
    pub fn new(settings: Settings, store: Arc<dyn AssessmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { inner: Arc::new(InnerContext { settings, store, clock }) }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn store(&self) -> &dyn AssessmentStore {
        self.inner.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }
}
