//! Application state for the payroll API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::PayrollEngine;

/// Shared application state.
///
/// Every handler drives the same [`PayrollEngine`].
#[derive(Clone)]
pub struct AppState {
    engine: Arc<PayrollEngine>,
}

impl AppState {
    /// Wraps an engine for sharing across handlers.
    pub fn new(engine: PayrollEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Builds an engine from loaded configuration.
    pub fn from_config(config: &ConfigLoader) -> Self {
        Self::new(PayrollEngine::from_config(config))
    }

    /// Returns the payroll engine.
    pub fn engine(&self) -> &PayrollEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_engine() {
        let state = AppState::new(PayrollEngine::default());
        let other = state.clone();
        assert!(std::ptr::eq(state.engine(), other.engine()));
    }
}
