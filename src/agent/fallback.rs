//! Model fallback manager.
//!
//! Owns the active model identifier and the ordered queue of alternates.
//! The state is process-wide: one request failing over degrades the model
//! for every request that starts an attempt afterwards. Each attempt works on
//! a [`ModelBinding`] snapshot, so an in-flight exchange never changes model
//! mid-way.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, info, warn};

use crate::agent::types::{ModelBinding, ToolDeclaration};

#[derive(Debug)]
struct SessionState {
    active_model: String,
    fallback_queue: VecDeque<String>,
}

/// Shared, drain-only model fallback chain
#[derive(Debug)]
pub struct ModelFallback {
    state: RwLock<SessionState>,
    declarations: Arc<[ToolDeclaration]>,
}

impl ModelFallback {
    /// Create a chain starting at `primary`, failing over through `fallbacks` in order.
    pub fn new(
        primary: impl Into<String>,
        fallbacks: impl IntoIterator<Item = String>,
        declarations: impl Into<Arc<[ToolDeclaration]>>,
    ) -> Self {
        let state = SessionState {
            active_model: primary.into(),
            fallback_queue: fallbacks.into_iter().collect(),
        };
        info!(
            "Model chain initialized: active={}, fallbacks={:?}",
            state.active_model, state.fallback_queue
        );
        ModelFallback {
            state: RwLock::new(state),
            declarations: declarations.into(),
        }
    }

    /// Snapshot of the current model bound to the shared declarations
    pub fn binding(&self) -> ModelBinding {
        ModelBinding {
            model: self.read().active_model.clone(),
            declarations: Arc::clone(&self.declarations),
        }
    }

    /// Currently active model identifier
    pub fn active_model(&self) -> String {
        self.read().active_model.clone()
    }

    /// Number of fallbacks not yet consumed
    pub fn remaining(&self) -> usize {
        self.read().fallback_queue.len()
    }

    /// Fallback models not yet consumed, in order
    pub fn queued(&self) -> Vec<String> {
        self.read().fallback_queue.iter().cloned().collect()
    }

    /// Declarations every binding carries
    pub fn declarations(&self) -> &Arc<[ToolDeclaration]> {
        &self.declarations
    }

    /// Switch to the next fallback model.
    ///
    /// Returns `false`, leaving the active model unchanged, when the queue is empty.
    pub fn advance(&self) -> bool {
        let mut state = self.write();
        Self::pop_next(&mut state)
    }

    /// Switch away from `observed`, unless someone already has.
    ///
    /// When a concurrent request has already failed over past `observed`,
    /// this returns `true` without consuming another fallback, so two
    /// requests rate limited on the same model drain one entry, not two.
    pub fn advance_from(&self, observed: &str) -> bool {
        let mut state = self.write();
        if state.active_model != observed {
            info!(
                "Model already switched from {} to {} by another request",
                observed, state.active_model
            );
            return true;
        }
        Self::pop_next(&mut state)
    }

    fn pop_next(state: &mut SessionState) -> bool {
        let Some(next_model) = state.fallback_queue.pop_front() else {
            error!("No fallback models remaining - all rate limited!");
            return false;
        };

        let previous_model = std::mem::replace(&mut state.active_model, next_model);
        warn!("Rate limit hit on {}", previous_model);
        info!(
            "Switched to fallback model: {} (remaining: {:?})",
            state.active_model, state.fallback_queue
        );
        true
    }

    // A panic while holding the lock cannot leave the state half-updated,
    // so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declarations() -> Vec<ToolDeclaration> {
        vec![ToolDeclaration {
            name: "list_containers".into(),
            description: "List containers".into(),
            parameters: json!({"type": "OBJECT", "properties": {}}),
        }]
    }

    fn chain(fallbacks: &[&str]) -> ModelFallback {
        ModelFallback::new(
            "primary",
            fallbacks.iter().map(|s| s.to_string()),
            declarations(),
        )
    }

    #[test]
    fn test_advance_pops_in_order() {
        let fb = chain(&["a", "b"]);
        assert_eq!(fb.active_model(), "primary");
        assert_eq!(fb.remaining(), 2);

        assert!(fb.advance());
        assert_eq!(fb.active_model(), "a");
        assert_eq!(fb.queued(), vec!["b"]);

        assert!(fb.advance());
        assert_eq!(fb.active_model(), "b");
        assert_eq!(fb.remaining(), 0);
    }

    #[test]
    fn test_advance_on_empty_queue_keeps_model() {
        let fb = chain(&[]);
        assert!(!fb.advance());
        assert_eq!(fb.active_model(), "primary");
        assert_eq!(fb.remaining(), 0);
    }

    #[test]
    fn test_binding_keeps_declarations_across_failover() {
        let fb = chain(&["a"]);
        let before = fb.binding();
        assert!(fb.advance());
        let after = fb.binding();

        assert_eq!(before.model, "primary");
        assert_eq!(after.model, "a");
        assert!(Arc::ptr_eq(&before.declarations, &after.declarations));
    }

    #[test]
    fn test_advance_from_stale_observation_does_not_pop() {
        let fb = chain(&["a", "b"]);
        assert!(fb.advance_from("primary"));
        assert_eq!(fb.active_model(), "a");
        assert_eq!(fb.remaining(), 1);

        // A second request that also saw "primary" fails
        assert!(fb.advance_from("primary"));
        assert_eq!(fb.active_model(), "a");
        assert_eq!(fb.remaining(), 1);
    }

    #[test]
    fn test_queue_never_grows() {
        let fb = chain(&["a", "b", "c"]);
        let mut last = fb.remaining();
        for _ in 0..6 {
            fb.advance();
            let now = fb.remaining();
            assert!(now <= last);
            last = now;
        }
        assert_eq!(last, 0);
        assert_eq!(fb.active_model(), "c");
    }

    #[test]
    fn test_concurrent_advance_from_same_model_pops_once() {
        let fb = Arc::new(chain(&["a", "b", "c"]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let fb = Arc::clone(&fb);
                std::thread::spawn(move || fb.advance_from("primary"))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(fb.active_model(), "a");
        assert_eq!(fb.remaining(), 2);
    }
}
