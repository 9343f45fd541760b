// Per-instance bookkeeping shared by every built-in action: a done flag, a
// result message, and the dedup cache handle, grounded in BaseAction's
// `_action_id` / `_done_flag` / `_message` / `_cache_key` fields
// (app/actions/__init__.py). Every action gets its own fresh `ActionRuntime`
// from the registry (§4.2 "class-attribute mutability trap" fix) rather
// than sharing mutable class state.

use std::sync::Arc;

use crate::engine::cache::DedupCacheStore;
use crate::Result;

pub struct ActionRuntime {
    pub action_id: String,
    cache: Arc<dyn DedupCacheStore>,
    done: bool,
    message: String,
}

impl ActionRuntime {
    pub fn new(action_id: impl Into<String>, cache: Arc<dyn DedupCacheStore>) -> Self {
        Self {
            action_id: action_id.into(),
            cache,
            done: false,
            message: String::new(),
        }
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Mark the action finished and record its human-readable summary.
    pub fn job_done(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.done = true;
    }

    /// Has `key` already been recorded against this action in a prior run?
    pub async fn check_cache(&self, workflow_id: &str, key: &str) -> Result<bool> {
        self.cache.contains(workflow_id, &self.action_id, key).await
    }

    /// Record `key` so a future run's `check_cache` skips it.
    pub async fn save_cache(&self, workflow_id: &str, key: impl Into<String>) -> Result<()> {
        self.cache.add(workflow_id, &self.action_id, key.into()).await
    }
}
