// Dedup Cache Store - at-most-once fingerprints per workflow action.
//
// Keyed `WorkflowCache-{workflow_id} -> {action_id -> [fingerprint, ...]}`,
// per spec §4.5. Persisted across runs of the same workflow; cleared only
// when the workflow itself is deleted, or on an explicit user-triggered
// reset. Actions never clear it themselves.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::Result;

#[async_trait::async_trait]
pub trait DedupCacheStore: Send + Sync {
    /// Fingerprints already recorded for `(workflow_id, action_id)`.
    async fn get(&self, workflow_id: &str, action_id: &str) -> Result<Vec<String>>;

    /// Append `fingerprint` if not already present. No-op if it is.
    async fn add(&self, workflow_id: &str, action_id: &str, fingerprint: String) -> Result<()>;

    /// Whether `fingerprint` has already been recorded for this action.
    async fn contains(&self, workflow_id: &str, action_id: &str, fingerprint: &str) -> Result<bool> {
        Ok(self.get(workflow_id, action_id).await?.iter().any(|f| f == fingerprint))
    }

    /// Drop every fingerprint recorded for a workflow. Called only when the
    /// workflow is deleted or a user explicitly clears its cache.
    async fn clear_workflow(&self, workflow_id: &str) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryDedupCacheStore {
    entries: RwLock<HashMap<String, HashMap<String, Vec<String>>>>,
}

impl InMemoryDedupCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(workflow_id: &str) -> String {
        format!("WorkflowCache-{workflow_id}")
    }
}

#[async_trait::async_trait]
impl DedupCacheStore for InMemoryDedupCacheStore {
    async fn get(&self, workflow_id: &str, action_id: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .get(&Self::key(workflow_id))
            .and_then(|actions| actions.get(action_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, workflow_id: &str, action_id: &str, fingerprint: String) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        let actions = entries.entry(Self::key(workflow_id)).or_default();
        let fingerprints = actions.entry(action_id.to_string()).or_default();
        if !fingerprints.contains(&fingerprint) {
            fingerprints.push(fingerprint);
        }
        Ok(())
    }

    async fn clear_workflow(&self, workflow_id: &str) -> Result<()> {
        self.entries.write().unwrap().remove(&Self::key(workflow_id));
        Ok(())
    }
}
