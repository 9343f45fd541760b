// Storage abstraction for workflow definitions.
//
// Separates the scheduler/executor from whatever backs persistence. The
// in-memory implementation is what the rest of this crate is built and
// tested against; a real deployment would swap in a database-backed one
// without the engine noticing.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::Workflow;
use crate::{EngineError, Result};

/// Storage trait for workflow definitions.
///
/// All operations are async so a real backend (Postgres, SQLite, ...) can
/// do network I/O without the engine caring. `Send + Sync` lets the trait
/// object be shared across the scheduler's spawned tasks behind an `Arc`.
#[async_trait::async_trait]
pub trait WorkflowStorage: Send + Sync {
    /// Insert a brand-new workflow. Errors if `id` is already taken.
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow>;

    async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>>;

    async fn list_workflows(&self) -> Result<Vec<Workflow>>;

    /// Replace a stored workflow wholesale. Errors if `id` is unknown.
    async fn update_workflow(&self, workflow: Workflow) -> Result<Workflow>;

    /// Remove a workflow and any state (e.g. dedup cache) scoped to it.
    async fn delete_workflow(&self, id: &str) -> Result<()>;
}

/// In-memory `WorkflowStorage`, the default wired up by [`crate::engine::WorkflowScheduler::new`].
#[derive(Default)]
pub struct InMemoryWorkflowStorage {
    workflows: RwLock<HashMap<String, Workflow>>,
}

impl InMemoryWorkflowStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WorkflowStorage for InMemoryWorkflowStorage {
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow> {
        let mut workflows = self.workflows.write().unwrap();
        if workflows.contains_key(&workflow.id) {
            return Err(EngineError::Config(format!(
                "workflow '{}' already exists",
                workflow.id
            )));
        }
        workflows.insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }

    async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>> {
        Ok(self.workflows.read().unwrap().get(id).cloned())
    }

    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        Ok(self.workflows.read().unwrap().values().cloned().collect())
    }

    async fn update_workflow(&self, workflow: Workflow) -> Result<Workflow> {
        let mut workflows = self.workflows.write().unwrap();
        if !workflows.contains_key(&workflow.id) {
            return Err(EngineError::NotFound(workflow.id));
        }
        workflows.insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }

    async fn delete_workflow(&self, id: &str) -> Result<()> {
        self.workflows.write().unwrap().remove(id);
        Ok(())
    }
}
