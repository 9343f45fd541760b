// Workflow Executor - runs one workflow to completion.
//
// Implements spec.md §4.1's five-step algorithm: resolve `flows` into a
// linear order, build an empty `ActionContext`, set `state=Running`, run
// each action in turn (persisting `current_action` before each one and
// honoring the cancellation token between actions), then finish in
// `Succeeded`/`Failed`/`Paused`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::action::ActionRegistry;
use crate::engine::cache::DedupCacheStore;
use crate::engine::flow;
use crate::engine::storage::WorkflowStorage;
use crate::chain::ChainBus;
use crate::models::{ActionContext, Workflow, WorkflowState};
use crate::{EngineError, Result};

pub struct WorkflowExecutor {
    storage: Arc<dyn WorkflowStorage>,
    cache: Arc<dyn DedupCacheStore>,
    registry: Arc<ActionRegistry>,
    bus: Arc<ChainBus>,
}

impl WorkflowExecutor {
    pub fn new(
        storage: Arc<dyn WorkflowStorage>,
        cache: Arc<dyn DedupCacheStore>,
        registry: Arc<ActionRegistry>,
        bus: Arc<ChainBus>,
    ) -> Self {
        Self { storage, cache, registry, bus }
    }

    /// Run `workflow` to completion. `cancel` is the per-workflow
    /// cancellation token; cancelling it stops the run between actions
    /// (never mid-action) and leaves the workflow in `Paused`.
    pub async fn run(&self, mut workflow: Workflow, cancel: CancellationToken) -> Result<Workflow> {
        let ordered = match flow::linearize(&workflow.actions, &workflow.flows) {
            Ok(ordered) => ordered,
            Err(err) => {
                workflow.state = WorkflowState::Failed;
                workflow.result = err.to_string();
                self.storage.update_workflow(workflow.clone()).await?;
                return Err(err);
            }
        };

        workflow.state = WorkflowState::Running;
        workflow.current_action = String::new();
        self.storage.update_workflow(workflow.clone()).await?;

        let mut context = ActionContext::new();
        let mut failure: Option<EngineError> = None;
        let mut last_message = String::new();

        for definition in &ordered {
            if cancel.is_cancelled() {
                workflow.state = WorkflowState::Paused;
                workflow.result = "stopped before completion".to_string();
                break;
            }

            workflow.current_action = definition.id.clone();
            self.storage.update_workflow(workflow.clone()).await?;

            let mut action = match self.registry.resolve(
                &definition.type_tag,
                definition.id.clone(),
                self.cache.clone(),
                self.bus.clone(),
            ) {
                Ok(action) => action,
                Err(err) => {
                    warn!(action = %definition.id, error = %err, "failed to resolve action type");
                    failure = Some(err);
                    break;
                }
            };

            info!(workflow = %workflow.id, action = %definition.id, "running action");
            match action.execute(&workflow.id, &definition.data, context, &cancel).await {
                Ok(next_context) => {
                    context = next_context;
                    last_message = action.message().to_string();
                    if !action.success() {
                        warn!(
                            action = %definition.id,
                            message = action.message(),
                            "action completed unsuccessfully"
                        );
                    }
                }
                Err(err) => {
                    warn!(action = %definition.id, error = %err, "action raised a fatal error");
                    failure = Some(err);
                    break;
                }
            }

            if cancel.is_cancelled() {
                workflow.state = WorkflowState::Paused;
                workflow.result = "stopped before completion".to_string();
                break;
            }
        }

        workflow.run_count += 1;
        workflow.last_time = Some(chrono::Utc::now());
        workflow.current_action = String::new();

        if let Some(err) = failure {
            workflow.state = WorkflowState::Failed;
            workflow.result = err.to_string();
        } else if workflow.state != WorkflowState::Paused {
            workflow.state = WorkflowState::Succeeded;
            workflow.result = if ordered.is_empty() {
                "no actions".to_string()
            } else {
                last_message
            };
        }

        self.storage.update_workflow(workflow.clone()).await?;
        Ok(workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::builtin;
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::engine::storage::InMemoryWorkflowStorage;
    use crate::models::{ActionDefinition, ActionFlow};

    fn action_def(id: &str, type_tag: &str, data: serde_json::Value) -> ActionDefinition {
        ActionDefinition {
            id: id.to_string(),
            type_tag: type_tag.to_string(),
            name: id.to_string(),
            description: String::new(),
            data,
            position: serde_json::json!({}),
        }
    }

    fn executor() -> WorkflowExecutor {
        let mut registry = ActionRegistry::new();
        builtin::register_all(&mut registry);
        WorkflowExecutor::new(
            Arc::new(InMemoryWorkflowStorage::new()),
            Arc::new(InMemoryDedupCacheStore::new()),
            Arc::new(registry),
            Arc::new(ChainBus::new()),
        )
    }

    #[tokio::test]
    async fn single_action_workflow_succeeds() {
        let mut workflow = Workflow::new("wf-1", "single", "");
        workflow.actions = vec![action_def("a1", "AddSubscribe", serde_json::json!({}))];
        let out = executor().run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(out.state, WorkflowState::Succeeded);
        assert_eq!(out.run_count, 1);
    }

    #[tokio::test]
    async fn unknown_action_type_fails_the_workflow() {
        let mut workflow = Workflow::new("wf-1", "bad", "");
        workflow.actions = vec![action_def("a1", "NoSuchAction", serde_json::json!({}))];
        let err = executor().run(workflow, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn empty_flows_with_multiple_actions_fails_before_running_anything() {
        let mut workflow = Workflow::new("wf-1", "bad-flow", "");
        workflow.actions = vec![
            action_def("a1", "AddSubscribe", serde_json::json!({})),
            action_def("a2", "AddSubscribe", serde_json::json!({})),
        ];
        let err = executor().run(workflow, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn cancellation_before_first_action_pauses_the_workflow() {
        let mut workflow = Workflow::new("wf-1", "cancel", "");
        workflow.actions = vec![action_def("a1", "AddSubscribe", serde_json::json!({}))];
        let token = CancellationToken::new();
        token.cancel();
        let out = executor().run(workflow.clone(), token).await.unwrap();
        assert_eq!(out.state, WorkflowState::Paused);
    }

    #[tokio::test]
    async fn flow_linearization_runs_actions_in_declared_order() {
        let mut workflow = Workflow::new("wf-1", "chain", "");
        workflow.actions = vec![
            action_def("fetch", "FetchRss", serde_json::json!({})),
            action_def("download", "AddDownload", serde_json::json!({})),
        ];
        workflow.flows = vec![ActionFlow {
            id: "f1".into(),
            source: "fetch".into(),
            target: "download".into(),
        }];
        let out = executor().run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(out.state, WorkflowState::Succeeded);
    }
}
