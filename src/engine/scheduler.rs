// Workflow Scheduler - owns workflow lifecycle and timer-driven runs.
//
// A single `tokio::time::interval` tick loop evaluates every enabled
// workflow's cron timer and `tokio::spawn`s the executor for anything due,
// grounded in the teacher's `tokio::spawn`-per-request pattern
// (server/graphql.rs). A workflow never runs concurrently with itself: the
// running-set mutex below enforces it regardless of whether the run was
// triggered by the timer or a manual `run_once`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::action::ActionRegistry;
use crate::chain::ChainBus;
use crate::engine::cache::DedupCacheStore;
use crate::engine::executor::WorkflowExecutor;
use crate::engine::storage::WorkflowStorage;
use crate::models::{Workflow, WorkflowState};
use crate::{EngineError, Result};

/// Scheduler tuning knobs, following the teacher's plain-struct
/// configuration style (e.g. `OpenAIApiConfig`) over a config-framework
/// dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How often the tick loop re-evaluates workflow timers, in seconds.
    #[serde(default = "default_tick_resolution_secs")]
    pub tick_resolution_secs: u64,
}

fn default_tick_resolution_secs() -> u64 {
    60
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_resolution_secs: default_tick_resolution_secs(),
        }
    }
}

/// The workflow control surface (spec.md §6): start/stop/pause/resume and
/// on-demand runs, with no HTTP/GraphQL framing — that's a Non-goal.
#[async_trait::async_trait]
pub trait WorkflowControl: Send + Sync {
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow>;
    async fn delete_workflow(&self, id: &str) -> Result<()>;
    async fn run_once(&self, id: &str) -> Result<()>;
    async fn pause_workflow(&self, id: &str) -> Result<()>;
    async fn resume_workflow(&self, id: &str) -> Result<()>;
    async fn stop_workflow(&self, id: &str) -> Result<()>;
    async fn stop_system(&self);
}

struct RunningWorkflow {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

pub struct WorkflowScheduler {
    storage: Arc<dyn WorkflowStorage>,
    cache: Arc<dyn DedupCacheStore>,
    registry: Arc<ActionRegistry>,
    bus: Arc<ChainBus>,
    running: Mutex<HashMap<String, RunningWorkflow>>,
    system_stop: CancellationToken,
}

impl WorkflowScheduler {
    pub fn new(
        storage: Arc<dyn WorkflowStorage>,
        cache: Arc<dyn DedupCacheStore>,
        registry: Arc<ActionRegistry>,
        bus: Arc<ChainBus>,
    ) -> Self {
        Self {
            storage,
            cache,
            registry,
            bus,
            running: Mutex::new(HashMap::new()),
            system_stop: CancellationToken::new(),
        }
    }

    /// Spawn the cron tick loop. Returns the task handle so a caller can
    /// `.abort()` it (e.g. at the end of a test); a real process would just
    /// let it run for the process lifetime.
    pub fn spawn_tick_loop(self: &Arc<Self>, config: &SchedulerConfig) -> JoinHandle<()> {
        let scheduler = self.clone();
        let resolution = Duration::from_secs(config.tick_resolution_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(resolution);
            loop {
                interval.tick().await;
                if scheduler.system_stop.is_cancelled() {
                    break;
                }
                if let Err(err) = scheduler.tick().await {
                    error!(error = %err, "scheduler tick failed");
                }
            }
        })
    }

    /// One tick: run every enabled, due, not-already-running workflow.
    async fn tick(&self) -> Result<()> {
        self.forget_finished().await;
        for workflow in self.storage.list_workflows().await? {
            if !workflow.is_scheduled() {
                continue;
            }
            if workflow.state == WorkflowState::Running || workflow.state == WorkflowState::Paused {
                continue;
            }
            let schedule: cron::Schedule = match workflow.timer.parse() {
                Ok(schedule) => schedule,
                Err(_) => continue,
            };
            let due = schedule
                .after(&workflow.last_time.unwrap_or(workflow.add_time))
                .next()
                .map(|next| next <= chrono::Utc::now())
                .unwrap_or(false);
            if due {
                self.spawn_run(workflow).await?;
            }
        }
        Ok(())
    }

    async fn spawn_run(&self, workflow: Workflow) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.contains_key(&workflow.id) {
            return Ok(());
        }

        let id = workflow.id.clone();
        let cancel = self.system_stop.child_token();
        let storage = self.storage.clone();
        let cache = self.cache.clone();
        let registry = self.registry.clone();
        let bus = self.bus.clone();
        let run_cancel = cancel.clone();
        let run_id = id.clone();

        let handle = tokio::spawn(async move {
            let executor = WorkflowExecutor::new(storage, cache, registry, bus);
            if let Err(err) = executor.run(workflow, run_cancel).await {
                error!(workflow = %run_id, error = %err, "workflow run ended in error");
            }
        });

        running.insert(id, RunningWorkflow { handle, cancel });
        Ok(())
    }

    async fn forget_finished(&self) {
        let mut running = self.running.lock().await;
        running.retain(|_, entry| !entry.handle.is_finished());
    }
}

#[async_trait::async_trait]
impl WorkflowControl for WorkflowScheduler {
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow> {
        self.storage.create_workflow(workflow).await
    }

    async fn delete_workflow(&self, id: &str) -> Result<()> {
        self.stop_workflow(id).await?;
        self.cache.clear_workflow(id).await?;
        self.storage.delete_workflow(id).await
    }

    async fn run_once(&self, id: &str) -> Result<()> {
        let workflow = self
            .storage
            .get_workflow(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        if workflow.state == WorkflowState::Running {
            return Ok(());
        }
        self.forget_finished().await;
        self.spawn_run(workflow).await
    }

    /// Stop any in-flight run and mark the workflow paused so the tick loop
    /// skips it until `resume_workflow` is called.
    async fn pause_workflow(&self, id: &str) -> Result<()> {
        self.stop_workflow(id).await?;
        if let Some(mut workflow) = self.storage.get_workflow(id).await? {
            workflow.state = WorkflowState::Paused;
            self.storage.update_workflow(workflow).await?;
        }
        Ok(())
    }

    /// Make a paused workflow eligible for timer/manual runs again.
    async fn resume_workflow(&self, id: &str) -> Result<()> {
        if let Some(mut workflow) = self.storage.get_workflow(id).await? {
            if workflow.state == WorkflowState::Paused {
                workflow.state = WorkflowState::New;
                self.storage.update_workflow(workflow).await?;
            }
        }
        Ok(())
    }

    async fn stop_workflow(&self, id: &str) -> Result<()> {
        let mut running = self.running.lock().await;
        if let Some(entry) = running.remove(id) {
            entry.cancel.cancel();
        }
        Ok(())
    }

    async fn stop_system(&self) {
        self.system_stop.cancel();
        info!("system stop requested; all workflow cancellation tokens cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::builtin;
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::engine::storage::InMemoryWorkflowStorage;

    fn scheduler() -> Arc<WorkflowScheduler> {
        let mut registry = ActionRegistry::new();
        builtin::register_all(&mut registry);
        Arc::new(WorkflowScheduler::new(
            Arc::new(InMemoryWorkflowStorage::new()),
            Arc::new(InMemoryDedupCacheStore::new()),
            Arc::new(registry),
            Arc::new(ChainBus::new()),
        ))
    }

    #[test]
    fn scheduler_config_defaults_to_a_one_minute_tick() {
        assert_eq!(SchedulerConfig::default().tick_resolution_secs, 60);
    }

    #[test]
    fn scheduler_config_parses_from_json() {
        let config: SchedulerConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config.tick_resolution_secs, 60);
        let config: SchedulerConfig =
            serde_json::from_value(serde_json::json!({"tick_resolution_secs": 5})).unwrap();
        assert_eq!(config.tick_resolution_secs, 5);
    }

    #[tokio::test]
    async fn run_once_on_unknown_workflow_is_not_found() {
        let scheduler = scheduler();
        let err = scheduler.run_once("ghost").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn second_run_once_while_first_is_in_flight_is_a_no_op() {
        let scheduler = scheduler();
        let mut workflow = Workflow::new("wf-1", "dup", "");
        workflow.actions = vec![crate::models::ActionDefinition {
            id: "a1".into(),
            type_tag: "AddSubscribe".into(),
            name: "a1".into(),
            description: String::new(),
            data: serde_json::json!({}),
            position: serde_json::json!({}),
        }];
        scheduler.create_workflow(workflow).await.unwrap();

        scheduler.run_once("wf-1").await.unwrap();
        // Immediately trying again, before the first run's task has had a
        // chance to finish, must not spawn a second run.
        let running_before = scheduler.running.lock().await.len();
        scheduler.run_once("wf-1").await.unwrap();
        let running_after = scheduler.running.lock().await.len();
        assert_eq!(running_before, running_after);
    }

    #[tokio::test]
    async fn stop_workflow_cancels_its_token() {
        let scheduler = scheduler();
        let mut workflow = Workflow::new("wf-1", "stop-me", "");
        workflow.actions = vec![crate::models::ActionDefinition {
            id: "a1".into(),
            type_tag: "AddSubscribe".into(),
            name: "a1".into(),
            description: String::new(),
            data: serde_json::json!({}),
            position: serde_json::json!({}),
        }];
        scheduler.create_workflow(workflow).await.unwrap();
        scheduler.run_once("wf-1").await.unwrap();
        scheduler.stop_workflow("wf-1").await.unwrap();
        assert!(scheduler.running.lock().await.get("wf-1").is_none());
    }

    #[tokio::test]
    async fn pause_workflow_marks_it_paused_and_tick_skips_it() {
        let scheduler = scheduler();
        let mut workflow = Workflow::new("wf-1", "pause-me", "0 * * * * *");
        workflow.actions = vec![crate::models::ActionDefinition {
            id: "a1".into(),
            type_tag: "AddSubscribe".into(),
            name: "a1".into(),
            description: String::new(),
            data: serde_json::json!({}),
            position: serde_json::json!({}),
        }];
        scheduler.create_workflow(workflow).await.unwrap();
        scheduler.pause_workflow("wf-1").await.unwrap();
        let paused = scheduler.storage.get_workflow("wf-1").await.unwrap().unwrap();
        assert_eq!(paused.state, WorkflowState::Paused);
        scheduler.tick().await.unwrap();
        assert!(scheduler.running.lock().await.get("wf-1").is_none());
    }

    #[tokio::test]
    async fn resume_workflow_clears_the_paused_state() {
        let scheduler = scheduler();
        let workflow = Workflow::new("wf-1", "resume-me", "");
        scheduler.create_workflow(workflow).await.unwrap();
        scheduler.pause_workflow("wf-1").await.unwrap();
        scheduler.resume_workflow("wf-1").await.unwrap();
        let resumed = scheduler.storage.get_workflow("wf-1").await.unwrap().unwrap();
        assert_eq!(resumed.state, WorkflowState::New);
    }

    #[tokio::test]
    async fn delete_workflow_clears_storage_and_cache() {
        let scheduler = scheduler();
        let workflow = Workflow::new("wf-1", "gone", "");
        scheduler.create_workflow(workflow).await.unwrap();
        scheduler.cache.add("wf-1", "a1", "fingerprint".into()).await.unwrap();
        scheduler.delete_workflow("wf-1").await.unwrap();
        assert!(scheduler.storage.get_workflow("wf-1").await.unwrap().is_none());
        assert!(scheduler.cache.get("wf-1", "a1").await.unwrap().is_empty());
    }
}
