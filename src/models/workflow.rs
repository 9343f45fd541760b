// Workflow definitions - a persistent, timer-driven action pipeline.

//! # Workflow Definitions
//!
//! A [`Workflow`] is a persistent, user-authored pipeline: an ordered set of
//! [`ActionDefinition`]s wired together by [`ActionFlow`] edges describing a
//! single linear traversal (or trivially, a DAG where every node has in- and
//! out-degree at most 1). The executor resolves `flows` into a total order
//! before running; see [`crate::engine::flow::linearize`].

use serde::{Deserialize, Serialize};

/// Lifecycle state of a workflow, serialised using spec's single-letter
/// tags so persisted rows read the way the source system's do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowState {
    #[serde(rename = "N")]
    New,
    #[serde(rename = "R")]
    Running,
    #[serde(rename = "P")]
    Paused,
    #[serde(rename = "S")]
    Succeeded,
    #[serde(rename = "F")]
    Failed,
}

/// One stage of a workflow: a registered action type bound to parameters.
///
/// `type_tag` must resolve in the [`crate::action::ActionRegistry`] at load
/// time; an unknown tag fails the workflow with `ConfigError` before any
/// action runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Stable within the workflow, not globally unique.
    pub id: String,
    /// Registered action-type tag (e.g. `"FetchRss"`, `"AddDownload"`).
    pub type_tag: String,
    pub name: String,
    pub description: String,
    /// Free-form parameter dictionary, bound against each action's typed
    /// params struct at execution time. Unknown fields are ignored.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Opaque UI hint; the engine never reads it.
    #[serde(default)]
    pub position: serde_json::Value,
}

/// A directed edge in a workflow's `flows`: `source` runs before `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionFlow {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// A persistent, timer-driven workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Raw cron expression. Blank or unparseable means manual-only; it
    /// never rejects the workflow (§6 "Time input").
    pub timer: String,
    pub state: WorkflowState,
    /// Id of the last action the executor started, empty before the first
    /// action of a run begins.
    pub current_action: String,
    /// Short human-readable result message, always set after a run.
    pub result: String,
    pub run_count: u64,
    pub actions: Vec<ActionDefinition>,
    pub flows: Vec<ActionFlow>,
    pub add_time: chrono::DateTime<chrono::Utc>,
    pub last_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl Workflow {
    /// Construct a brand-new, never-run workflow.
    pub fn new(id: impl Into<String>, name: impl Into<String>, timer: impl Into<String>) -> Self {
        Workflow {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            timer: timer.into(),
            state: WorkflowState::New,
            current_action: String::new(),
            result: String::new(),
            run_count: 0,
            actions: Vec::new(),
            flows: Vec::new(),
            add_time: chrono::Utc::now(),
            last_time: None,
        }
    }

    /// Whether this workflow has a timer that can be scheduled
    /// automatically. A blank or unparseable timer leaves the workflow
    /// manual-only but still runnable via `run_once`.
    pub fn is_scheduled(&self) -> bool {
        !self.timer.trim().is_empty() && self.timer.parse::<cron::Schedule>().is_ok()
    }

    pub fn find_action(&self, id: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.id == id)
    }
}
