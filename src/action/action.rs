// The Action contract every built-in (and future plugin) action implements.
//
// Grounded in `BaseAction` (app/actions/__init__.py): `name`/`description`
// are exposed as metadata rather than instance methods (§4.2), `execute`
// takes and returns the shared `ActionContext`, and `done`/`success`/
// `message` report the outcome of the last `execute` call.

use tokio_util::sync::CancellationToken;

use super::runtime::ActionRuntime;
use crate::models::ActionContext;
use crate::Result;

#[async_trait::async_trait]
pub trait Action: Send + Sync {
    /// Shared per-instance state: done flag, message, dedup cache handle.
    fn runtime(&self) -> &ActionRuntime;
    fn runtime_mut(&mut self) -> &mut ActionRuntime;

    /// Run this action's stage of the workflow against `context`, returning
    /// the (possibly extended) context for the next action in line.
    ///
    /// `params` is the raw, unbound parameter dictionary from the
    /// workflow's `ActionDefinition::data`; each action binds its own typed
    /// params struct from it. `cancel` is cancelled if the workflow or the
    /// whole system is asked to stop; an action's own item loops must poll
    /// `cancel.is_cancelled()` at the top of each iteration, never mid-item.
    async fn execute(
        &mut self,
        workflow_id: &str,
        params: &serde_json::Value,
        context: ActionContext,
        cancel: &CancellationToken,
    ) -> Result<ActionContext>;

    fn done(&self) -> bool {
        self.runtime().done()
    }

    /// Whether the last `execute` call counts as a success. Each action
    /// defines this differently (e.g. "no per-item error" vs. "produced at
    /// least one result") — see the per-action contract in DESIGN.md.
    fn success(&self) -> bool;

    fn message(&self) -> &str {
        self.runtime().message()
    }
}
