// Add a subscription for every recognized media item in context.subscribes.
// Grounded in app/actions/add_subscribe.py, which is itself a stub in the
// original source (no subscribe chain wired up yet) — kept faithfully
// minimal here rather than inventing subscribe-creation logic the original
// doesn't have either.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::engine::cache::DedupCacheStore;
use crate::models::ActionContext;
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddSubscribeParams {
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct AddSubscribeAction {
    runtime: ActionRuntime,
}

impl AddSubscribeAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
        }
    }
}

#[async_trait::async_trait]
impl Action for AddSubscribeAction {
    fn runtime(&self) -> &ActionRuntime {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut ActionRuntime {
        &mut self.runtime
    }

    async fn execute(
        &mut self,
        _workflow_id: &str,
        _params: &serde_json::Value,
        context: ActionContext,
        _cancel: &CancellationToken,
    ) -> Result<ActionContext> {
        self.runtime.job_done("no subscribe chain configured");
        Ok(context)
    }

    fn success(&self) -> bool {
        true
    }
}
