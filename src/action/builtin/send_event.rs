// Dispatch context.events through the SendEvent capability, highest
// priority first, draining the queue as each event is sent.
// Grounded in app/actions/send_event.py.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::chain::{CapabilityCall, ChainBus};
use crate::engine::cache::DedupCacheStore;
use crate::models::ActionContext;
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendEventParams {
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct SendEventAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    sent_any: bool,
}

impl SendEventAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            sent_any: false,
        }
    }
}

#[async_trait::async_trait]
impl Action for SendEventAction {
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
        mut context: ActionContext,
        _cancel: &CancellationToken,
    ) -> Result<ActionContext> {
        // Highest priority first; ties keep insertion order (stable sort).
        context.events.sort_by(|a, b| b.priority.cmp(&a.priority));

        let pending = std::mem::take(&mut context.events);
        for event in pending {
            self.bus
                .run_module(CapabilityCall::SendEvent { event: event.clone() })
                .await;
            self.sent_any = true;
        }

        self.runtime.job_done("events dispatched");
        Ok(context)
    }

    fn success(&self) -> bool {
        self.sent_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::models::Event;

    #[tokio::test]
    async fn events_are_dispatched_highest_priority_first_and_drained() {
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let bus = Arc::new(ChainBus::new());
        let mut action = SendEventAction::new("e1".into(), cache, bus);
        let mut ctx = ActionContext::new();
        ctx.events = vec![
            Event { event_type: "low".into(), data: serde_json::json!({}), priority: 1 },
            Event { event_type: "high".into(), data: serde_json::json!({}), priority: 10 },
        ];
        let out = action
            .execute("wf", &serde_json::json!({}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert!(out.events.is_empty());
        assert!(action.success());
    }
}
