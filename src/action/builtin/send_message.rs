// Dispatch every queued message through the PostMessage capability,
// draining context.messages. Grounded in app/actions/send_message.py.

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
pub struct SendMessageParams {
    #[serde(default)]
    pub client: Vec<String>,
    #[serde(default)]
    pub userid: Option<String>,
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct SendMessageAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
}

impl SendMessageAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
        }
    }
}

#[async_trait::async_trait]
impl Action for SendMessageAction {
    fn runtime(&self) -> &ActionRuntime {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut ActionRuntime {
        &mut self.runtime
    }

    async fn execute(
        &mut self,
        _workflow_id: &str,
        params: &serde_json::Value,
        mut context: ActionContext,
        _cancel: &CancellationToken,
    ) -> Result<ActionContext> {
        let params: SendMessageParams = serde_json::from_value(params.clone()).unwrap_or_default();

        let pending = std::mem::take(&mut context.messages);
        for mut message in pending {
            if !params.client.is_empty() {
                message.source = params.client.clone();
            }
            if params.userid.is_some() {
                message.userid = params.userid.clone();
            }
            self.bus
                .run_module(CapabilityCall::PostMessage { notification: message })
                .await;
        }

        self.runtime.job_done("messages dispatched");
        Ok(context)
    }

    fn success(&self) -> bool {
        true
    }
}
