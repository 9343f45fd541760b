// Invoke a plugin-provided action against the current context.
// Grounded in app/actions/invoke_plugin.py.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::chain::{Capability, CapabilityCall, CapabilityResult, ChainBus};
use crate::engine::cache::DedupCacheStore;
use crate::models::ActionContext;
use crate::{EngineError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokePluginParams {
    #[serde(default)]
    pub plugin_id: Option<String>,
    #[serde(default)]
    pub action_id: Option<String>,
    #[serde(default)]
    pub action_params: serde_json::Value,
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct InvokePluginAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    succeeded: bool,
}

impl InvokePluginAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            succeeded: false,
        }
    }
}

#[async_trait::async_trait]
impl Action for InvokePluginAction {
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
        context: ActionContext,
        _cancel: &CancellationToken,
    ) -> Result<ActionContext> {
        let params: InvokePluginParams = serde_json::from_value(params.clone()).unwrap_or_default();
        let (Some(plugin_id), Some(action_id)) = (params.plugin_id.clone(), params.action_id.clone()) else {
            self.runtime.job_done("no plugin configured");
            return Ok(context);
        };

        let result = self
            .bus
            .run_module(CapabilityCall::PluginAction {
                plugin_id: plugin_id.clone(),
                action_id: action_id.clone(),
                params: params.action_params.clone(),
            })
            .await;

        let context = match result {
            Some(CapabilityResult::Plugin { success, context }) => {
                self.succeeded = success;
                context
            }
            None => {
                return Err(EngineError::CapabilityUnavailable(Capability::PluginAction));
            }
            _ => context,
        };

        self.runtime.job_done(format!("invoked {plugin_id}/{action_id}"));
        Ok(context)
    }

    fn success(&self) -> bool {
        self.succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cache::InMemoryDedupCacheStore;

    struct StubPlugin;
    #[async_trait::async_trait]
    impl crate::chain::Module for StubPlugin {
        fn name(&self) -> &str {
            "stub-plugin"
        }
        fn capabilities(&self) -> &[Capability] {
            &[Capability::PluginAction]
        }
        async fn invoke(&self, call: &CapabilityCall) -> Result<Option<CapabilityResult>> {
            match call {
                CapabilityCall::PluginAction { .. } => Ok(Some(CapabilityResult::Plugin {
                    success: true,
                    context: ActionContext::new(),
                })),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn missing_plugin_host_is_capability_unavailable() {
        let bus = Arc::new(ChainBus::new());
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = InvokePluginAction::new("p1".into(), cache, bus);
        let err = action
            .execute(
                "wf",
                &serde_json::json!({"plugin_id": "demo", "action_id": "run"}),
                ActionContext::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::CapabilityUnavailable(Capability::PluginAction)));
    }

    #[tokio::test]
    async fn registered_plugin_host_reports_its_own_success() {
        let mut bus = ChainBus::new();
        bus.register("plugin", Arc::new(StubPlugin));
        let bus = Arc::new(bus);
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = InvokePluginAction::new("p1".into(), cache, bus);
        action
            .execute(
                "wf",
                &serde_json::json!({"plugin_id": "demo", "action_id": "run"}),
                ActionContext::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(action.success());
    }

    #[tokio::test]
    async fn missing_plugin_id_is_a_no_op() {
        let bus = Arc::new(ChainBus::new());
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = InvokePluginAction::new("p1".into(), cache, bus);
        action
            .execute("wf", &serde_json::json!({}), ActionContext::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!action.success());
    }
}
