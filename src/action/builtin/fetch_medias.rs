// Fetch ranked/recommended media lists into context.medias.
// Grounded in app/actions/fetch_medias.py; the original's long hardcoded
// list of ranking sources (TMDB trending, Douban hot, Bangumi calendar,
// ...) is collapsed to a generic `Recommend` capability call per requested
// source name, since concrete recommendation feeds are collaborator
// integrations out of scope (Module is the only seam, SPEC_FULL §6).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::chain::{CapabilityCall, CapabilityResult, ChainBus};
use crate::engine::cache::DedupCacheStore;
use crate::models::ActionContext;
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchMediasParams {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct FetchMediasAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    has_error: bool,
    fetched: usize,
}

impl FetchMediasAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            has_error: false,
            fetched: 0,
        }
    }
}

#[async_trait::async_trait]
impl Action for FetchMediasAction {
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
        cancel: &CancellationToken,
    ) -> Result<ActionContext> {
        let params: FetchMediasParams = serde_json::from_value(params.clone()).unwrap_or_default();
        let mut fetched = Vec::new();

        for source in &params.sources {
            if cancel.is_cancelled() {
                break;
            }
            match self.bus.run_module(CapabilityCall::Recommend { source: source.clone() }).await {
                Some(CapabilityResult::Medias(medias)) => fetched.extend(medias),
                _ => self.has_error = true,
            }
        }

        self.fetched = fetched.len();
        context.medias.extend(fetched);
        self.runtime.job_done(format!("fetched {} medias", self.fetched));
        Ok(context)
    }

    fn success(&self) -> bool {
        !self.has_error
    }
}
