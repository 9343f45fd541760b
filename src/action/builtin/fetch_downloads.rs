// Refresh the completion status of every download in context.downloads via
// the ListTorrents capability. Grounded in app/actions/fetch_downloads.py.

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
pub struct FetchDownloadsParams {
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct FetchDownloadsAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    all_completed: bool,
}

impl FetchDownloadsAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            all_completed: true,
        }
    }
}

#[async_trait::async_trait]
impl Action for FetchDownloadsAction {
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
        let hashes: Vec<String> = context.downloads.iter().map(|d| d.download_id.clone()).collect();
        let result = self.bus.run_module(CapabilityCall::ListTorrents { hashes }).await;
        let torrents = match result {
            Some(CapabilityResult::Torrents(torrents)) => torrents,
            _ => Vec::new(),
        };

        for download in &mut context.downloads {
            match torrents.iter().find(|t| t.download_id == download.download_id) {
                Some(refreshed) => {
                    download.path = refreshed.path.clone();
                    download.completed = refreshed.completed;
                }
                None => download.completed = true,
            }
        }

        self.all_completed = context.downloads.iter().all(|d| d.completed);
        self.runtime.job_done("download statuses refreshed");
        Ok(context)
    }

    fn success(&self) -> bool {
        self.all_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::models::DownloadTask;

    #[tokio::test]
    async fn missing_torrent_is_treated_as_completed() {
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let bus = Arc::new(ChainBus::new());
        let mut action = FetchDownloadsAction::new("d1".into(), cache, bus);
        let mut ctx = ActionContext::new();
        ctx.downloads = vec![DownloadTask {
            download_id: "abc".into(),
            downloader: None,
            path: None,
            completed: false,
        }];
        let out = action
            .execute("wf", &serde_json::json!({}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert!(out.downloads[0].completed);
        assert!(action.success());
    }
}
