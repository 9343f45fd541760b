// Organize completed downloads (or queued fileitems) into the media
// library via the DoTransfer capability. Grounded in
// app/actions/transfer_file.py; the original's `TransferHistoryOper`
// dedup check (skip files already transferred) is folded into the same
// dedup cache every other action uses, rather than a second persistence
// table out of scope for this engine (SPEC_FULL §6).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::chain::{CapabilityCall, CapabilityResult, ChainBus};
use crate::engine::cache::DedupCacheStore;
use crate::models::{ActionContext, FileItem, FileItemKind};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferSource {
    Downloads,
    Fileitems,
}

impl Default for TransferSource {
    fn default() -> Self {
        TransferSource::Downloads
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferFileParams {
    #[serde(default)]
    pub source: TransferSource,
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct TransferFileAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    transferred: Vec<FileItem>,
    failed: u32,
}

impl TransferFileAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            transferred: Vec::new(),
            failed: 0,
        }
    }

    fn placeholder_fileitem(path: &str) -> FileItem {
        FileItem {
            storage: "local".into(),
            path: path.to_string(),
            kind: FileItemKind::File,
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            basename: path.rsplit('/').next().unwrap_or(path).to_string(),
            extension: None,
            size: None,
        }
    }
}

#[async_trait::async_trait]
impl Action for TransferFileAction {
    fn runtime(&self) -> &ActionRuntime {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut ActionRuntime {
        &mut self.runtime
    }

    async fn execute(
        &mut self,
        workflow_id: &str,
        params: &serde_json::Value,
        mut context: ActionContext,
        cancel: &CancellationToken,
    ) -> Result<ActionContext> {
        let params: TransferFileParams = serde_json::from_value(params.clone()).unwrap_or_default();

        match params.source {
            TransferSource::Downloads => {
                for download in &context.downloads {
                    if cancel.is_cancelled() {
                        break;
                    }
                    if !download.completed {
                        continue;
                    }
                    let Some(path) = &download.path else { continue };
                    let cache_key = download.download_id.clone();
                    if self.runtime.check_cache(workflow_id, &cache_key).await? {
                        continue;
                    }
                    let fileitem = Self::placeholder_fileitem(path);
                    let result = self
                        .bus
                        .run_module(CapabilityCall::DoTransfer { fileitem: fileitem.clone(), background: false })
                        .await;
                    match result {
                        Some(CapabilityResult::Transfer { ok: true, .. }) => {
                            self.transferred.push(fileitem);
                            self.runtime.save_cache(workflow_id, cache_key).await?;
                        }
                        _ => self.failed += 1,
                    }
                }
            }
            TransferSource::Fileitems => {
                let pending = std::mem::take(&mut context.fileitems);
                let mut kept = Vec::new();
                for fileitem in pending {
                    if cancel.is_cancelled() {
                        kept.push(fileitem);
                        continue;
                    }
                    let cache_key = fileitem.path.clone();
                    if self.runtime.check_cache(workflow_id, &cache_key).await? {
                        kept.push(fileitem);
                        continue;
                    }
                    let result = self
                        .bus
                        .run_module(CapabilityCall::DoTransfer { fileitem: fileitem.clone(), background: false })
                        .await;
                    match result {
                        Some(CapabilityResult::Transfer { ok: true, .. }) => {
                            self.transferred.push(fileitem);
                            self.runtime.save_cache(workflow_id, cache_key).await?;
                        }
                        _ => {
                            self.failed += 1;
                            kept.push(fileitem);
                        }
                    }
                }
                context.fileitems = kept;
            }
        }

        context.fileitems.extend(self.transferred.clone());
        self.runtime.job_done(format!(
            "transferred {} files, {} failed",
            self.transferred.len(),
            self.failed
        ));
        Ok(context)
    }

    fn success(&self) -> bool {
        !self.transferred.is_empty() || self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Capability, CapabilityCall as Call, Module};
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::models::DownloadTask;

    struct StubTransfer;
    #[async_trait::async_trait]
    impl Module for StubTransfer {
        fn name(&self) -> &str {
            "stub-transfer"
        }
        fn capabilities(&self) -> &[Capability] {
            &[Capability::DoTransfer]
        }
        async fn invoke(&self, call: &Call) -> Result<Option<CapabilityResult>> {
            match call {
                Call::DoTransfer { .. } => Ok(Some(CapabilityResult::Transfer { ok: true, error: None })),
                _ => Ok(None),
            }
        }
    }

    fn completed_download(id: &str) -> DownloadTask {
        DownloadTask {
            download_id: id.into(),
            downloader: None,
            path: Some(format!("/downloads/{id}")),
            completed: true,
        }
    }

    #[tokio::test]
    async fn transfers_a_completed_download_and_saves_dedup_cache() {
        let mut bus = ChainBus::new();
        bus.register("transfer", Arc::new(StubTransfer));
        let bus = Arc::new(bus);
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = TransferFileAction::new("t1".into(), cache.clone(), bus);
        let mut ctx = ActionContext::new();
        ctx.downloads = vec![completed_download("abc")];
        let out = action
            .execute("wf-1", &serde_json::json!({}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.fileitems.len(), 1);
        assert!(action.success());
        assert!(cache.contains("wf-1", "t1", "abc").await.unwrap());
    }

    #[tokio::test]
    async fn second_run_skips_already_transferred_download() {
        let mut bus = ChainBus::new();
        bus.register("transfer", Arc::new(StubTransfer));
        let bus = Arc::new(bus);
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());

        let mut first = TransferFileAction::new("t1".into(), cache.clone(), bus.clone());
        let mut ctx = ActionContext::new();
        ctx.downloads = vec![completed_download("abc")];
        first.execute("wf-1", &serde_json::json!({}), ctx, &CancellationToken::new()).await.unwrap();

        let mut second = TransferFileAction::new("t1".into(), cache, bus);
        let mut ctx2 = ActionContext::new();
        ctx2.downloads = vec![completed_download("abc")];
        let out = second
            .execute("wf-1", &serde_json::json!({}), ctx2, &CancellationToken::new())
            .await
            .unwrap();
        assert!(out.fileitems.is_empty());
    }
}
