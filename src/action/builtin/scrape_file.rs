// Scrape metadata and artwork for every file in context.fileitems.
// Grounded in app/actions/scrape_file.py.

use std::collections::HashSet;
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
pub struct ScrapeFileParams {
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct ScrapeFileAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    scraped: usize,
    failed: u32,
}

impl ScrapeFileAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            scraped: 0,
            failed: 0,
        }
    }
}

#[async_trait::async_trait]
impl Action for ScrapeFileAction {
    fn runtime(&self) -> &ActionRuntime {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut ActionRuntime {
        &mut self.runtime
    }

    async fn execute(
        &mut self,
        workflow_id: &str,
        _params: &serde_json::Value,
        context: ActionContext,
        cancel: &CancellationToken,
    ) -> Result<ActionContext> {
        let mut already_scraped = HashSet::new();

        for fileitem in &context.fileitems {
            if cancel.is_cancelled() {
                break;
            }
            if !already_scraped.insert(fileitem.path.clone()) {
                continue;
            }
            if !matches!(self.bus.run_module(CapabilityCall::Exists { fileitem: fileitem.clone() }).await, Some(CapabilityResult::Bool(true))) {
                continue;
            }
            let cache_key = fileitem.path.clone();
            if self.runtime.check_cache(workflow_id, &cache_key).await? {
                continue;
            }

            let recognized = self
                .bus
                .run_module(CapabilityCall::RecognizeMedia {
                    title: fileitem.name.clone(),
                    subtitle: None,
                })
                .await;
            let Some(CapabilityResult::Media(media)) = recognized else {
                self.failed += 1;
                continue;
            };

            self.bus
                .run_module(CapabilityCall::ScrapeMetadata { fileitem: fileitem.clone(), media })
                .await;
            self.scraped += 1;
            self.runtime.save_cache(workflow_id, cache_key).await?;
        }

        self.runtime
            .job_done(format!("scraped {} files, {} failed", self.scraped, self.failed));
        Ok(context)
    }

    fn success(&self) -> bool {
        self.scraped > 0 || self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Capability, CapabilityCall as Call, Module};
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::models::{FileItem, FileItemKind, Media, MediaType};

    struct StubStorageAndRecognizer;
    #[async_trait::async_trait]
    impl Module for StubStorageAndRecognizer {
        fn name(&self) -> &str {
            "stub-storage"
        }
        fn capabilities(&self) -> &[Capability] {
            &[Capability::Exists, Capability::RecognizeMedia, Capability::ScrapeMetadata]
        }
        async fn invoke(&self, call: &Call) -> Result<Option<CapabilityResult>> {
            match call {
                Call::Exists { .. } => Ok(Some(CapabilityResult::Bool(true))),
                Call::RecognizeMedia { .. } => Ok(Some(CapabilityResult::Media(Media {
                    media_type: MediaType::Movie,
                    title: "Found".into(),
                    year: None,
                    tmdb_id: None,
                    douban_id: None,
                    bangumi_id: None,
                    category: None,
                    vote_average: None,
                    season: None,
                    seasons: Default::default(),
                }))),
                Call::ScrapeMetadata { .. } => Ok(Some(CapabilityResult::Bool(true))),
                _ => Ok(None),
            }
        }
    }

    fn fileitem(path: &str) -> FileItem {
        FileItem {
            storage: "local".into(),
            path: path.into(),
            kind: FileItemKind::File,
            name: path.rsplit('/').next().unwrap_or(path).into(),
            basename: path.rsplit('/').next().unwrap_or(path).into(),
            extension: None,
            size: None,
        }
    }

    #[tokio::test]
    async fn scrapes_an_existing_file_and_saves_dedup_cache() {
        let mut bus = ChainBus::new();
        bus.register("storage", Arc::new(StubStorageAndRecognizer));
        let bus = Arc::new(bus);
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = ScrapeFileAction::new("s1".into(), cache.clone(), bus);
        let mut ctx = ActionContext::new();
        ctx.fileitems = vec![fileitem("/media/movie.mkv")];
        action
            .execute("wf-1", &serde_json::json!({}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert!(action.success());
        assert!(cache.contains("wf-1", "s1", "/media/movie.mkv").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_fileitems_in_one_run_are_scraped_once() {
        let mut bus = ChainBus::new();
        bus.register("storage", Arc::new(StubStorageAndRecognizer));
        let bus = Arc::new(bus);
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = ScrapeFileAction::new("s1".into(), cache, bus);
        let mut ctx = ActionContext::new();
        ctx.fileitems = vec![fileitem("/media/movie.mkv"), fileitem("/media/movie.mkv")];
        action
            .execute("wf-1", &serde_json::json!({}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(action.scraped, 1);
    }
}
