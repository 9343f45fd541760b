// Add every torrent in context.torrents as a download, skipping anything
// already recorded in the dedup cache. Grounded in app/actions/add_download.py.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::chain::{CapabilityCall, CapabilityResult, ChainBus};
use crate::engine::cache::DedupCacheStore;
use crate::models::{ActionContext, DownloadTask, MediaType};
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddDownloadParams {
    #[serde(default)]
    pub downloader: Option<String>,
    #[serde(default)]
    pub save_path: Option<String>,
    #[serde(default)]
    pub labels: Option<String>,
    /// Only download items missing from the library (per a
    /// `GetNoExistsInfo`/`MediaExists` check).
    #[serde(default)]
    pub only_lack: bool,
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct AddDownloadAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    added: Vec<String>,
    has_error: bool,
    failed: u32,
}

impl AddDownloadAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            added: Vec::new(),
            has_error: false,
            failed: 0,
        }
    }
}

#[async_trait::async_trait]
impl Action for AddDownloadAction {
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
        let params: AddDownloadParams = serde_json::from_value(params.clone()).unwrap_or_default();

        let torrents = std::mem::take(&mut context.torrents);
        let mut kept = Vec::new();
        for torrent in torrents {
            if cancel.is_cancelled() {
                kept.push(torrent);
                continue;
            }

            let cache_key = torrent.dedup_key();
            if self.runtime.check_cache(workflow_id, &cache_key).await? {
                kept.push(torrent);
                continue;
            }

            let media_info = match &torrent.media_info {
                Some(media) => Some(media.clone()),
                None => {
                    let recognized = self
                        .bus
                        .run_module(CapabilityCall::RecognizeMedia {
                            title: torrent.title.clone(),
                            subtitle: torrent.description.clone(),
                        })
                        .await;
                    match recognized {
                        Some(CapabilityResult::Media(media)) => Some(media),
                        _ => None,
                    }
                }
            };

            let Some(media) = media_info else {
                self.has_error = true;
                self.failed += 1;
                kept.push(torrent);
                continue;
            };

            if params.only_lack && torrent.season_list.len() > 1 {
                kept.push(torrent);
                continue;
            }

            if params.only_lack {
                let exists = self
                    .bus
                    .run_module(CapabilityCall::GetNoExistsInfo { media: media.clone() })
                    .await;
                if let Some(CapabilityResult::MediaExists { all_present, lacking }) = exists {
                    if media.media_type == MediaType::Movie && all_present {
                        kept.push(torrent);
                        continue;
                    }
                    if let Some(season) = torrent.season {
                        if let Some(missing_episodes) = lacking.get(&season) {
                            if !torrent.episodes.is_empty()
                                && torrent.episodes.iter().all(|ep| !missing_episodes.contains(ep))
                            {
                                kept.push(torrent);
                                continue;
                            }
                        }
                    }
                }
            }

            let download = self
                .bus
                .run_module(CapabilityCall::Download {
                    torrent: torrent.clone(),
                    downloader: params.downloader.clone(),
                    save_path: params.save_path.clone(),
                    label: params.labels.clone(),
                })
                .await;

            match download {
                Some(CapabilityResult::Download { download_id }) => {
                    self.added.push(download_id);
                    self.runtime.save_cache(workflow_id, cache_key).await?;
                }
                _ => {
                    self.has_error = true;
                    self.failed += 1;
                }
            }
        }
        context.torrents = kept;

        if !self.added.is_empty() {
            context.downloads.extend(self.added.iter().map(|id| DownloadTask {
                download_id: id.clone(),
                downloader: params.downloader.clone(),
                path: None,
                completed: false,
            }));
        }

        self.runtime.job_done(format!(
            "added {} download tasks, {} failed",
            self.added.len(),
            self.failed
        ));
        Ok(context)
    }

    fn success(&self) -> bool {
        !self.has_error
    }
}
