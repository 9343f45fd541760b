// Search sites for torrents, either by keyword or against context.medias.
// Grounded in app/actions/fetch_torrents.py. The original's random 5-30s
// sleep between per-media searches is a rate-limiting courtesy to site
// scrapers; kept as a configurable delay rather than a hardcoded sleep so
// tests don't pay it.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::chain::{CapabilityCall, CapabilityResult, ChainBus};
use crate::engine::cache::DedupCacheStore;
use crate::models::{ActionContext, MediaType};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Keyword,
    Media,
}

impl Default for SearchType {
    fn default() -> Self {
        SearchType::Keyword
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchTorrentsParams {
    #[serde(default)]
    pub search_type: SearchType,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub sites: Vec<i64>,
    #[serde(default)]
    pub match_media: bool,
    /// Pause between per-media searches, in milliseconds; 0 disables it.
    /// Grounded in the original's `random.randint(5, 30)` second sleep
    /// between site searches (app/actions/fetch_torrents.py), expressed as
    /// a fixed, configurable delay rather than a hardcoded sleep.
    #[serde(default)]
    pub between_searches_ms: u64,
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct FetchTorrentsAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    fetched: usize,
}

impl FetchTorrentsAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>, bus: Arc<ChainBus>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            bus,
            fetched: 0,
        }
    }
}

#[async_trait::async_trait]
impl Action for FetchTorrentsAction {
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
        let params: FetchTorrentsParams = serde_json::from_value(params.clone()).unwrap_or_default();
        let mut found = Vec::new();

        match params.search_type {
            SearchType::Keyword => {
                let Some(name) = params.name.clone() else {
                    self.runtime.job_done("no search name given");
                    return Ok(context);
                };
                let result = self
                    .bus
                    .run_module(CapabilityCall::SearchByTitle { title: name, sites: params.sites.clone() })
                    .await;
                if let Some(CapabilityResult::Resources(resources)) = result {
                    for mut resource in resources {
                        if cancel.is_cancelled() {
                            break;
                        }
                        if let Some(year) = &params.year {
                            if resource.media_info.as_ref().and_then(|m| m.year.as_ref()) != Some(year) {
                                continue;
                            }
                        }
                        if let Some(media_type) = params.media_type {
                            if let Some(media) = &resource.media_info {
                                if media.media_type != media_type {
                                    continue;
                                }
                            }
                        }
                        if let Some(season) = params.season {
                            if resource.season != Some(season) {
                                continue;
                            }
                        }
                        if params.match_media {
                            let recognized = self
                                .bus
                                .run_module(CapabilityCall::RecognizeMedia {
                                    title: resource.title.clone(),
                                    subtitle: resource.description.clone(),
                                })
                                .await;
                            match recognized {
                                Some(CapabilityResult::Media(media)) => resource.media_info = Some(media),
                                _ => continue,
                            }
                        }
                        found.push(resource);
                    }
                }
            }
            SearchType::Media => {
                for media in context.medias.clone() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let result = self
                        .bus
                        .run_module(CapabilityCall::SearchById {
                            tmdb_id: media.tmdb_id,
                            douban_id: media.douban_id.clone(),
                            media_type: Some(media.media_type),
                            sites: params.sites.clone(),
                        })
                        .await;
                    if let Some(CapabilityResult::Resources(resources)) = result {
                        found.extend(resources);
                    }
                    if params.between_searches_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(params.between_searches_ms)).await;
                    }
                }
            }
        }

        self.fetched = found.len();
        context.torrents.extend(found);
        self.runtime.job_done(format!("fetched {} resources", self.fetched));
        Ok(context)
    }

    fn success(&self) -> bool {
        self.runtime.done()
    }
}
