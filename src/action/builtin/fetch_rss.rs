// Fetch an RSS feed and append its items to context.torrents.
// Grounded in app/actions/fetch_rss.py.

use std::collections::HashMap;
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
pub struct FetchRssParams {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub ua: Option<String>,
    /// When set, each fetched item is also run through RecognizeMedia;
    /// items that don't resolve to a media are dropped.
    #[serde(default)]
    pub match_media: bool,
    #[serde(flatten)]
    pub base: ActionParams,
}

fn default_timeout() -> u64 {
    15
}

pub struct FetchRssAction {
    runtime: ActionRuntime,
    bus: Arc<ChainBus>,
    has_error: bool,
    fetched: usize,
}

impl FetchRssAction {
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
impl Action for FetchRssAction {
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
        let params: FetchRssParams = serde_json::from_value(params.clone()).unwrap_or_default();
        let Some(url) = params.url.clone() else {
            self.runtime.job_done("no url given");
            return Ok(context);
        };

        let mut headers = HashMap::new();
        if let Some(content_type) = &params.content_type {
            headers.insert("Content-Type".to_string(), content_type.clone());
        }
        if let Some(referer) = &params.referer {
            headers.insert("Referer".to_string(), referer.clone());
        }
        if let Some(ua) = &params.ua {
            headers.insert("User-Agent".to_string(), ua.clone());
        }

        let result = self
            .bus
            .run_module(CapabilityCall::ParseRss {
                url: url.clone(),
                proxy: params.proxy.clone(),
                timeout_secs: params.timeout,
                headers,
            })
            .await;

        let items = match result {
            Some(CapabilityResult::RssItems(items)) => items,
            Some(_) | None => {
                self.has_error = true;
                self.runtime.job_done(format!("RSS request to {url} failed"));
                return Ok(context);
            }
        };

        let mut fetched = Vec::new();
        for mut item in items {
            if cancel.is_cancelled() {
                break;
            }
            if item.title.is_empty() {
                continue;
            }
            if params.match_media {
                let recognized = self
                    .bus
                    .run_module(CapabilityCall::RecognizeMedia {
                        title: item.title.clone(),
                        subtitle: item.description.clone(),
                    })
                    .await;
                match recognized {
                    Some(CapabilityResult::Media(media)) => item.media_info = Some(media),
                    _ => continue,
                }
            }
            fetched.push(item);
        }

        self.fetched = fetched.len();
        context.torrents.extend(fetched);
        self.runtime.job_done(format!("fetched {} resources", self.fetched));
        Ok(context)
    }

    fn success(&self) -> bool {
        !self.has_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{CapabilityCall as Call, Module};
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::models::Resource;

    struct StubRss;
    #[async_trait::async_trait]
    impl Module for StubRss {
        fn name(&self) -> &str {
            "stub-rss"
        }
        fn capabilities(&self) -> &[crate::chain::Capability] {
            &[crate::chain::Capability::ParseRss]
        }
        async fn invoke(&self, _call: &Call) -> Result<Option<CapabilityResult>> {
            Ok(Some(CapabilityResult::RssItems(vec![Resource {
                site: "demo".into(),
                site_name: "Demo".into(),
                title: "Show.S01E01".into(),
                description: None,
                enclosure: "magnet:?x".into(),
                page_url: None,
                size: Some(100),
                media_info: None,
                season: None,
                episodes: vec![],
                season_list: vec![],
            }])))
        }
    }

    #[tokio::test]
    async fn fetches_items_into_context_torrents() {
        let mut bus = ChainBus::new();
        bus.register("rss", Arc::new(StubRss));
        let bus = Arc::new(bus);
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = FetchRssAction::new("r1".into(), cache, bus);
        let ctx = ActionContext::new();
        let out = action
            .execute(
                "wf",
                &serde_json::json!({"url": "https://example.com/rss"}),
                ctx,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(out.torrents.len(), 1);
        assert!(action.success());
    }

    #[tokio::test]
    async fn blank_url_is_a_no_op() {
        let bus = Arc::new(ChainBus::new());
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = FetchRssAction::new("r1".into(), cache, bus);
        let ctx = ActionContext::new();
        let out = action
            .execute("wf", &serde_json::json!({}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert!(out.torrents.is_empty());
    }
}
