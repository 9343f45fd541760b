// Filter context.torrents by include/exclude title patterns and a size
// range. Grounded in app/actions/filter_torrents.py; the original delegates
// quality/resolution/effect/rule-group filtering to `TorrentHelper` and a
// rule-group chain, both external collaborators out of scope here (Module
// is the only seam, per SPEC_FULL §6) — this keeps the title/size filters
// the original also applies directly, and drops the rule-group dispatch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::engine::cache::DedupCacheStore;
use crate::models::ActionContext;
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterTorrentsParams {
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub exclude: Option<String>,
    /// `"min-max"` in MB; either side may be blank (e.g. `"5-"`, `"-20"`).
    #[serde(default)]
    pub size: Option<String>,
    #[serde(flatten)]
    pub base: ActionParams,
}

impl FilterTorrentsParams {
    fn size_range_mb(&self) -> (Option<u64>, Option<u64>) {
        let Some(spec) = &self.size else {
            return (None, None);
        };
        let Some((min, max)) = spec.split_once('-') else {
            return (None, None);
        };
        (min.trim().parse().ok(), max.trim().parse().ok())
    }
}

pub struct FilterTorrentsAction {
    runtime: ActionRuntime,
    kept: usize,
}

impl FilterTorrentsAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            kept: 0,
        }
    }
}

#[async_trait::async_trait]
impl Action for FilterTorrentsAction {
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
        let params: FilterTorrentsParams = serde_json::from_value(params.clone()).unwrap_or_default();
        let (min_mb, max_mb) = params.size_range_mb();

        let kept: Vec<_> = context
            .torrents
            .into_iter()
            .filter(|torrent| {
                if let Some(include) = &params.include {
                    if !include.is_empty() && !torrent.title.contains(include.as_str()) {
                        return false;
                    }
                }
                if let Some(exclude) = &params.exclude {
                    if !exclude.is_empty() && torrent.title.contains(exclude.as_str()) {
                        return false;
                    }
                }
                let size_mb = torrent.size.map(|bytes| bytes / 1_000_000);
                if let Some(min_mb) = min_mb {
                    if size_mb.map_or(false, |mb| mb < min_mb) {
                        return false;
                    }
                }
                if let Some(max_mb) = max_mb {
                    if size_mb.map_or(false, |mb| mb > max_mb) {
                        return false;
                    }
                }
                true
            })
            .collect();

        self.kept = kept.len();
        context.torrents = kept;
        self.runtime.job_done(format!("{} torrents kept", self.kept));
        Ok(context)
    }

    fn success(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cache::InMemoryDedupCacheStore;
    use crate::models::Resource;

    fn torrent(title: &str, size: u64) -> Resource {
        Resource {
            site: "site".into(),
            site_name: "Site".into(),
            title: title.into(),
            description: None,
            enclosure: "magnet:?x".into(),
            page_url: None,
            size: Some(size),
            media_info: None,
            season: None,
            episodes: vec![],
            season_list: vec![],
        }
    }

    #[tokio::test]
    async fn include_and_exclude_filters_apply() {
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = FilterTorrentsAction::new("f1".into(), cache);
        let mut ctx = ActionContext::new();
        ctx.torrents = vec![
            torrent("Movie.2024.1080p", 2_000_000_000),
            torrent("Movie.2024.CAM", 1_000_000_000),
        ];
        let out = action
            .execute(
                "wf",
                &serde_json::json!({"include": "1080p", "exclude": "CAM"}),
                ctx,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(out.torrents.len(), 1);
        assert!(out.torrents[0].title.contains("1080p"));
    }

    #[tokio::test]
    async fn size_range_filters_by_megabytes() {
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = FilterTorrentsAction::new("f1".into(), cache);
        let mut ctx = ActionContext::new();
        ctx.torrents = vec![torrent("Small", 1_000_000), torrent("Big", 5_000_000_000)];
        let out = action
            .execute("wf", &serde_json::json!({"size": "1000-"}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.torrents.len(), 1);
        assert_eq!(out.torrents[0].title, "Big");
    }
}
