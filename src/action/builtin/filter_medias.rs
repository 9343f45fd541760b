// Filter context.medias by type/category/vote/year.
// Grounded in app/actions/filter_medias.py.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::action::params::ActionParams;
use crate::action::runtime::ActionRuntime;
use crate::action::Action;
use crate::engine::cache::DedupCacheStore;
use crate::models::{ActionContext, MediaType};
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterMediasParams {
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vote: Option<f32>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(flatten)]
    pub base: ActionParams,
}

pub struct FilterMediasAction {
    runtime: ActionRuntime,
    kept: usize,
}

impl FilterMediasAction {
    pub fn new(action_id: String, cache: Arc<dyn DedupCacheStore>) -> Self {
        Self {
            runtime: ActionRuntime::new(action_id, cache),
            kept: 0,
        }
    }
}

#[async_trait::async_trait]
impl Action for FilterMediasAction {
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
        let params: FilterMediasParams = serde_json::from_value(params.clone()).unwrap_or_default();

        let kept: Vec<_> = context
            .medias
            .into_iter()
            .filter(|media| {
                if let Some(media_type) = params.media_type {
                    if media.media_type != media_type {
                        return false;
                    }
                }
                if let Some(category) = &params.category {
                    if media.category.as_deref() != Some(category.as_str()) {
                        return false;
                    }
                }
                if let Some(min_vote) = params.vote {
                    if media.vote_average.unwrap_or(0.0) < min_vote {
                        return false;
                    }
                }
                if let Some(year) = &params.year {
                    if media.year.as_deref() != Some(year.as_str()) {
                        return false;
                    }
                }
                true
            })
            .collect();

        self.kept = kept.len();
        context.medias = kept;
        self.runtime.job_done(format!("{} medias kept", self.kept));
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
    use crate::models::Media;

    fn movie(title: &str, year: &str) -> Media {
        Media {
            media_type: MediaType::Movie,
            title: title.into(),
            year: Some(year.into()),
            tmdb_id: None,
            douban_id: None,
            bangumi_id: None,
            category: None,
            vote_average: None,
            season: None,
            seasons: Default::default(),
        }
    }

    #[tokio::test]
    async fn year_filter_drops_non_matching_medias() {
        let cache: Arc<dyn DedupCacheStore> = Arc::new(InMemoryDedupCacheStore::new());
        let mut action = FilterMediasAction::new("f1".into(), cache);
        let mut ctx = ActionContext::new();
        ctx.medias = vec![movie("A", "2020"), movie("B", "2024")];
        let out = action
            .execute("wf", &serde_json::json!({"year": "2024"}), ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.medias.len(), 1);
        assert_eq!(out.medias[0].title, "B");
        assert!(action.success());
    }
}
