// ActionContext - the mutable data bag threaded through one workflow run.

use serde::{Deserialize, Serialize};

use super::value::{DownloadTask, Event, FileItem, Media, Notification, Resource, Site, Subscribe};

/// Shared, serialisable data threaded through every action of a run.
///
/// Constructed empty at run start, passed by value-reference through each
/// action in order, and discarded at run end — it is never persisted across
/// runs. Sequences are append-only unless an action's contract explicitly
/// rewrites or drains them (see the per-action table in the action module);
/// entries are plain value objects so actions that iterate-and-remove (e.g.
/// `SendEvent`) can safely clone before mutating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    pub torrents: Vec<Resource>,
    pub medias: Vec<Media>,
    pub fileitems: Vec<FileItem>,
    pub downloads: Vec<DownloadTask>,
    pub sites: Vec<Site>,
    pub subscribes: Vec<Subscribe>,
    pub messages: Vec<Notification>,
    pub events: Vec<Event>,
    pub content: String,
}

impl ActionContext {
    /// An empty context, as constructed at the start of every run.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_empty() {
        let ctx = ActionContext::new();
        assert!(ctx.torrents.is_empty());
        assert!(ctx.medias.is_empty());
        assert!(ctx.fileitems.is_empty());
        assert!(ctx.downloads.is_empty());
        assert!(ctx.sites.is_empty());
        assert!(ctx.subscribes.is_empty());
        assert!(ctx.messages.is_empty());
        assert!(ctx.events.is_empty());
        assert_eq!(ctx.content, "");
    }
}
