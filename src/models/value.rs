// Value objects carried through an ActionContext.
//
// All of these are immutable-after-construction, cheaply cloneable data:
// the engine only cares about the identity fields actions read, not about
// how a concrete downloader/media-server/site integration fills them in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Movie or TV episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Movie,
    #[serde(rename = "TV")]
    Tv,
}

/// Minimal identity fields for a torrent/site resource.
///
/// `title`/`site` are what `AddDownload`'s dedup fingerprint is built from
/// (`"{site}-{title}"`); `meta_info`/`media_info` are populated lazily by
/// recognition capabilities as an action needs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub site: String,
    pub site_name: String,
    pub title: String,
    pub description: Option<String>,
    pub enclosure: String,
    pub page_url: Option<String>,
    pub size: Option<u64>,
    /// Populated once a recognition capability has run against this item.
    pub media_info: Option<Media>,
    /// Parsed season/episode hints extracted from the raw title, independent
    /// of full media recognition.
    pub season: Option<u32>,
    pub episodes: Vec<u32>,
    /// Every season number this torrent spans, when the title covers more
    /// than one (a season pack or a full-series batch). Empty for
    /// single-season/movie torrents; `AddDownload`'s `only_lack` path skips
    /// anything with more than one entry here.
    #[serde(default)]
    pub season_list: Vec<u32>,
}

impl Resource {
    /// Fingerprint used by `AddDownload`'s dedup cache: `"{site}-{title}"`.
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.site, self.title)
    }
}

/// A recognized movie or TV show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    pub year: Option<String>,
    pub tmdb_id: Option<u64>,
    pub douban_id: Option<String>,
    pub bangumi_id: Option<u64>,
    pub category: Option<String>,
    pub vote_average: Option<f32>,
    /// Season currently in view, if this `Media` represents one season of a
    /// TV show rather than the show as a whole.
    pub season: Option<u32>,
    /// `season number -> episode numbers already in the library`, as reported
    /// by a `media_exists`/`get_no_exists_info` capability call.
    pub seasons: HashMap<u32, Vec<u32>>,
}

/// File or directory reachable through a storage capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileItemKind {
    File,
    Dir,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileItem {
    pub storage: String,
    pub path: String,
    pub kind: FileItemKind,
    pub name: String,
    pub basename: String,
    pub extension: Option<String>,
    pub size: Option<u64>,
}

/// A download handed off to a downloader module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    pub download_id: String,
    pub downloader: Option<String>,
    pub path: Option<String>,
    pub completed: bool,
}

/// A configured torrent/indexer site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub enabled: bool,
}

/// A user subscription to a media item (movie, or a TV show/season).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscribe {
    pub id: i64,
    pub media: Media,
}

/// A message queued for delivery through a notifier module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
    pub source: Vec<String>,
    pub userid: Option<String>,
}

/// An internal event queued for dispatch through `send_event`.
///
/// `SendEvent` sorts by `priority` descending (ties keep insertion order)
/// before dispatching, per the engine's one reordering exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    pub data: serde_json::Value,
    pub priority: i32,
}
