// The capability table: every side-effecting operation an action can ask
// the bus to perform, with a typed argument and result pair.
//
// REDESIGN FLAGS (spec §9): replace dynamic attribute lookup / stringly
// dispatch with an explicit, exhaustive table so unsupported capabilities
// are a compile error at the match site, not a silent typo at runtime.

use serde_json::Value;

use crate::models::{DownloadTask, Event, FileItem, Media, Notification, Resource};

/// The finite, declared set of capabilities the bus can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Download,
    ListTorrents,
    RecognizeMedia,
    MediaExists,
    GetNoExistsInfo,
    ScrapeMetadata,
    SearchByTitle,
    SearchById,
    Browse,
    ListFiles,
    DeleteFile,
    GetFileItem,
    Exists,
    DoTransfer,
    Recommend,
    ParseRss,
    PostMessage,
    SendEvent,
    MediaserverLibrarys,
    PluginAction,
}

/// Arguments for a single capability call.
#[derive(Debug, Clone)]
pub enum CapabilityCall {
    Download {
        torrent: Resource,
        downloader: Option<String>,
        save_path: Option<String>,
        label: Option<String>,
    },
    ListTorrents {
        hashes: Vec<String>,
    },
    RecognizeMedia {
        title: String,
        subtitle: Option<String>,
    },
    MediaExists {
        media: Media,
    },
    GetNoExistsInfo {
        media: Media,
    },
    ScrapeMetadata {
        fileitem: FileItem,
        media: Media,
    },
    SearchByTitle {
        title: String,
        sites: Vec<i64>,
    },
    SearchById {
        tmdb_id: Option<u64>,
        douban_id: Option<String>,
        media_type: Option<crate::models::MediaType>,
        sites: Vec<i64>,
    },
    Browse {
        storage: String,
        path: String,
    },
    ListFiles {
        storage: String,
        path: String,
    },
    DeleteFile {
        fileitem: FileItem,
    },
    GetFileItem {
        storage: String,
        path: String,
    },
    Exists {
        fileitem: FileItem,
    },
    DoTransfer {
        fileitem: FileItem,
        background: bool,
    },
    Recommend {
        source: String,
    },
    ParseRss {
        url: String,
        proxy: Option<String>,
        timeout_secs: u64,
        headers: std::collections::HashMap<String, String>,
    },
    PostMessage {
        notification: Notification,
    },
    SendEvent {
        event: Event,
    },
    MediaserverLibrarys,
    PluginAction {
        plugin_id: String,
        action_id: String,
        params: Value,
    },
}

impl CapabilityCall {
    /// The capability this call is dispatched under.
    pub fn capability(&self) -> Capability {
        match self {
            CapabilityCall::Download { .. } => Capability::Download,
            CapabilityCall::ListTorrents { .. } => Capability::ListTorrents,
            CapabilityCall::RecognizeMedia { .. } => Capability::RecognizeMedia,
            CapabilityCall::MediaExists { .. } => Capability::MediaExists,
            CapabilityCall::GetNoExistsInfo { .. } => Capability::GetNoExistsInfo,
            CapabilityCall::ScrapeMetadata { .. } => Capability::ScrapeMetadata,
            CapabilityCall::SearchByTitle { .. } => Capability::SearchByTitle,
            CapabilityCall::SearchById { .. } => Capability::SearchById,
            CapabilityCall::Browse { .. } => Capability::Browse,
            CapabilityCall::ListFiles { .. } => Capability::ListFiles,
            CapabilityCall::DeleteFile { .. } => Capability::DeleteFile,
            CapabilityCall::GetFileItem { .. } => Capability::GetFileItem,
            CapabilityCall::Exists { .. } => Capability::Exists,
            CapabilityCall::DoTransfer { .. } => Capability::DoTransfer,
            CapabilityCall::Recommend { .. } => Capability::Recommend,
            CapabilityCall::ParseRss { .. } => Capability::ParseRss,
            CapabilityCall::PostMessage { .. } => Capability::PostMessage,
            CapabilityCall::SendEvent { .. } => Capability::SendEvent,
            CapabilityCall::MediaserverLibrarys => Capability::MediaserverLibrarys,
            CapabilityCall::PluginAction { .. } => Capability::PluginAction,
        }
    }
}

/// Results returned by a capability call. `None` from a module means "I
/// don't have an answer"; the bus keeps trying the next module.
#[derive(Debug, Clone)]
pub enum CapabilityResult {
    Download {
        download_id: String,
    },
    Torrents(Vec<DownloadTask>),
    Media(Media),
    MediaExists {
        all_present: bool,
        lacking: std::collections::HashMap<u32, Vec<u32>>,
    },
    FileItem(FileItem),
    FileItems(Vec<FileItem>),
    Resources(Vec<Resource>),
    Medias(Vec<Media>),
    Bool(bool),
    Transfer {
        ok: bool,
        error: Option<String>,
    },
    RssItems(Vec<Resource>),
    Event(Event),
    Libraries(Vec<String>),
    Plugin {
        success: bool,
        context: crate::models::ActionContext,
    },
    Deleted,
}
