// The 13 built-in action types, one module per MoviePilot action of the
// same name (app/actions/*.py).

pub mod add_download;
pub mod add_subscribe;
pub mod fetch_downloads;
pub mod fetch_medias;
pub mod fetch_rss;
pub mod fetch_torrents;
pub mod filter_medias;
pub mod filter_torrents;
pub mod invoke_plugin;
pub mod scrape_file;
pub mod send_event;
pub mod send_message;
pub mod transfer_file;

use crate::action::{ActionMetadata, ActionRegistry};

/// Register every built-in action type under its MoviePilot-derived tag.
pub fn register_all(registry: &mut ActionRegistry) {
    registry.register(
        ActionMetadata {
            type_tag: "FetchRss".into(),
            name: "Fetch RSS resources".into(),
            description: "Subscribe to an RSS feed and collect its resources".into(),
            default_params: serde_json::to_value(fetch_rss::FetchRssParams::default()).unwrap(),
        },
        |id, cache, bus| Box::new(fetch_rss::FetchRssAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "FetchTorrents".into(),
            name: "Search site resources".into(),
            description: "Search configured sites for torrent resources".into(),
            default_params: serde_json::json!({}),
        },
        |id, cache, bus| Box::new(fetch_torrents::FetchTorrentsAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "FetchMedias".into(),
            name: "Fetch media data".into(),
            description: "Fetch ranking/recommendation media lists".into(),
            default_params: serde_json::to_value(fetch_medias::FetchMediasParams::default()).unwrap(),
        },
        |id, cache, bus| Box::new(fetch_medias::FetchMediasAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "FilterTorrents".into(),
            name: "Filter resources".into(),
            description: "Filter the resource list data".into(),
            default_params: serde_json::to_value(filter_torrents::FilterTorrentsParams::default()).unwrap(),
        },
        |id, cache, _bus| Box::new(filter_torrents::FilterTorrentsAction::new(id, cache)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "FilterMedias".into(),
            name: "Filter media data".into(),
            description: "Filter the media data list".into(),
            default_params: serde_json::to_value(filter_medias::FilterMediasParams::default()).unwrap(),
        },
        |id, cache, _bus| Box::new(filter_medias::FilterMediasAction::new(id, cache)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "AddDownload".into(),
            name: "Add download".into(),
            description: "Add download tasks from the resource list".into(),
            default_params: serde_json::to_value(add_download::AddDownloadParams::default()).unwrap(),
        },
        |id, cache, bus| Box::new(add_download::AddDownloadAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "AddSubscribe".into(),
            name: "Add subscription".into(),
            description: "Add subscriptions from the media list".into(),
            default_params: serde_json::json!({}),
        },
        |id, cache, _bus| Box::new(add_subscribe::AddSubscribeAction::new(id, cache)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "FetchDownloads".into(),
            name: "Fetch download tasks".into(),
            description: "Refresh download task status".into(),
            default_params: serde_json::json!({}),
        },
        |id, cache, bus| Box::new(fetch_downloads::FetchDownloadsAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "TransferFile".into(),
            name: "Transfer file".into(),
            description: "Organize queued files into the library".into(),
            default_params: serde_json::to_value(transfer_file::TransferFileParams::default()).unwrap(),
        },
        |id, cache, bus| Box::new(transfer_file::TransferFileAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "ScrapeFile".into(),
            name: "Scrape file".into(),
            description: "Scrape media metadata and artwork".into(),
            default_params: serde_json::json!({}),
        },
        |id, cache, bus| Box::new(scrape_file::ScrapeFileAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "SendMessage".into(),
            name: "Send message".into(),
            description: "Send every queued message".into(),
            default_params: serde_json::to_value(send_message::SendMessageParams::default()).unwrap(),
        },
        |id, cache, bus| Box::new(send_message::SendMessageAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "SendEvent".into(),
            name: "Send event".into(),
            description: "Dispatch a specific internal event".into(),
            default_params: serde_json::json!({}),
        },
        |id, cache, bus| Box::new(send_event::SendEventAction::new(id, cache, bus)),
    );
    registry.register(
        ActionMetadata {
            type_tag: "InvokePlugin".into(),
            name: "Invoke plugin".into(),
            description: "Invoke an action provided by a plugin".into(),
            default_params: serde_json::to_value(invoke_plugin::InvokePluginParams::default()).unwrap(),
        },
        |id, cache, bus| Box::new(invoke_plugin::InvokePluginAction::new(id, cache, bus)),
    );
}
