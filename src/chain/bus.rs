// Capability Bus (Chain dispatch) - a polymorphic dispatcher over ordered
// capability providers ("modules"). See spec §4.4.

//! Actions must stay agnostic to which concrete downloader / media server /
//! notifier is installed. The bus gives them capability-based polymorphism
//! without knowing module identities: given a capability call, it iterates
//! running modules in registration order and returns the first non-`None`
//! result. A module that doesn't implement the called capability is skipped
//! silently; a module whose `invoke` returns `Err` is logged and treated as
//! `None`, exactly like a module that had nothing to offer.

use std::sync::Arc;

use tracing::warn;

use crate::Result;

use super::capability::{Capability, CapabilityCall, CapabilityResult};

/// A capability provider. Downloaders, media servers, notifiers, storage
/// backends, recommendation feeds and site scrapers are all modules; the
/// engine never distinguishes between them beyond the capabilities they
/// declare.
#[async_trait::async_trait]
pub trait Module: Send + Sync {
    /// Stable identifier, e.g. `"qbittorrent"`, `"plex"`, `"telegram"`.
    fn name(&self) -> &str;

    /// Capabilities this module implements. The bus only calls `invoke` for
    /// calls whose capability appears here.
    fn capabilities(&self) -> &[Capability];

    /// Perform a capability call. Returning `Ok(None)` means "no answer for
    /// this particular input", which is distinct from `Err` (an actual
    /// failure) but both cause the bus to move to the next module.
    async fn invoke(&self, call: &CapabilityCall) -> Result<Option<CapabilityResult>>;

    /// Idempotent startup hook, called once by the module registry.
    async fn init_module(&self) -> Result<()> {
        Ok(())
    }

    /// Release sockets, background tasks, and external sessions.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    /// Reachability probe; used on demand, never in a hot path.
    async fn test(&self) -> (bool, String) {
        (true, "ok".to_string())
    }

    /// For modules fronting multiple configured services (e.g. two
    /// downloaders), the configured instance names this module currently
    /// serves.
    fn get_instances(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The ordered list of running modules actions dispatch capability calls
/// against.
///
/// This also plays the role of the Module Registry (spec §2 component 2):
/// modules are registered with a `kind` tag (e.g. `"downloader"`,
/// `"mediaserver"`) so the Service Helper can ask "give me all running
/// modules of kind X" without the bus needing a second, parallel index.
#[derive(Default)]
pub struct ChainBus {
    modules: Vec<(String, Arc<dyn Module>)>,
}

impl ChainBus {
    pub fn new() -> Self {
        Self { modules: Vec::new() }
    }

    /// Register a module under a kind tag. Registration order is dispatch
    /// order.
    pub fn register(&mut self, kind: impl Into<String>, module: Arc<dyn Module>) {
        self.modules.push((kind.into(), module));
    }

    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.iter().map(|(_, m)| m)
    }

    /// All running modules registered under `kind`, in registration order.
    pub fn modules_of_kind(&self, kind: &str) -> Vec<Arc<dyn Module>> {
        self.modules
            .iter()
            .filter(|(k, _)| k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Run every `init_module` hook. Idempotent per module.
    pub async fn init_all(&self) -> Result<()> {
        for (_, module) in &self.modules {
            module.init_module().await?;
        }
        Ok(())
    }

    /// Run every `stop` hook, releasing module resources.
    pub async fn stop_all(&self) -> Result<()> {
        for (_, module) in &self.modules {
            module.stop().await?;
        }
        Ok(())
    }

    /// Dispatch `call` to the first module that both declares its
    /// capability and returns a non-`None` result. Module exceptions are
    /// caught, logged with module name + capability, and treated as `None`
    /// so the next module still gets a chance.
    pub async fn run_module(&self, call: CapabilityCall) -> Option<CapabilityResult> {
        let capability = call.capability();
        for (_, module) in &self.modules {
            if !module.capabilities().contains(&capability) {
                continue;
            }
            match module.invoke(&call).await {
                Ok(Some(result)) => return Some(result),
                Ok(None) => continue,
                Err(err) => {
                    warn!(
                        module = module.name(),
                        capability = ?capability,
                        error = %err,
                        "module raised while handling capability call"
                    );
                    continue;
                }
            }
        }
        None
    }
}
