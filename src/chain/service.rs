// Service Helper - joins user-configured service instances to the modules
// that implement them. See spec §4.4 "Service Helper".

use std::sync::Arc;

use super::bus::{ChainBus, Module};

/// A user-configured instance of a module, e.g. "my home qBittorrent".
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub name: String,
    pub kind: String,
    pub enabled: bool,
    pub config: serde_json::Value,
}

/// A live, configured service: the module backing it plus its persisted
/// config, ready for an action to call into.
#[derive(Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub kind: String,
    pub module: Arc<dyn Module>,
    pub config: serde_json::Value,
}

/// Joins persisted [`ServiceConfig`]s to the running modules of the matching
/// kind, yielding a [`ServiceInfo`] for every matched, enabled pair.
pub struct ServiceHelper<'a> {
    bus: &'a ChainBus,
}

impl<'a> ServiceHelper<'a> {
    pub fn new(bus: &'a ChainBus) -> Self {
        Self { bus }
    }

    /// Join `configs` against running modules, keeping only enabled configs
    /// whose module exposes an instance with a matching name.
    pub fn resolve(&self, configs: &[ServiceConfig]) -> Vec<ServiceInfo> {
        let mut services = Vec::new();
        for config in configs {
            if !config.enabled {
                continue;
            }
            for module in self.bus.modules_of_kind(&config.kind) {
                if module.get_instances().iter().any(|n| n == &config.name) {
                    services.push(ServiceInfo {
                        name: config.name.clone(),
                        kind: config.kind.clone(),
                        module: module.clone(),
                        config: config.config.clone(),
                    });
                }
            }
        }
        services
    }

    /// The single service named `name`, if configured, enabled, and backed
    /// by a running module instance.
    pub fn get_service(&self, configs: &[ServiceConfig], name: &str) -> Option<ServiceInfo> {
        self.resolve(configs).into_iter().find(|s| s.name == name)
    }

    /// All services of a given kind.
    pub fn get_services(&self, configs: &[ServiceConfig], kind: &str) -> Vec<ServiceInfo> {
        self.resolve(configs)
            .into_iter()
            .filter(|s| s.kind == kind)
            .collect()
    }
}
