// Chain dispatch layer: capability table, the bus that dispatches against
// it, and the service helper that joins configured instances to modules.

pub mod bus;
pub mod capability;
pub mod service;

pub use bus::{ChainBus, Module};
pub use capability::{Capability, CapabilityCall, CapabilityResult};
pub use service::{ServiceConfig, ServiceHelper, ServiceInfo};
