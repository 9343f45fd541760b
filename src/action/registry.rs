// Action Registry - resolves a workflow's `type_tag` into a fresh Action
// instance, and lists registered types as plain metadata without
// constructing them.
//
// Grounded in the teacher's `InMemoryStorage` registration style (a single
// `Arc`-shared struct guarding a `HashMap`), but keyed by a factory closure
// rather than a stored value: constructing a fresh `Box<dyn Action>` per
// call is the fix for §4.2's "class-attribute mutability trap" (no action
// instance, and therefore no per-run state, is ever shared across runs).

use std::collections::HashMap;
use std::sync::Arc;

use crate::action::{Action, ActionMetadata};
use crate::chain::ChainBus;
use crate::engine::cache::DedupCacheStore;
use crate::{EngineError, Result};

type Factory =
    Arc<dyn Fn(String, Arc<dyn DedupCacheStore>, Arc<ChainBus>) -> Box<dyn Action> + Send + Sync>;

struct Registration {
    metadata: ActionMetadata,
    factory: Factory,
}

#[derive(Default)]
pub struct ActionRegistry {
    entries: HashMap<String, Registration>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action type under `type_tag`. `factory` takes the
    /// action's instance id (from the workflow's `ActionDefinition::id`)
    /// and the shared dedup cache, and returns a brand-new instance.
    pub fn register(
        &mut self,
        metadata: ActionMetadata,
        factory: impl Fn(String, Arc<dyn DedupCacheStore>, Arc<ChainBus>) -> Box<dyn Action>
            + Send
            + Sync
            + 'static,
    ) {
        let type_tag = metadata.type_tag.clone();
        self.entries.insert(
            type_tag,
            Registration {
                metadata,
                factory: Arc::new(factory),
            },
        );
    }

    /// Metadata for every registered action type, without constructing any
    /// of them.
    pub fn list(&self) -> Vec<ActionMetadata> {
        self.entries.values().map(|r| r.metadata.clone()).collect()
    }

    /// Construct a fresh instance of `type_tag` bound to `action_id` and
    /// `cache`. Errors if `type_tag` isn't registered.
    pub fn resolve(
        &self,
        type_tag: &str,
        action_id: impl Into<String>,
        cache: Arc<dyn DedupCacheStore>,
        bus: Arc<ChainBus>,
    ) -> Result<Box<dyn Action>> {
        let registration = self
            .entries
            .get(type_tag)
            .ok_or_else(|| EngineError::Config(format!("unknown action type '{type_tag}'")))?;
        Ok((registration.factory)(action_id.into(), cache, bus))
    }
}
