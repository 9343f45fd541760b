// Shared parameter fields every built-in action's params type carries,
// grounded in MoviePilot's `ActionParams` base class (app/actions/__init__.py)
// via app/schemas/workflow.py. spec.md's distillation drops these; they are
// restored here since they're ambient to every action, not a named feature.

use serde::{Deserialize, Serialize};

/// Looping controls common to every action's parameters.
///
/// `loop_` (renamed from `loop`, a Rust keyword) lets an action re-run
/// itself at `loop_interval` seconds until it reports done, rather than
/// running exactly once; the engine itself does not interpret these
/// fields, they're surfaced for an action's own use or a future scheduler
/// extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActionParams {
    #[serde(rename = "loop", default)]
    pub loop_: bool,
    #[serde(default)]
    pub loop_interval: u64,
}

impl Default for ActionParams {
    fn default() -> Self {
        Self {
            loop_: false,
            loop_interval: 0,
        }
    }
}

impl ActionParams {
    /// Pull just the shared loop fields out of a raw params value, ignoring
    /// whatever action-specific fields sit alongside them.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_loop_fields_default_to_disabled() {
        let params = ActionParams::from_value(&serde_json::json!({"url": "http://x"}));
        assert!(!params.loop_);
        assert_eq!(params.loop_interval, 0);
    }

    #[test]
    fn loop_fields_are_parsed_when_present() {
        let params = ActionParams::from_value(&serde_json::json!({"loop": true, "loop_interval": 30}));
        assert!(params.loop_);
        assert_eq!(params.loop_interval, 30);
    }
}
