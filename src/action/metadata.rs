// Static, data-only descriptor for a registered action type.
//
// Returned by an `ActionFactory` without constructing an action instance
// (§4.2 "data-only descriptor returned by the factory" — the teacher's
// `WorkflowDefinitionInput`/`TokenCreateInput` GraphQL input types are the
// nearest precedent for a plain descriptor struct separate from the live
// domain object).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// Registered type tag, e.g. `"FetchRss"`.
    pub type_tag: String,
    pub name: String,
    pub description: String,
    /// Default parameter values a UI can pre-fill a new action instance with.
    pub default_params: serde_json::Value,
}
