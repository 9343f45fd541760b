// Core domain models for the workflow engine
// Generic, collaborator-agnostic data structures shared by every action.

//! # Domain Models Module
//!
//! Generic, language-agnostic data structures that form the foundation of
//! the workflow engine: the persistent [`Workflow`] definition, and the
//! value objects threaded through a run via [`ActionContext`].

pub mod context;
pub mod value;
pub mod workflow;

pub use context::ActionContext;
pub use value::{
    DownloadTask, Event, FileItem, FileItemKind, Media, MediaType, Notification, Resource, Site,
    Subscribe,
};
pub use workflow::{ActionDefinition, ActionFlow, Workflow, WorkflowState};
