// Workflow Engine
// A typed action pipeline with shared context and capability dispatch.

//! # Workflow Engine
//!
//! This crate implements the hard, load-bearing core of a media automation
//! orchestrator: a workflow scheduler and executor that drives a pipeline of
//! typed [`action::Action`]s over a shared [`models::ActionContext`], and the
//! [`chain::ChainBus`] capability dispatcher those actions delegate to for
//! side effects.
//!
//! Concrete collaborators — downloaders, media servers, site scrapers,
//! notification transports — are not implemented here. The engine only
//! depends on the narrow [`chain::Module`] trait and the fixed
//! [`chain::Capability`] table; anything beyond that is out of scope.
//!
//! ## Module map
//!
//! - [`models`] — `Workflow`, `ActionDefinition`, `ActionContext` and the
//!   value objects (`Resource`, `Media`, `FileItem`, ...) that flow through a
//!   run.
//! - [`action`] — the `Action` trait, its registry, and the built-in action
//!   implementations.
//! - [`chain`] — the capability bus, module registry and service helper.
//! - [`engine`] — the dedup cache store, workflow storage, flow linearizer,
//!   executor and scheduler.

pub mod action;
pub mod chain;
pub mod engine;
pub mod models;

pub use models::{ActionContext, ActionDefinition, ActionFlow, Workflow, WorkflowState};

use thiserror::Error;

/// Errors produced by the workflow engine.
///
/// Variants mirror the error taxonomy the engine is specified against:
/// configuration problems fail a workflow outright, capability and transient
/// errors are absorbed per-item by actions, `NotFound` is often not an error
/// at all, `Cancelled` is cooperative shutdown, and `Fatal` is an unhandled
/// exception inside an action that the executor must stop the run for.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Unresolved action type, unparseable timer, malformed `flows`, or a
    /// missing required parameter. Always fails the workflow (`state=F`).
    #[error("config error: {0}")]
    Config(String),

    /// No running module implements a capability a capability call required.
    #[error("capability unavailable: {0:?}")]
    CapabilityUnavailable(chain::Capability),

    /// Network timeout, HTTP 5xx, downloader unreachable, etc. Never aborts
    /// the pipeline by itself.
    #[error("transient external error: {0}")]
    TransientExternal(String),

    /// A required lookup (e.g. media recognition for `AddDownload`) came up
    /// empty.
    #[error("not found: {0}")]
    NotFound(String),

    /// Cooperative stop observed mid-run.
    #[error("cancelled")]
    Cancelled,

    /// Unexpected exception inside an action. Stops the run.
    #[error("fatal error: {0}")]
    Fatal(String),

    /// Storage backend failure (propagated from a `WorkflowStorage` or
    /// `DedupCacheStore` implementation).
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// (De)serialization failure for parameters, context, or persisted
    /// workflow state.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-wide result alias, the way the teacher aliases its own error type.
pub type Result<T> = std::result::Result<T, EngineError>;
