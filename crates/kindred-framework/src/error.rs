//! # Framework Errors
//!
//! This module defines the error types used throughout the framework. They are
//! split by the phase in which they can happen:
//!
//! - [`SetupError`]: the load phase (registering kinds, building the registry,
//!   loading a persisted snapshot). These abort module loading.
//! - [`FrameworkError`]: the runtime phase (store operations, actor plumbing,
//!   receivers and wrappers).
//! - [`ConfigError`]: reading a [`StoreConfig`](crate::config::StoreConfig).

use crate::record::RecordId;
use crate::signals::{Hook, WrapperSignal};

/// Error type returned by receivers and wrappers.
///
/// Hooks are user code, so they may fail with anything. A `FrameworkError`
/// boxed into a `HookError` is unboxed again by the dispatcher.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Errors detected while building the schema.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SetupError {
    #[error("Kind registered twice: {0}")]
    DuplicateKind(String),
    #[error("Field {field} declared twice on {kind}")]
    DuplicateField { kind: String, field: String },
    #[error("Unknown parent {parent} for {kind}")]
    UnknownParent { kind: String, parent: String },
    #[error("Inheritance cycle through {0}")]
    InheritanceCycle(String),
    #[error("Unknown mixin {mixin} for {kind}.{field}")]
    UnknownMixin {
        kind: String,
        field: String,
        mixin: String,
    },
    #[error("Wrong value for {kind}.{field}: {value:?}")]
    InvalidSelection {
        kind: String,
        field: String,
        value: String,
    },
    #[error("Unknown kind in snapshot: {0}")]
    UnknownKind(String),
    #[error("Malformed snapshot: {0}")]
    Snapshot(String),
}

/// Errors that can occur while operating on records.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Record not found: {kind}({id})")]
    NotFound { kind: String, id: RecordId },
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
    #[error("Unknown field {field} on {kind}")]
    UnknownField { kind: String, field: String },
    #[error("No record ids left for {0}")]
    IdsExhausted(String),
    #[error("Abstract kind {0} cannot hold records")]
    AbstractKind(String),
    #[error("Field {kind}.{field} is read-only")]
    ReadonlyField { kind: String, field: String },
    #[error("Invalid value for {kind}.{field}: {reason}")]
    InvalidValue {
        kind: String,
        field: String,
        reason: String,
    },
    #[error("Invalid reference for {kind}.{field}: {target}")]
    InvalidReference {
        kind: String,
        field: String,
        target: String,
    },
    #[error("Cannot write {kind}.{field} on {kind}({id}): {reference} is not set")]
    MissingReference {
        kind: String,
        id: RecordId,
        field: String,
        reference: String,
    },
    #[error("Search on {kind}.{field} is not supported")]
    UnsupportedSearch { kind: String, field: String },
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Expected a single {kind} record, got {count}")]
    NotSingleton { kind: String, count: usize },
    #[error("Index {index} out of range for {count} {kind} records")]
    IndexOutOfRange {
        kind: String,
        index: usize,
        count: usize,
    },
    #[error("{signal} for {sender} was vetoed")]
    Vetoed { signal: WrapperSignal, sender: String },
    #[error("{hook} hook for {sender} failed: {source}")]
    Hook {
        hook: Hook,
        sender: String,
        #[source]
        source: HookError,
    },
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("Malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
