//! # Kindred Framework
//!
//! Building blocks for record stores whose kinds share behaviour through
//! **mixins**: a typed reference field that can point at a record of any kind
//! implementing a mixin, and a signal dispatcher that lets independent code
//! react to, or surround, record lifecycle operations.
//!
//! ## Architecture Overview
//!
//! 1. **Schema layer**: [`KindDef`] declarations are collected by a
//!    [`RegistryBuilder`] and built into a read-only [`Registry`]. Building
//!    resolves inheritance, records which kinds implement which mixin, checks
//!    every [`TypedReference`] and synthesizes its mirrored fields.
//! 2. **Hook layer**: a [`Dispatcher`] holds [`Receiver`]s (run before or
//!    after an operation) and [`Wrapper`]s (run around it, and may veto it).
//! 3. **Engine layer**: the [`Store`] owns the records and runs every
//!    operation as a transaction, firing signals as it goes.
//! 4. **Runtime layer**: the [`StoreActor`] serves a `Store` from a tokio
//!    task; [`StoreClient`] and per-kind [`KindClient`]s are the async
//!    interface.
//!
//! ## Mirrored Fields
//!
//! A delegating typed reference copies every field of its mixin onto the
//! owning kind. Reading a mirrored field reads the referenced record,
//! writing it writes the referenced record, and searching on it searches
//! through the reference:
//!
//! ```rust
//! use kindred_framework::{values, Dispatcher, Field, KindDef, Predicate, Registry, Store, TypedReference, Value, RecordRef};
//! use std::sync::Arc;
//!
//! let mut builder = Registry::builder();
//! builder
//!     .register(
//!         KindDef::new("example.mixin")
//!             .abstract_kind()
//!             .field(Field::char("test").with_default("Hello")),
//!     )
//!     .register(KindDef::new("test.model1").inherits("example.mixin"))
//!     .register(KindDef::new("test.model").field(Field::typed_reference(
//!         "typed_ref",
//!         TypedReference::new("example.mixin").delegate(),
//!     )));
//! let registry = Arc::new(builder.build().unwrap());
//! let mut store = Store::new(registry, Arc::new(Dispatcher::new()));
//!
//! let m1 = store.create("test.model1", values! {}).unwrap();
//! let t = store
//!     .create("test.model", values! { "typed_ref" => RecordRef::new("test.model1", m1) })
//!     .unwrap();
//! assert_eq!(store.read("test.model", t).unwrap().get("test"), &Value::from("Hello"));
//!
//! store.write("test.model", &[t], values! { "test" => "Hi" }).unwrap();
//! assert_eq!(store.read("test.model1", m1).unwrap().get("test"), &Value::from("Hi"));
//!
//! let found = store
//!     .search("test.model", &[Predicate::parse("test", "=", "Hi").unwrap()])
//!     .unwrap();
//! assert_eq!(found.ids(), vec![t]);
//! ```
//!
//! ## Error Handling
//!
//! Schema problems surface once, as a [`SetupError`], when the registry is
//! built or a snapshot is loaded. Everything after that returns
//! [`FrameworkError`]; a failing receiver or wrapper aborts the operation
//! and rolls it back.
//!
//! ## Observability
//!
//! See the [`tracing`](crate::tracing) module.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod config;
pub mod domain;
pub mod error;
pub mod field;
pub mod kind;
pub mod message;
pub mod record;
pub mod registry;
pub mod signals;
pub mod store;
pub mod tracing;
pub mod typed_reference;
pub mod value;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use client_trait::KindClient;
pub use config::StoreConfig;
pub use domain::{Domain, Operator, Predicate};
pub use error::{ConfigError, FrameworkError, HookError, SetupError};
pub use field::{ComputeRule, Field, FieldType, InverseRule, MirrorRules, SearchRule};
pub use kind::{Kind, KindDef};
pub use message::{Response, StoreRequest};
pub use record::{Record, RecordId, RecordSet, TakeOne, Values};
pub use registry::{Registry, RegistryBuilder};
pub use signals::{
    Dispatcher, Hook, Outcome, Proceed, Receiver, Signal, SignalEvent, Wrapper, WrapperSignal,
};
pub use store::{Snapshot, Store};
pub use typed_reference::{mixin_selection, Selection, TypedReference};
pub use value::{RecordRef, Value};
