//! # Store Actor
//!
//! The [`StoreActor`] owns a [`Store`] inside a tokio task and processes
//! [`StoreRequest`]s one at a time. Receivers and wrappers therefore always run
//! synchronously, inside the operation that fired them, and never see another
//! operation half-applied.
//!
//! ```rust
//! use kindred_framework::{Dispatcher, Field, KindDef, Registry, StoreActor, StoreConfig, Value};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut builder = Registry::builder();
//!     builder.register(KindDef::new("note").field(Field::char("title")));
//!     let registry = Arc::new(builder.build().unwrap());
//!
//!     let (actor, client) =
//!         StoreActor::new(registry, Arc::new(Dispatcher::new()), StoreConfig::default()).unwrap();
//!     tokio::spawn(actor.run());
//!
//!     let mut values = kindred_framework::Values::new();
//!     values.insert("title".into(), Value::from("Hello"));
//!     let id = client.create("note", values).await.unwrap();
//!     let note = client.read("note", id).await.unwrap();
//!     assert_eq!(note.get("title"), &Value::from("Hello"));
//! }
//! ```

use crate::client::StoreClient;
use crate::config::StoreConfig;
use crate::error::{ConfigError, FrameworkError};
use crate::message::{Response, StoreRequest};
use crate::registry::Registry;
use crate::signals::Dispatcher;
use crate::store::Store;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Server half of the store: the record store plus the request channel.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    store: Store,
    config: StoreConfig,
}

impl StoreActor {
    /// Creates the actor and its client.
    ///
    /// The actor does nothing until [`run`](Self::run) is spawned.
    pub fn new(
        registry: Arc<Registry>,
        dispatcher: Arc<Dispatcher>,
        config: StoreConfig,
    ) -> Result<(Self, StoreClient), ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        let (sender, receiver) = mpsc::channel(config.buffer_size);
        let actor = Self {
            receiver,
            store: Store::new(registry, dispatcher),
            config,
        };
        Ok((actor, StoreClient::new(sender)))
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        let kinds = self.store.registry().kinds().count();
        info!(kinds, buffer_size = self.config.buffer_size, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            let operation = msg.operation();
            match msg {
                StoreRequest::Create {
                    kind,
                    values,
                    respond_to,
                } => {
                    if self.config.log_payloads {
                        debug!(%kind, ?values, "Create");
                    } else {
                        debug!(%kind, fields = ?values.keys().collect::<Vec<_>>(), "Create");
                    }
                    let result = self.store.create(&kind, values);
                    reply(respond_to, result, operation, &kind);
                }
                StoreRequest::Read {
                    kind,
                    id,
                    respond_to,
                } => {
                    let result = self.store.read(&kind, id);
                    debug!(%kind, %id, found = result.is_ok(), "Read");
                    reply(respond_to, result, operation, &kind);
                }
                StoreRequest::Browse {
                    kind,
                    ids,
                    respond_to,
                } => {
                    debug!(%kind, ?ids, "Browse");
                    let result = self.store.browse(&kind, &ids);
                    reply(respond_to, result, operation, &kind);
                }
                StoreRequest::Write {
                    kind,
                    ids,
                    values,
                    respond_to,
                } => {
                    if self.config.log_payloads {
                        debug!(%kind, ?ids, ?values, "Write");
                    } else {
                        debug!(%kind, ?ids, fields = ?values.keys().collect::<Vec<_>>(), "Write");
                    }
                    let result = self.store.write(&kind, &ids, values);
                    reply(respond_to, result, operation, &kind);
                }
                StoreRequest::Unlink {
                    kind,
                    ids,
                    respond_to,
                } => {
                    debug!(%kind, ?ids, "Unlink");
                    let result = self.store.unlink(&kind, &ids);
                    reply(respond_to, result, operation, &kind);
                }
                StoreRequest::Search {
                    kind,
                    domain,
                    respond_to,
                } => {
                    let result = self.store.search(&kind, &domain);
                    reply(respond_to, result, operation, &kind);
                }
                StoreRequest::Selection {
                    kind,
                    field,
                    respond_to,
                } => {
                    debug!(%kind, %field, "Selection");
                    let result = self.store.selection(&kind, &field);
                    reply(respond_to, result, operation, &kind);
                }
                StoreRequest::Snapshot { respond_to } => {
                    let snapshot = self.store.snapshot();
                    debug!(records = snapshot.records.len(), "Snapshot");
                    let _ = respond_to.send(Ok(snapshot));
                }
                StoreRequest::Load {
                    snapshot,
                    respond_to,
                } => {
                    let result = self.store.load(snapshot).map_err(FrameworkError::from);
                    reply(respond_to, result, operation, "*");
                }
            }
        }

        info!(kinds, "Shutdown");
    }
}

fn reply<T>(respond_to: Response<T>, result: Result<T, FrameworkError>, operation: &str, kind: &str) {
    if let Err(e) = &result {
        warn!(kind, operation, error = %e, "Request failed");
    }
    let _ = respond_to.send(result);
}
