//! # Store Messages
//!
//! Requests sent by a [`StoreClient`](crate::client::StoreClient) to the
//! [`StoreActor`](crate::actor::StoreActor). Each variant mirrors one
//! [`Store`](crate::store::Store) operation and carries a one-shot channel
//! for the answer.

use crate::domain::Domain;
use crate::error::FrameworkError;
use crate::record::{Record, RecordId, RecordSet, Values};
use crate::store::Snapshot;
use crate::typed_reference::Selection;
use tokio::sync::oneshot;

/// One-shot channel carrying the answer to a request.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum StoreRequest {
    Create {
        kind: String,
        values: Values,
        respond_to: Response<RecordId>,
    },
    Read {
        kind: String,
        id: RecordId,
        respond_to: Response<Record>,
    },
    Browse {
        kind: String,
        ids: Vec<RecordId>,
        respond_to: Response<RecordSet>,
    },
    Write {
        kind: String,
        ids: Vec<RecordId>,
        values: Values,
        respond_to: Response<Vec<Record>>,
    },
    Unlink {
        kind: String,
        ids: Vec<RecordId>,
        respond_to: Response<()>,
    },
    Search {
        kind: String,
        domain: Domain,
        respond_to: Response<RecordSet>,
    },
    Selection {
        kind: String,
        field: String,
        respond_to: Response<Selection>,
    },
    Snapshot {
        respond_to: Response<Snapshot>,
    },
    Load {
        snapshot: Snapshot,
        respond_to: Response<()>,
    },
}

impl StoreRequest {
    /// Operation name, for logs.
    pub fn operation(&self) -> &'static str {
        match self {
            StoreRequest::Create { .. } => "create",
            StoreRequest::Read { .. } => "read",
            StoreRequest::Browse { .. } => "browse",
            StoreRequest::Write { .. } => "write",
            StoreRequest::Unlink { .. } => "unlink",
            StoreRequest::Search { .. } => "search",
            StoreRequest::Selection { .. } => "selection",
            StoreRequest::Snapshot { .. } => "snapshot",
            StoreRequest::Load { .. } => "load",
        }
    }
}
