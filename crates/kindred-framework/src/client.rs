//! # Store Client
//!
//! The async handle used to talk to a [`StoreActor`](crate::actor::StoreActor).

use crate::domain::Domain;
use crate::error::FrameworkError;
use crate::message::{Response, StoreRequest};
use crate::record::{Record, RecordId, RecordSet, Values};
use crate::store::Snapshot;
use crate::typed_reference::Selection;
use tokio::sync::{mpsc, oneshot};

/// Cloneable, type-erased client of the store actor.
///
/// Every method sends one request and waits for its answer. A closed request
/// channel is reported as [`FrameworkError::ActorClosed`], a dropped answer
/// as [`FrameworkError::ActorDropped`].
#[derive(Debug, Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, kind: &str, values: Values) -> Result<RecordId, FrameworkError> {
        self.request(|respond_to| StoreRequest::Create {
            kind: kind.to_string(),
            values,
            respond_to,
        })
        .await
    }

    pub async fn read(&self, kind: &str, id: RecordId) -> Result<Record, FrameworkError> {
        self.request(|respond_to| StoreRequest::Read {
            kind: kind.to_string(),
            id,
            respond_to,
        })
        .await
    }

    pub async fn browse(&self, kind: &str, ids: Vec<RecordId>) -> Result<RecordSet, FrameworkError> {
        self.request(|respond_to| StoreRequest::Browse {
            kind: kind.to_string(),
            ids,
            respond_to,
        })
        .await
    }

    pub async fn write(
        &self,
        kind: &str,
        ids: Vec<RecordId>,
        values: Values,
    ) -> Result<Vec<Record>, FrameworkError> {
        self.request(|respond_to| StoreRequest::Write {
            kind: kind.to_string(),
            ids,
            values,
            respond_to,
        })
        .await
    }

    pub async fn unlink(&self, kind: &str, ids: Vec<RecordId>) -> Result<(), FrameworkError> {
        self.request(|respond_to| StoreRequest::Unlink {
            kind: kind.to_string(),
            ids,
            respond_to,
        })
        .await
    }

    pub async fn search(&self, kind: &str, domain: Domain) -> Result<RecordSet, FrameworkError> {
        self.request(|respond_to| StoreRequest::Search {
            kind: kind.to_string(),
            domain,
            respond_to,
        })
        .await
    }

    pub async fn selection(&self, kind: &str, field: &str) -> Result<Selection, FrameworkError> {
        self.request(|respond_to| StoreRequest::Selection {
            kind: kind.to_string(),
            field: field.to_string(),
            respond_to,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<Snapshot, FrameworkError> {
        self.request(|respond_to| StoreRequest::Snapshot { respond_to })
            .await
    }

    pub async fn load(&self, snapshot: Snapshot) -> Result<(), FrameworkError> {
        self.request(|respond_to| StoreRequest::Load {
            snapshot,
            respond_to,
        })
        .await
    }
}
