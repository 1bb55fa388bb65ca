//! # KindClient Trait
//!
//! Common interface for per-kind clients: each one names its kind and error
//! type, and gets `read`, `search` and `unlink` for free on top of the shared
//! [`StoreClient`].

use crate::domain::Domain;
use crate::error::FrameworkError;
use crate::client::StoreClient;
use crate::record::{Record, RecordId, RecordSet};
use async_trait::async_trait;

/// Trait for typed clients bound to one kind.
///
/// # Example
///
/// ```rust
/// use kindred_framework::{FrameworkError, KindClient, StoreClient};
///
/// #[derive(Debug)]
/// struct NoteError(String);
///
/// struct NoteClient {
///     inner: StoreClient,
/// }
///
/// impl KindClient for NoteClient {
///     type Error = NoteError;
///     const KIND: &'static str = "note";
///
///     fn inner(&self) -> &StoreClient {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         NoteError(e.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait KindClient: Send + Sync {
    type Error: Send + Sync;

    /// Technical name of the kind this client is bound to.
    const KIND: &'static str;

    fn inner(&self) -> &StoreClient;

    fn map_error(e: FrameworkError) -> Self::Error;

    #[tracing::instrument(skip(self), fields(kind = Self::KIND))]
    async fn read(&self, id: RecordId) -> Result<Record, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().read(Self::KIND, id).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self), fields(kind = Self::KIND))]
    async fn search(&self, domain: Domain) -> Result<RecordSet, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().search(Self::KIND, domain).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self), fields(kind = Self::KIND))]
    async fn unlink(&self, ids: Vec<RecordId>) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().unlink(Self::KIND, ids).await.map_err(Self::map_error)
    }
}
