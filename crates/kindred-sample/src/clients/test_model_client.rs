//! # Test Model Client
//!
//! High-level API over `test.model` and the `example.mixin` implementers it
//! references.

use crate::error::TestModelError;
use crate::model::{MixinCreate, TestModel, TestModelCreate, TestModelUpdate, TEST_MODEL};
use kindred_framework::{
    FrameworkError, KindClient, Operator, Predicate, RecordId, RecordRef, Selection, StoreClient,
};
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct TestModelClient {
    inner: StoreClient,
}

impl TestModelClient {
    pub fn new(inner: StoreClient) -> Self {
        Self { inner }
    }
}

impl KindClient for TestModelClient {
    type Error = TestModelError;
    const KIND: &'static str = TEST_MODEL;

    fn inner(&self) -> &StoreClient {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        TestModelError::from(e)
    }
}

impl TestModelClient {
    /// Kinds `typed_ref` may point at, with their labels.
    #[instrument(skip(self))]
    pub async fn targets(&self) -> Result<Selection, TestModelError> {
        debug!("Sending request");
        Ok(self.inner.selection(TEST_MODEL, "typed_ref").await?)
    }

    /// Creates a record of `kind`, which must be a valid `typed_ref` target.
    #[instrument(skip(self))]
    pub async fn create_target(
        &self,
        kind: &str,
        params: MixinCreate,
    ) -> Result<RecordRef, TestModelError> {
        if !self.targets().await?.iter().any(|(k, _)| k == kind) {
            return Err(TestModelError::InvalidReference(format!(
                "{kind} does not implement the mixin"
            )));
        }
        debug!("Sending request");
        let id = self.inner.create(kind, params.into_values()).await?;
        Ok(RecordRef::new(kind, id))
    }

    #[instrument(skip(self))]
    pub async fn create_test_model(&self, params: TestModelCreate) -> Result<RecordId, TestModelError> {
        debug!("Sending request");
        Ok(self.inner.create(TEST_MODEL, params.into_values()).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_test_model(&self, id: RecordId) -> Result<TestModel, TestModelError> {
        let record = self.read(id).await?;
        Ok(TestModel::from(&record))
    }

    #[instrument(skip(self))]
    pub async fn update_test_model(
        &self,
        id: RecordId,
        update: TestModelUpdate,
    ) -> Result<TestModel, TestModelError> {
        debug!("Sending request");
        let records = self
            .inner
            .write(TEST_MODEL, vec![id], update.into_values())
            .await?;
        records
            .first()
            .map(TestModel::from)
            .ok_or_else(|| TestModelError::NotFound(id.to_string()))
    }

    /// Owners whose referenced record has `test == value`.
    #[instrument(skip(self))]
    pub async fn find_by_test(&self, value: &str) -> Result<Vec<TestModel>, TestModelError> {
        let found = self
            .search(vec![Predicate::new("test", Operator::Eq, value)])
            .await?;
        Ok(found.records.iter().map(TestModel::from).collect())
    }
}
