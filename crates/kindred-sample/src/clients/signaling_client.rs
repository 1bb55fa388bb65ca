//! # Signaling Client

use crate::error::SignalingError;
use crate::model::{SignalingCreate, SignalingModel, SignalingUpdate, SIGNALING_MODEL};
use kindred_framework::{values, FrameworkError, KindClient, RecordId, StoreClient};
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct SignalingClient {
    inner: StoreClient,
}

impl SignalingClient {
    pub fn new(inner: StoreClient) -> Self {
        Self { inner }
    }
}

impl KindClient for SignalingClient {
    type Error = SignalingError;
    const KIND: &'static str = SIGNALING_MODEL;

    fn inner(&self) -> &StoreClient {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        SignalingError::from(e)
    }
}

impl SignalingClient {
    #[instrument(skip(self))]
    pub async fn create_signaling(&self, params: SignalingCreate) -> Result<RecordId, SignalingError> {
        debug!("Sending request");
        Ok(self
            .inner
            .create(SIGNALING_MODEL, values! { "name" => params.name })
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_signaling(&self, id: RecordId) -> Result<SignalingModel, SignalingError> {
        let record = self.read(id).await?;
        Ok(SignalingModel::from(&record))
    }

    #[instrument(skip(self))]
    pub async fn update_signaling(
        &self,
        id: RecordId,
        update: SignalingUpdate,
    ) -> Result<SignalingModel, SignalingError> {
        debug!("Sending request");
        let records = self
            .inner
            .write(SIGNALING_MODEL, vec![id], update.into_values())
            .await?;
        records
            .first()
            .map(SignalingModel::from)
            .ok_or_else(|| SignalingError::NotFound(id.to_string()))
    }
}
