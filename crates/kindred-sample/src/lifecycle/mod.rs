//! # System Lifecycle
//!
//! [`KindredSystem`] wires the sample together: it builds the schema,
//! installs the receivers, starts the store actor and hands out the typed
//! clients. Dropping every client closes the request channel, which is how
//! [`KindredSystem::shutdown`] stops the actor.

use crate::clients::{SignalingClient, TestModelClient};
use crate::error::SystemError;
use crate::model;
use crate::receivers::{self, AuditLog};
use kindred_framework::{Dispatcher, StoreActor, StoreClient, StoreConfig};
use std::sync::Arc;
use tracing::{error, info};

pub struct KindredSystem {
    pub test_model_client: TestModelClient,
    pub signaling_client: SignalingClient,
    /// Untyped access to every kind.
    pub store_client: StoreClient,
    pub audit: AuditLog,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl KindredSystem {
    /// Starts the system with the default configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self, SystemError> {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Result<Self, SystemError> {
        let registry = Arc::new(model::schema()?);

        let audit = AuditLog::default();
        let mut dispatcher = Dispatcher::new();
        receivers::install(&mut dispatcher, &audit);

        let (actor, store_client) = StoreActor::new(registry, Arc::new(dispatcher), config)?;
        let handle = tokio::spawn(actor.run());
        info!("System started");

        Ok(Self {
            test_model_client: TestModelClient::new(store_client.clone()),
            signaling_client: SignalingClient::new(store_client.clone()),
            store_client,
            audit,
            handles: vec![handle],
        })
    }

    /// Drops every client and waits for the actor to finish.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.test_model_client);
        drop(self.signaling_client);
        drop(self.store_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
