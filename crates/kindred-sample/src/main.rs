//! # Kindred Sample
//!
//! Walks through the two halves of the framework:
//!
//! 1. A `test.model` delegating to an `example.mixin` implementer: its
//!    mirrored `test` field is read from, written to and searched through
//!    the referenced record.
//! 2. `test_signals.signaling_model` observed by receivers and a write
//!    wrapper that veto blank names and keep an audit trail.
//!
//! Set `KINDRED_CONFIG` to a TOML file to override the store configuration.

use kindred_framework::tracing::setup_tracing;
use kindred_framework::StoreConfig;
use kindred_sample::lifecycle::KindredSystem;
use kindred_sample::model::{
    MixinCreate, SignalingCreate, SignalingUpdate, TestModelCreate, TestModelUpdate, MODEL1,
};
use tracing::{error, info, Instrument};

fn load_config() -> Result<StoreConfig, String> {
    match std::env::var("KINDRED_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
            StoreConfig::from_toml_str(&text).map_err(|e| e.to_string())
        }
        Err(_) => Ok(StoreConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = load_config()?;
    info!(?config, "Starting kindred sample");
    let system = KindredSystem::with_config(config).map_err(|e| e.to_string())?;

    let span = tracing::info_span!("typed_reference");
    async {
        let targets = system
            .test_model_client
            .targets()
            .await
            .map_err(|e| e.to_string())?;
        info!(?targets, "Acceptable targets");

        let target = system
            .test_model_client
            .create_target(MODEL1, MixinCreate::default())
            .await
            .map_err(|e| e.to_string())?;
        let id = system
            .test_model_client
            .create_test_model(TestModelCreate {
                typed_ref: Some(target.clone()),
                ..TestModelCreate::default()
            })
            .await
            .map_err(|e| e.to_string())?;

        let owner = system
            .test_model_client
            .get_test_model(id)
            .await
            .map_err(|e| e.to_string())?;
        info!(%id, test = ?owner.test, "Mirrored from target");

        system
            .test_model_client
            .update_test_model(
                id,
                TestModelUpdate {
                    test: Some("Hi".to_string()),
                    ..TestModelUpdate::default()
                },
            )
            .await
            .map_err(|e| e.to_string())?;
        let found = system
            .test_model_client
            .find_by_test("Hi")
            .await
            .map_err(|e| e.to_string())?;
        info!(%target, found = found.len(), "Written through and found");
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("signals");
    async {
        let id = system
            .signaling_client
            .create_signaling(SignalingCreate {
                name: "first".to_string(),
            })
            .await
            .map_err(|e| e.to_string())?;
        system
            .signaling_client
            .update_signaling(
                id,
                SignalingUpdate {
                    name: Some("renamed".to_string()),
                },
            )
            .await
            .map_err(|e| e.to_string())?;

        if let Err(e) = system
            .signaling_client
            .update_signaling(
                id,
                SignalingUpdate {
                    name: Some("  ".to_string()),
                },
            )
            .await
        {
            error!(error = %e, "Rename rejected");
        }
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    for entry in system.audit.entries() {
        info!(hook = %entry.hook, ids = ?entry.ids, detail = ?entry.detail, "Audit trail");
    }

    system.shutdown().await?;
    info!("Sample completed successfully");
    Ok(())
}
