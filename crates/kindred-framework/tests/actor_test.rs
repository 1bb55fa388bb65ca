mod common;

use kindred_framework::{
    values, ConfigError, Dispatcher, FrameworkError, KindClient, Operator, Predicate, RecordId, RecordRef,
    StoreActor, StoreClient, StoreConfig, Value,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("test model error: {0}")]
struct TestModelError(String);

struct TestModelClient {
    inner: StoreClient,
}

impl KindClient for TestModelClient {
    type Error = TestModelError;
    const KIND: &'static str = "test.model";

    fn inner(&self) -> &StoreClient {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        TestModelError(e.to_string())
    }
}

fn spawn_store() -> (StoreClient, tokio::task::JoinHandle<()>) {
    let (actor, client) = StoreActor::new(
        common::registry(),
        Arc::new(Dispatcher::new()),
        StoreConfig::default(),
    )
    .unwrap();
    (client, tokio::spawn(actor.run()))
}

#[tokio::test]
async fn test_crud_through_the_actor() {
    let (client, handle) = spawn_store();

    let m1 = client.create("test.model1", values! {}).await.unwrap();
    let t = client
        .create("test.model", values! { "typed_ref" => RecordRef::new("test.model1", m1) })
        .await
        .unwrap();

    let updated = client
        .write("test.model", vec![t], values! { "test" => "Hi" })
        .await
        .unwrap();
    assert_eq!(updated[0].get("test"), &Value::from("Hi"));

    let target = client.read("test.model1", m1).await.unwrap();
    assert_eq!(target.get("test"), &Value::from("Hi"));

    let set = client.browse("test.model", vec![t]).await.unwrap();
    assert_eq!(set.ensure_one().unwrap().id, t);

    client.unlink("test.model", vec![t]).await.unwrap();
    assert!(matches!(
        client.read("test.model", t).await,
        Err(FrameworkError::NotFound { .. })
    ));

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_kind_client_defaults() {
    let (client, _handle) = spawn_store();
    let m2 = client
        .create("test.model2", values! { "test" => "Hi" })
        .await
        .unwrap();
    let t = client
        .create("test.model", values! { "typed_ref" => RecordRef::new("test.model2", m2) })
        .await
        .unwrap();

    let models = TestModelClient {
        inner: client.clone(),
    };
    let found = models
        .search(vec![Predicate::new("test", Operator::Eq, "Hi")])
        .await
        .unwrap();
    assert_eq!(found.ids(), vec![t]);
    assert_eq!(models.read(t).await.unwrap().get("test"), &Value::from("Hi"));

    models.unlink(vec![t]).await.unwrap();
    let err = models.read(t).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_errors_reach_the_caller() {
    let (client, _handle) = spawn_store();
    let err = client.create("no.such.kind", values! {}).await.unwrap_err();
    assert!(matches!(err, FrameworkError::UnknownKind(_)));

    let selection = client.selection("test.model", "filtered_typed_ref").await.unwrap();
    assert_eq!(selection.len(), 1);
}

#[tokio::test]
async fn test_snapshot_moves_between_actors() {
    let (source, _source_handle) = spawn_store();
    let m1 = source
        .create("test.model1", values! { "test" => "Hi" })
        .await
        .unwrap();
    let snapshot = source.snapshot().await.unwrap();

    let (target, _target_handle) = spawn_store();
    target.load(snapshot).await.unwrap();
    assert_eq!(
        target.read("test.model1", m1).await.unwrap().get("test"),
        &Value::from("Hi")
    );
}

#[tokio::test]
async fn test_closed_actor_is_reported() {
    let (actor, client) = StoreActor::new(
        common::registry(),
        Arc::new(Dispatcher::new()),
        StoreConfig::default(),
    )
    .unwrap();
    drop(actor);

    assert!(matches!(
        client.read("test.model", RecordId(1)).await,
        Err(FrameworkError::ActorClosed)
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = StoreActor::new(
        common::registry(),
        Arc::new(Dispatcher::new()),
        StoreConfig::new(0),
    );
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
