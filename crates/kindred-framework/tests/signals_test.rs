mod common;

use common::{entries, Log};
use kindred_framework::{
    values, Dispatcher, Field, FrameworkError, Hook, KindDef, Proceed, RecordRef, Registry, Signal,
    SignalEvent, Store, Value, WrapperSignal,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SIGNALING: &str = "test_signals.signaling_model";

fn signaling_store(dispatcher: Dispatcher) -> Store {
    let mut builder = Registry::builder();
    builder.register(KindDef::new(SIGNALING).field(Field::char("name")));
    Store::new(Arc::new(builder.build().unwrap()), Arc::new(dispatcher))
}

fn recorder(log: &Log) -> impl Fn(Signal, &SignalEvent) -> Result<(), kindred_framework::HookError> {
    let log = Arc::clone(log);
    move |signal, event| {
        log.lock().unwrap().push(format!("{signal}:{}", event.sender));
        Ok(())
    }
}

#[test]
fn create_fires_pre_then_post_then_modified() {
    let log: Log = Arc::default();
    let mut dispatcher = Dispatcher::new();
    for signal in [
        Signal::PreCreate,
        Signal::PreSave,
        Signal::PostCreate,
        Signal::PostSave,
        Signal::Modified,
    ] {
        dispatcher.receiver(signal, Some(SIGNALING), recorder(&log));
    }
    let mut store = signaling_store(dispatcher);

    store.create(SIGNALING, values! { "name" => "a" }).unwrap();
    assert_eq!(
        entries(&log),
        vec![
            format!("pre_create:{SIGNALING}"),
            format!("pre_save:{SIGNALING}"),
            format!("post_create:{SIGNALING}"),
            format!("post_save:{SIGNALING}"),
            format!("modified:{SIGNALING}"),
        ]
    );
}

#[test]
fn failing_pre_create_receiver_leaves_no_record() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.receiver(Signal::PreCreate, Some(SIGNALING), |_, event| {
        if event.values.get("name") == Some(&Value::from("forbidden")) {
            return Err("name is forbidden".into());
        }
        Ok(())
    });
    let mut store = signaling_store(dispatcher);

    let err = store
        .create(SIGNALING, values! { "name" => "forbidden" })
        .unwrap_err();
    assert!(matches!(
        err,
        FrameworkError::Hook {
            hook: Hook::Signal(Signal::PreCreate),
            ..
        }
    ));
    assert_eq!(store.len(SIGNALING), 0);

    store.create(SIGNALING, values! { "name" => "fine" }).unwrap();
    assert_eq!(store.len(SIGNALING), 1);
}

#[test]
fn failing_post_save_receiver_rolls_the_write_back() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.receiver(Signal::PostSave, Some(SIGNALING), |_, event| {
        if event.values.contains_key("name") {
            return Err("rejected after the fact".into());
        }
        Ok(())
    });
    let mut store = signaling_store(dispatcher);
    let id = store.create(SIGNALING, values! {}).unwrap();

    assert!(store.write(SIGNALING, &[id], values! { "name" => "b" }).is_err());
    assert_eq!(store.read(SIGNALING, id).unwrap().get("name"), &Value::Empty);
}

#[test]
fn write_wrapper_sees_state_before_and_after() {
    let log: Log = Arc::default();
    let seen = Arc::clone(&log);
    let mut dispatcher = Dispatcher::new();
    dispatcher.wrapper(
        WrapperSignal::Write,
        Some(SIGNALING),
        move |event: &SignalEvent, proceed: Proceed<'_>| {
            let before = event.records[0].get("name").clone();
            let outcome = proceed.proceed()?;
            let after = outcome.records[0].get("name").clone();
            seen.lock().unwrap().push(format!("{before} -> {after}"));
            Ok(())
        },
    );
    let mut store = signaling_store(dispatcher);
    let id = store.create(SIGNALING, values! { "name" => "old" }).unwrap();

    store.write(SIGNALING, &[id], values! { "name" => "new" }).unwrap();
    assert_eq!(entries(&log), vec!["\"old\" -> \"new\""]);
}

#[test]
fn vetoing_wrapper_blocks_the_operation() {
    let log: Log = Arc::default();
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .wrapper(
            WrapperSignal::Unlink,
            Some(SIGNALING),
            |_event: &SignalEvent, _proceed: Proceed<'_>| Ok(()),
        )
        .receiver(Signal::PostUnlink, None, recorder(&log));
    let mut store = signaling_store(dispatcher);
    let id = store.create(SIGNALING, values! {}).unwrap();

    let err = store.unlink(SIGNALING, &[id]).unwrap_err();
    assert!(matches!(
        err,
        FrameworkError::Vetoed {
            signal: WrapperSignal::Unlink,
            ..
        }
    ));
    assert!(store.read(SIGNALING, id).is_ok());
    assert!(entries(&log).is_empty());
}

#[test]
fn write_wrapper_that_never_proceeds_leaves_the_write_unapplied() {
    let log: Log = Arc::default();
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .wrapper(
            WrapperSignal::Write,
            Some(SIGNALING),
            |_event: &SignalEvent, _proceed: Proceed<'_>| Ok(()),
        )
        .receiver(Signal::PreWrite, None, recorder(&log))
        .receiver(Signal::PostWrite, None, recorder(&log))
        .receiver(Signal::Modified, None, recorder(&log));
    let mut store = signaling_store(dispatcher);
    let id = store.create(SIGNALING, values! { "name" => "Hello" }).unwrap();
    let before = entries(&log);

    let err = store
        .write(SIGNALING, &[id], values! { "name" => "Hi" })
        .unwrap_err();
    assert!(matches!(
        err,
        FrameworkError::Vetoed {
            signal: WrapperSignal::Write,
            ..
        }
    ));
    assert_eq!(store.read(SIGNALING, id).unwrap().get("name"), &Value::from("Hello"));
    assert_eq!(entries(&log), before);
}

#[test]
fn wrapper_failing_after_proceed_rolls_back() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.wrapper(
        WrapperSignal::Create,
        None,
        |_event: &SignalEvent, proceed: Proceed<'_>| {
            proceed.proceed()?;
            Err("audit trail unavailable".into())
        },
    );
    let mut store = signaling_store(dispatcher);

    let err = store.create(SIGNALING, values! { "name" => "x" }).unwrap_err();
    assert!(matches!(
        err,
        FrameworkError::Hook {
            hook: Hook::Wrapper(WrapperSignal::Create),
            ..
        }
    ));
    assert_eq!(store.len(SIGNALING), 0);
}

#[test]
fn modified_fires_only_on_actual_change() {
    let log: Log = Arc::default();
    let changed = Arc::clone(&log);
    let mut dispatcher = Dispatcher::new();
    dispatcher.receiver(Signal::Modified, Some(SIGNALING), move |_, event| {
        changed.lock().unwrap().push(event.fields.join(","));
        Ok(())
    });
    let mut store = signaling_store(dispatcher);
    let id = store.create(SIGNALING, values! { "name" => "same" }).unwrap();

    store.write(SIGNALING, &[id], values! { "name" => "same" }).unwrap();
    store.write(SIGNALING, &[id], values! { "name" => "other" }).unwrap();
    assert_eq!(entries(&log), vec!["name", "name"]);
}

#[test]
fn write_through_fires_signals_on_the_target_kind() {
    let log: Log = Arc::default();
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .receiver(Signal::PostWrite, Some("test.model1"), recorder(&log))
        .receiver(Signal::PostWrite, Some("test.model"), recorder(&log));
    let mut store = common::store_with(dispatcher);
    let m1 = store.create("test.model1", values! {}).unwrap();
    let t = store
        .create("test.model", values! { "typed_ref" => RecordRef::new("test.model1", m1) })
        .unwrap();

    store.write("test.model", &[t], values! { "test" => "Hi" }).unwrap();
    assert_eq!(
        entries(&log),
        vec!["post_write:test.model1", "post_write:test.model"]
    );
}

#[test]
fn failing_owner_receiver_rolls_back_the_write_through() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.receiver(Signal::PostWrite, Some("test.model"), |_, _| {
        Err("owner refuses".into())
    });
    let mut store = common::store_with(dispatcher);
    let m1 = store.create("test.model1", values! {}).unwrap();
    let t = store
        .create("test.model", values! { "typed_ref" => RecordRef::new("test.model1", m1) })
        .unwrap();

    assert!(store.write("test.model", &[t], values! { "test" => "Hi" }).is_err());
    assert_eq!(store.read("test.model1", m1).unwrap().get("test"), &Value::from("Hello"));
}
