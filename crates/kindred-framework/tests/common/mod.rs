#![allow(dead_code)]

use kindred_framework::{Dispatcher, Field, KindDef, Registry, Store, TypedReference};
use std::sync::{Arc, Mutex};

pub type Log = Arc<Mutex<Vec<String>>>;

/// A mixin with two fields, three concrete implementers (one of them through
/// an intermediate kind) and an owner with a delegating and a filtered
/// typed reference.
pub fn registry() -> Arc<Registry> {
    let mut builder = Registry::builder();
    builder
        .register(KindDef::new("res.partner").field(Field::char("name")))
        .register(
            KindDef::new("example.mixin")
                .abstract_kind()
                .field(Field::char("test").with_default("Hello"))
                .field(Field::many2one("partner_id", "res.partner")),
        )
        .register(
            KindDef::new("test.model1")
                .inherits("example.mixin")
                .description("Model 1"),
        )
        .register(KindDef::new("test.model2").inherits("example.mixin"))
        .register(KindDef::new("test.sub.model2").inherits("test.model2"))
        .register(
            KindDef::new("test.model")
                .field(Field::typed_reference(
                    "typed_ref",
                    TypedReference::new("example.mixin").delegate(),
                ))
                .field(Field::typed_reference(
                    "filtered_typed_ref",
                    TypedReference::new("example.mixin").with_selection([("test.model2", "model2")]),
                )),
        );
    Arc::new(builder.build().expect("fixture schema is valid"))
}

pub fn store() -> Store {
    store_with(Dispatcher::new())
}

pub fn store_with(dispatcher: Dispatcher) -> Store {
    Store::new(registry(), Arc::new(dispatcher))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}
