use kindred_framework::{
    Field, KindDef, Record, RecordId, RecordRef, RegistryBuilder, TypedReference, Value, Values,
};
use serde::{Deserialize, Serialize};

pub const PARTNER: &str = "res.partner";
pub const EXAMPLE_MIXIN: &str = "example.mixin";
pub const MODEL1: &str = "test.model1";
pub const MODEL2: &str = "test.model2";
pub const SUB_MODEL2: &str = "test.sub.model2";
pub const TEST_MODEL: &str = "test.model";

pub fn register(builder: &mut RegistryBuilder) {
    builder
        .register(KindDef::new(PARTNER).field(Field::char("name")))
        .register(
            KindDef::new(EXAMPLE_MIXIN)
                .abstract_kind()
                .description("Example mixin")
                .field(Field::char("test").with_default("Hello"))
                .field(Field::many2one("partner_id", PARTNER).with_string("Partner")),
        )
        .register(KindDef::new(MODEL1).inherits(EXAMPLE_MIXIN).description("Model 1"))
        .register(KindDef::new(MODEL2).inherits(EXAMPLE_MIXIN))
        .register(KindDef::new(SUB_MODEL2).inherits(MODEL2))
        .register(
            KindDef::new(TEST_MODEL)
                .field(Field::typed_reference(
                    "typed_ref",
                    TypedReference::new(EXAMPLE_MIXIN).delegate(),
                ))
                .field(Field::typed_reference(
                    "filtered_typed_ref",
                    TypedReference::new(EXAMPLE_MIXIN).with_selection([(MODEL2, "model2")]),
                )),
        );
}

/// Payload for creating a record of any `example.mixin` implementer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MixinCreate {
    pub test: Option<String>,
    pub partner_id: Option<RecordRef>,
}

impl MixinCreate {
    pub fn into_values(self) -> Values {
        let mut values = Values::new();
        insert_some(&mut values, "test", self.test);
        insert_some(&mut values, "partner_id", self.partner_id);
        values
    }
}

/// Payload for creating a `test.model`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestModelCreate {
    pub typed_ref: Option<RecordRef>,
    pub filtered_typed_ref: Option<RecordRef>,
    /// Written through to `typed_ref`.
    pub test: Option<String>,
}

impl TestModelCreate {
    pub fn into_values(self) -> Values {
        let mut values = Values::new();
        insert_some(&mut values, "typed_ref", self.typed_ref);
        insert_some(&mut values, "filtered_typed_ref", self.filtered_typed_ref);
        insert_some(&mut values, "test", self.test);
        values
    }
}

/// Payload for updating a `test.model`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestModelUpdate {
    pub typed_ref: Option<RecordRef>,
    pub test: Option<String>,
    pub partner_id: Option<RecordRef>,
}

impl TestModelUpdate {
    pub fn into_values(self) -> Values {
        let mut values = Values::new();
        insert_some(&mut values, "typed_ref", self.typed_ref);
        insert_some(&mut values, "test", self.test);
        insert_some(&mut values, "partner_id", self.partner_id);
        values
    }
}

/// A `test.model` record, mirrored fields included.
#[derive(Debug, Clone, PartialEq)]
pub struct TestModel {
    pub id: RecordId,
    pub typed_ref: Option<RecordRef>,
    pub filtered_typed_ref: Option<RecordRef>,
    pub test: Option<String>,
    pub partner_id: Option<RecordRef>,
}

impl From<&Record> for TestModel {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            typed_ref: record.get("typed_ref").as_record_ref().cloned(),
            filtered_typed_ref: record.get("filtered_typed_ref").as_record_ref().cloned(),
            test: record.get("test").as_text().map(str::to_string),
            partner_id: record.get("partner_id").as_record_ref().cloned(),
        }
    }
}

pub(crate) fn insert_some<T: Into<Value>>(values: &mut Values, field: &str, value: Option<T>) {
    if let Some(value) = value {
        values.insert(field.to_string(), value.into());
    }
}
