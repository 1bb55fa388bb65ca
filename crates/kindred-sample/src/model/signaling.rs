use super::mixin::insert_some;
use kindred_framework::{Field, KindDef, Record, RecordId, RegistryBuilder, Values};
use serde::{Deserialize, Serialize};

pub const SIGNALING_MODEL: &str = "test_signals.signaling_model";

pub fn register(builder: &mut RegistryBuilder) {
    builder.register(
        KindDef::new(SIGNALING_MODEL)
            .description("Signaling model")
            .field(Field::char("name")),
    );
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalingCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalingUpdate {
    pub name: Option<String>,
}

impl SignalingUpdate {
    pub fn into_values(self) -> Values {
        let mut values = Values::new();
        insert_some(&mut values, "name", self.name);
        values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalingModel {
    pub id: RecordId,
    pub name: Option<String>,
}

impl From<&Record> for SignalingModel {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            name: record.get("name").as_text().map(str::to_string),
        }
    }
}
