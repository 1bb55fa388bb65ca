//! Entity kinds: their static declaration and their built schema.

use crate::field::Field;
use indexmap::IndexMap;

/// Static declaration of a kind, as registered during the load phase.
///
/// ```
/// use kindred_framework::{Field, KindDef};
///
/// let mixin = KindDef::new("example.mixin")
///     .abstract_kind()
///     .field(Field::char("test").with_default("Hello"));
/// let model = KindDef::new("test.model1")
///     .inherits("example.mixin")
///     .description("Model 1");
/// assert!(mixin.is_abstract);
/// assert_eq!(model.inherits, vec!["example.mixin".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KindDef {
    pub name: String,
    pub description: Option<String>,
    /// Abstract kinds are templates: they hold no records and are never
    /// selectable reference targets.
    pub is_abstract: bool,
    /// Parent kinds and mixins, in declaration order.
    pub inherits: Vec<String>,
    pub fields: Vec<Field>,
}

impl KindDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_abstract: false,
            inherits: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn abstract_kind(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.inherits.push(parent.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// A kind after the schema build step: inherited fields resolved and mirrored
/// fields synthesized.
#[derive(Debug, Clone, PartialEq)]
pub struct Kind {
    pub name: String,
    pub description: Option<String>,
    pub is_abstract: bool,
    /// Every transitive parent, nearest first.
    pub ancestors: Vec<String>,
    pub fields: IndexMap<String, Field>,
}

impl Kind {
    /// The kind's description, or its name when it has none.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Fields synthesized by delegating typed references.
    pub fn mirrors(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().filter(|f| f.is_mirror())
    }
}
