//! # Field Descriptors
//!
//! A [`Field`] describes one attribute of a kind: its type, label, flags and
//! default. Fields synthesized by a delegating typed reference additionally
//! carry [`MirrorRules`], which tell the store how to compute, write back and
//! search the mirrored value.
//!
//! The rules are plain tagged data captured over `(reference, source)`
//! rather than closures, so a built schema stays `Clone + Debug` and can be
//! inspected in tests.

use crate::typed_reference::TypedReference;
use crate::value::Value;

/// The data type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Char,
    Integer,
    Float,
    Boolean,
    /// A reference to one record of a fixed kind.
    Many2one { target: String },
    /// A reference to one record of any kind implementing a mixin.
    TypedReference(TypedReference),
}

impl FieldType {
    /// Whether `value` is acceptable for this type, ignoring reference targets.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Empty)
                | (FieldType::Char, Value::Text(_))
                | (FieldType::Integer, Value::Integer(_))
                | (FieldType::Float, Value::Float(_) | Value::Integer(_))
                | (FieldType::Boolean, Value::Bool(_))
                | (FieldType::Many2one { .. }, Value::Ref(_))
                | (FieldType::TypedReference(_), Value::Ref(_))
        )
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            FieldType::Many2one { .. } | FieldType::TypedReference(_)
        )
    }
}

/// Copies the referenced record's `source` field into the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeRule {
    CopyFrom { reference: String, source: String },
}

/// Writes the owner's value back into the referenced record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InverseRule {
    WriteThrough { reference: String, source: String },
}

/// Rewrites a search on the owner into a search through the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRule {
    Traverse { reference: String, source: String },
}

impl SearchRule {
    /// The traversal path replacing the mirrored field in a predicate.
    pub fn path(&self) -> String {
        match self {
            SearchRule::Traverse { reference, source } => format!("{reference}.{source}"),
        }
    }
}

/// Behaviour of a mirrored field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRules {
    pub compute: ComputeRule,
    pub inverse: Option<InverseRule>,
    pub search: Option<SearchRule>,
}

impl MirrorRules {
    /// Name of the typed reference field this mirror reads through.
    pub fn reference(&self) -> &str {
        match &self.compute {
            ComputeRule::CopyFrom { reference, .. } => reference,
        }
    }

    /// Name of the mirrored field on the referenced record.
    pub fn source(&self) -> &str {
        match &self.compute {
            ComputeRule::CopyFrom { source, .. } => source,
        }
    }
}

/// Descriptor of one attribute of a kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Human-readable label.
    pub string: Option<String>,
    pub readonly: bool,
    pub searchable: bool,
    pub default: Option<Value>,
    /// Set only on fields synthesized by a delegating typed reference.
    pub mirror: Option<MirrorRules>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            string: None,
            readonly: false,
            searchable: true,
            default: None,
            mirror: None,
        }
    }

    pub fn char(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Char)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn many2one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::Many2one {
                target: target.into(),
            },
        )
    }

    pub fn typed_reference(name: impl Into<String>, reference: TypedReference) -> Self {
        Self::new(name, FieldType::TypedReference(reference))
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_string(mut self, string: impl Into<String>) -> Self {
        self.string = Some(string.into());
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn unsearchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn as_typed_reference(&self) -> Option<&TypedReference> {
        match &self.field_type {
            FieldType::TypedReference(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    /// Builds the field mirroring `source` through the delegating `reference`.
    ///
    /// The mirror keeps the source's type, label and flags but never its
    /// default: its value always comes from the referenced record. It gets an
    /// inverse unless either side is read-only, and a search rule only if
    /// the source is searchable.
    pub fn mirror_of(reference: &Field, source: &Field) -> Self {
        let writable = !(source.readonly || reference.readonly);
        let rules = MirrorRules {
            compute: ComputeRule::CopyFrom {
                reference: reference.name.clone(),
                source: source.name.clone(),
            },
            inverse: writable.then(|| InverseRule::WriteThrough {
                reference: reference.name.clone(),
                source: source.name.clone(),
            }),
            search: source.searchable.then(|| SearchRule::Traverse {
                reference: reference.name.clone(),
                source: source.name.clone(),
            }),
        };
        Self {
            name: source.name.clone(),
            field_type: source.field_type.clone(),
            string: source.string.clone(),
            readonly: !writable,
            searchable: source.searchable,
            default: None,
            mirror: Some(rules),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_of_readonly_source_has_no_inverse() {
        let reference = Field::typed_reference("ref", TypedReference::new("m").delegate());
        let source = Field::char("code").readonly();
        let mirror = Field::mirror_of(&reference, &source);
        let rules = mirror.mirror.unwrap();
        assert!(rules.inverse.is_none());
        assert!(mirror.readonly);
        assert_eq!(rules.search.unwrap().path(), "ref.code");
    }

    #[test]
    fn mirror_of_unsearchable_source_has_no_search() {
        let reference = Field::typed_reference("ref", TypedReference::new("m").delegate());
        let source = Field::char("note").unsearchable().with_default("x");
        let mirror = Field::mirror_of(&reference, &source);
        assert!(mirror.default.is_none());
        let rules = mirror.mirror.unwrap();
        assert!(rules.search.is_none());
        assert!(rules.inverse.is_some());
    }

    #[test]
    fn float_accepts_integers() {
        assert!(FieldType::Float.accepts(&Value::Integer(3)));
        assert!(!FieldType::Integer.accepts(&Value::Float(3.0)));
        assert!(FieldType::Char.accepts(&Value::Empty));
    }
}
