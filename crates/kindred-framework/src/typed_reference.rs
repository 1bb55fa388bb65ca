//! # Typed Reference Field
//!
//! A [`TypedReference`] points to exactly one record of *some* kind, where the
//! kind must implement a given mixin. Without an explicit selection the
//! acceptable targets are every concrete implementer of the mixin, each
//! labelled with its description (or name). With an explicit selection, every
//! listed kind must be such an implementer; this is checked once, when the
//! registry is built.
//!
//! A delegating reference also makes the owner kind mirror every field of the
//! mixin (see [`Field::mirror_of`](crate::field::Field::mirror_of)). Mirrors
//! are synthesized in [`synthesize_mirrors`] during the schema build step and
//! never change afterwards.

use crate::error::SetupError;
use crate::field::Field;
use crate::kind::Kind;
use crate::registry::Registry;
use indexmap::IndexMap;

/// `(kind name, label)` pairs a typed reference may point to.
pub type Selection = Vec<(String, String)>;

/// Configuration of a typed reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedReference {
    /// Mixin the target kind must implement.
    pub mixin: String,
    /// Whether the owner mirrors the mixin's fields.
    pub delegate: bool,
    /// Closed allow-list of targets; computed from the registry when absent.
    pub selection: Option<Selection>,
}

impl TypedReference {
    pub fn new(mixin: impl Into<String>) -> Self {
        Self {
            mixin: mixin.into(),
            delegate: false,
            selection: None,
        }
    }

    pub fn delegate(mut self) -> Self {
        self.delegate = true;
        self
    }

    pub fn with_selection<K, L>(mut self, selection: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        self.selection = Some(
            selection
                .into_iter()
                .map(|(k, l)| (k.into(), l.into()))
                .collect(),
        );
        self
    }

    /// The acceptable targets for this reference.
    pub fn selection(&self, registry: &Registry) -> Selection {
        match &self.selection {
            Some(selection) => selection.clone(),
            None => mixin_selection(registry, &self.mixin),
        }
    }

    /// Whether `kind` is an acceptable target.
    pub fn accepts(&self, registry: &Registry, kind: &str) -> bool {
        match &self.selection {
            Some(selection) => selection.iter().any(|(k, _)| k == kind),
            None => registry.implements(kind, &self.mixin) && registry.is_concrete(kind),
        }
    }

    /// Validates the configuration once every kind is known.
    ///
    /// The mixin must be registered and every kind of a closed selection must
    /// be a concrete implementer of it.
    pub(crate) fn setup(&self, registry: &Registry, owner: &str, field: &str) -> Result<(), SetupError> {
        if registry.kind(&self.mixin).is_none() {
            return Err(SetupError::UnknownMixin {
                kind: owner.to_string(),
                field: field.to_string(),
                mixin: self.mixin.clone(),
            });
        }
        if let Some(selection) = &self.selection {
            let descendants = registry.implementers(&self.mixin);
            for (value, _) in selection {
                if !descendants.iter().any(|d| d == value) {
                    return Err(SetupError::InvalidSelection {
                        kind: owner.to_string(),
                        field: field.to_string(),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Concrete implementers of `mixin`, labelled for display.
pub fn mixin_selection(registry: &Registry, mixin: &str) -> Selection {
    registry
        .implementers(mixin)
        .into_iter()
        .filter_map(|name| registry.kind(&name).map(|k| (name.clone(), k.label().to_string())))
        .collect()
}

/// Adds the mirrored fields of every delegating typed reference on `owner`.
///
/// `mixins` gives the fields of each mixin as resolved before any mirror was
/// added. Fields the owner already defines are skipped, so with two
/// delegating references the first one declared wins a name clash.
pub(crate) fn synthesize_mirrors(owner: &mut Kind, mixins: &IndexMap<String, IndexMap<String, Field>>) -> Vec<String> {
    let delegating: Vec<Field> = owner
        .fields
        .values()
        .filter(|f| f.as_typed_reference().is_some_and(|r| r.delegate))
        .cloned()
        .collect();

    let mut added = Vec::new();
    for reference in delegating {
        let Some(mixin) = reference.as_typed_reference().map(|r| &r.mixin) else {
            continue;
        };
        let Some(mixin_fields) = mixins.get(mixin) else {
            continue;
        };
        for (name, source) in mixin_fields {
            if owner.fields.contains_key(name) {
                continue;
            }
            owner
                .fields
                .insert(name.clone(), Field::mirror_of(&reference, source));
            added.push(name.clone());
        }
    }
    added
}
