//! # Registry
//!
//! The registry is the schema service every other component depends on. It
//! has two phases:
//!
//! 1. **Load**: kinds are declared on a [`RegistryBuilder`]. Nothing can be
//!    queried yet.
//! 2. **Read-only**: [`RegistryBuilder::build`] validates the declarations,
//!    resolves inheritance, fills the mixin registry, sets up typed
//!    references and synthesizes mirrored fields. The resulting [`Registry`]
//!    never changes and is shared behind an `Arc`.
//!
//! Any inconsistency found while building is a [`SetupError`], which aborts
//! loading before the first record is touched.

use crate::error::{FrameworkError, SetupError};
use crate::field::Field;
use crate::kind::{Kind, KindDef};
use crate::typed_reference::{synthesize_mirrors, Selection};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Collects kind declarations during the load phase.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    defs: Vec<KindDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: KindDef) -> &mut Self {
        debug!(kind = %def.name, "Registering kind");
        self.defs.push(def);
        self
    }

    /// Builds the read-only registry.
    pub fn build(self) -> Result<Registry, SetupError> {
        let mut defs: IndexMap<String, KindDef> = IndexMap::new();
        for def in self.defs {
            check_fields(&def)?;
            if defs.contains_key(&def.name) {
                return Err(SetupError::DuplicateKind(def.name));
            }
            defs.insert(def.name.clone(), def);
        }
        for def in defs.values() {
            if let Some(parent) = def.inherits.iter().find(|p| !defs.contains_key(p.as_str())) {
                return Err(SetupError::UnknownParent {
                    kind: def.name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let mut resolved: HashMap<String, Kind> = HashMap::new();
        for name in defs.keys() {
            resolve(name, &defs, &mut resolved, &mut HashSet::new())?;
        }
        let mut kinds: IndexMap<String, Kind> = IndexMap::new();
        for name in defs.keys() {
            if let Some(kind) = resolved.remove(name) {
                kinds.insert(name.clone(), kind);
            }
        }

        let mut implementers: HashMap<String, BTreeSet<String>> = HashMap::new();
        for kind in kinds.values() {
            for mixin in std::iter::once(&kind.name).chain(kind.ancestors.iter()) {
                implementers
                    .entry(mixin.clone())
                    .or_default()
                    .insert(kind.name.clone());
            }
        }

        let mut registry = Registry {
            kinds,
            implementers,
        };

        for kind in registry.kinds.values() {
            for field in kind.fields.values() {
                if let Some(reference) = field.as_typed_reference() {
                    reference.setup(&registry, &kind.name, &field.name)?;
                }
            }
        }

        // Mirrors are built from the mixins' fields as they were before any
        // mirror was added, so the result does not depend on kind order.
        let mixins: IndexMap<String, IndexMap<String, Field>> = registry
            .kinds
            .values()
            .flat_map(|k| k.fields.values())
            .filter_map(|f| f.as_typed_reference())
            .filter(|r| r.delegate)
            .filter_map(|r| {
                registry
                    .kinds
                    .get(&r.mixin)
                    .map(|m| (r.mixin.clone(), m.fields.clone()))
            })
            .collect();
        for kind in registry.kinds.values_mut() {
            let added = synthesize_mirrors(kind, &mixins);
            if !added.is_empty() {
                debug!(kind = %kind.name, fields = ?added, "Mirrored fields added");
            }
        }

        info!(kinds = registry.kinds.len(), "Registry built");
        Ok(registry)
    }
}

fn check_fields(def: &KindDef) -> Result<(), SetupError> {
    let mut seen = HashSet::new();
    for field in &def.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SetupError::DuplicateField {
                kind: def.name.clone(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn resolve(
    name: &str,
    defs: &IndexMap<String, KindDef>,
    resolved: &mut HashMap<String, Kind>,
    visiting: &mut HashSet<String>,
) -> Result<(), SetupError> {
    if resolved.contains_key(name) {
        return Ok(());
    }
    if !visiting.insert(name.to_string()) {
        return Err(SetupError::InheritanceCycle(name.to_string()));
    }
    let Some(def) = defs.get(name) else {
        return Err(SetupError::UnknownParent {
            kind: name.to_string(),
            parent: name.to_string(),
        });
    };

    let mut ancestors: Vec<String> = Vec::new();
    let mut fields: IndexMap<String, Field> = IndexMap::new();
    for parent in &def.inherits {
        resolve(parent, defs, resolved, visiting)?;
        let Some(parent_kind) = resolved.get(parent) else {
            continue;
        };
        for ancestor in std::iter::once(&parent_kind.name).chain(parent_kind.ancestors.iter()) {
            if !ancestors.contains(ancestor) {
                ancestors.push(ancestor.clone());
            }
        }
        for (field_name, field) in &parent_kind.fields {
            // Mirrors are synthesized per kind later on.
            if !field.is_mirror() {
                fields.insert(field_name.clone(), field.clone());
            }
        }
    }
    for field in &def.fields {
        fields.insert(field.name.clone(), field.clone());
    }

    visiting.remove(name);
    resolved.insert(
        name.to_string(),
        Kind {
            name: def.name.clone(),
            description: def.description.clone(),
            is_abstract: def.is_abstract,
            ancestors,
            fields,
        },
    );
    Ok(())
}

/// The read-only schema: every kind plus the mixin registry.
#[derive(Debug, Clone)]
pub struct Registry {
    kinds: IndexMap<String, Kind>,
    /// Mixin (or parent kind) → every kind inheriting it, itself included.
    implementers: HashMap<String, BTreeSet<String>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn kind(&self, name: &str) -> Option<&Kind> {
        self.kinds.get(name)
    }

    /// Like [`kind`](Self::kind), for runtime lookups.
    pub fn get(&self, name: &str) -> Result<&Kind, FrameworkError> {
        self.kind(name)
            .ok_or_else(|| FrameworkError::UnknownKind(name.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &Kind> {
        self.kinds.values()
    }

    pub fn is_concrete(&self, kind: &str) -> bool {
        self.kind(kind).is_some_and(|k| !k.is_abstract)
    }

    /// Concrete kinds implementing `mixin`, sorted by name.
    pub fn implementers(&self, mixin: &str) -> Vec<String> {
        self.implementers
            .get(mixin)
            .into_iter()
            .flatten()
            .filter(|k| self.is_concrete(k))
            .cloned()
            .collect()
    }

    /// Whether `kind` is `mixin` or inherits it, directly or not.
    pub fn implements(&self, kind: &str, mixin: &str) -> bool {
        self.implementers
            .get(mixin)
            .is_some_and(|set| set.contains(kind))
    }

    /// Acceptable targets of the typed reference `kind.field`.
    pub fn selection(&self, kind: &str, field: &str) -> Result<Selection, FrameworkError> {
        let reference = self
            .get(kind)?
            .field(field)
            .and_then(Field::as_typed_reference)
            .ok_or_else(|| FrameworkError::UnknownField {
                kind: kind.to_string(),
                field: field.to_string(),
            })?;
        Ok(reference.selection(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed_reference::TypedReference;

    fn builder() -> RegistryBuilder {
        let mut builder = Registry::builder();
        builder
            .register(
                KindDef::new("mixin")
                    .abstract_kind()
                    .field(Field::char("test").with_default("Hello")),
            )
            .register(KindDef::new("a").inherits("mixin").description("Kind A"))
            .register(KindDef::new("b").inherits("mixin"))
            .register(KindDef::new("b.sub").inherits("b"))
            .register(KindDef::new("b.template").inherits("b").abstract_kind());
        builder
    }

    #[test]
    fn implementers_are_transitive_and_concrete() {
        let registry = builder().build().unwrap();
        assert_eq!(registry.implementers("mixin"), vec!["a", "b", "b.sub"]);
        assert!(registry.implements("b.template", "mixin"));
        assert!(registry.implements("b.sub", "b"));
        assert!(!registry.implements("a", "b"));
    }

    #[test]
    fn inherited_fields_are_resolved() {
        let registry = builder().build().unwrap();
        let sub = registry.kind("b.sub").unwrap();
        assert_eq!(sub.ancestors, vec!["b", "mixin"]);
        assert!(sub.field("test").is_some());
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let mut builder = Registry::builder();
        builder.register(
            KindDef::new("x")
                .field(Field::char("name"))
                .field(Field::integer("name")),
        );
        assert_eq!(
            builder.build().unwrap_err(),
            SetupError::DuplicateField {
                kind: "x".into(),
                field: "name".into()
            }
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let mut builder = Registry::builder();
        builder
            .register(KindDef::new("x").inherits("y"))
            .register(KindDef::new("y").inherits("x"));
        assert!(matches!(
            builder.build().unwrap_err(),
            SetupError::InheritanceCycle(_)
        ));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut builder = Registry::builder();
        builder.register(KindDef::new("x").inherits("missing"));
        assert!(matches!(
            builder.build().unwrap_err(),
            SetupError::UnknownParent { .. }
        ));
    }

    #[test]
    fn unknown_mixin_is_rejected() {
        let mut builder = Registry::builder();
        builder.register(
            KindDef::new("owner")
                .field(Field::typed_reference("ref", TypedReference::new("nowhere"))),
        );
        assert!(matches!(
            builder.build().unwrap_err(),
            SetupError::UnknownMixin { .. }
        ));
    }
}
