//! # Store
//!
//! The in-memory host engine: it owns every record, runs each operation as a
//! transaction and turns every lifecycle step into signals.
//!
//! ## Operation order
//!
//! ```text
//! wrappers (outermost first)
//!   └─ Pre<Op>  →  PreSave          (create / write only)
//!        apply plain values, then mirrored inverses
//!      Post<Op> →  PostSave         (create / write only)
//!      Modified                     (only if some value changed)
//! ```
//!
//! Any error, from validation, a receiver, a wrapper or a nested write-through,
//! rolls back every record change made by the operation.
//!
//! ## Mirrored fields
//!
//! Mirrored fields are not stored. [`Store::read`] computes them from the
//! referenced record; writing one goes through its inverse rule, which is a
//! regular write on the referenced record (with its own signals); searching on
//! one is rewritten into a traversal of the reference.

use crate::domain::Predicate;
use crate::error::{FrameworkError, SetupError};
use crate::field::{ComputeRule, Field, FieldType, InverseRule};
use crate::kind::Kind;
use crate::record::{Record, RecordId, RecordSet, Values};
use crate::registry::Registry;
use crate::signals::{Dispatcher, Outcome, Signal, SignalEvent, WrapperSignal};
use crate::typed_reference::Selection;
use crate::value::{RecordRef, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Every record of a store, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SetupError> {
        serde_json::to_string_pretty(self).map_err(|e| SetupError::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        serde_json::from_str(json).map_err(|e| SetupError::Snapshot(e.to_string()))
    }
}

/// First-touch copies of the records changed by the running operation.
#[derive(Debug, Default)]
struct Journal {
    originals: Vec<(String, RecordId, Option<Record>)>,
    seen: HashSet<(String, RecordId)>,
}

impl Journal {
    fn remember(&mut self, kind: &str, id: RecordId, original: Option<Record>) {
        if self.seen.insert((kind.to_string(), id)) {
            self.originals.push((kind.to_string(), id, original));
        }
    }
}

/// The record store.
#[derive(Debug)]
pub struct Store {
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
    tables: HashMap<String, BTreeMap<RecordId, Record>>,
    next_ids: HashMap<String, u32>,
    journal: Journal,
}

impl Store {
    pub fn new(registry: Arc<Registry>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
            tables: HashMap::new(),
            next_ids: HashMap::new(),
            journal: Journal::default(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Number of records of `kind`.
    pub fn len(&self, kind: &str) -> usize {
        self.tables.get(kind).map_or(0, BTreeMap::len)
    }

    // --- Public operations ---

    pub fn create(&mut self, kind: &str, values: Values) -> Result<RecordId, FrameworkError> {
        self.transaction("create", |store| store.create_record(kind, &values))
    }

    pub fn write(&mut self, kind: &str, ids: &[RecordId], values: Values) -> Result<Vec<Record>, FrameworkError> {
        self.transaction("write", |store| store.write_records(kind, ids, &values))
    }

    pub fn unlink(&mut self, kind: &str, ids: &[RecordId]) -> Result<(), FrameworkError> {
        self.transaction("unlink", |store| store.unlink_records(kind, ids))
    }

    /// One record, with its mirrored fields computed.
    pub fn read(&self, kind_name: &str, id: RecordId) -> Result<Record, FrameworkError> {
        let kind = self.registry.get(kind_name)?;
        let mut record = self
            .stored(kind_name, id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound {
                kind: kind_name.to_string(),
                id,
            })?;
        for field in kind.mirrors() {
            let value = self.compute(&record, field);
            record.values.insert(field.name.clone(), value);
        }
        Ok(record)
    }

    pub fn browse(&self, kind: &str, ids: &[RecordId]) -> Result<RecordSet, FrameworkError> {
        let records = ids
            .iter()
            .map(|&id| self.read(kind, id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RecordSet::new(kind, records))
    }

    /// Records of `kind_name` matching every predicate, by ascending id.
    pub fn search(&self, kind_name: &str, domain: &[Predicate]) -> Result<RecordSet, FrameworkError> {
        let kind = self.registry.get(kind_name)?;
        let predicates = domain
            .iter()
            .map(|p| rewrite(kind, p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::new();
        if let Some(table) = self.tables.get(kind_name) {
            for record in table.values() {
                if self.matches_all(record, &predicates)? {
                    records.push(self.read(kind_name, record.id)?);
                }
            }
        }
        debug!(kind = kind_name, domain = ?predicates, found = records.len(), "Search");
        Ok(RecordSet::new(kind_name, records))
    }

    /// Acceptable targets of the typed reference `kind.field`.
    pub fn selection(&self, kind: &str, field: &str) -> Result<Selection, FrameworkError> {
        self.registry.selection(kind, field)
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut records: Vec<Record> = self
            .tables
            .values()
            .flat_map(BTreeMap::values)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.kind.cmp(&b.kind).then(a.id.cmp(&b.id)));
        Snapshot { records }
    }

    /// Loads persisted records, validating them against the schema first.
    ///
    /// Every stored value must fit its field, and every reference must name
    /// an acceptable kind and a record present in the snapshot or already in
    /// the store. A stored typed reference naming a kind outside its
    /// acceptable targets is reported as an invalid selection. Records whose
    /// id is already taken are refused, not replaced. Nothing is loaded when
    /// any record is rejected. Stored values of mirrored fields are dropped
    /// since they are always computed.
    pub fn load(&mut self, snapshot: Snapshot) -> Result<(), SetupError> {
        let mut incoming: HashSet<(String, RecordId)> = HashSet::new();
        for record in &snapshot.records {
            if self.stored(&record.kind, record.id).is_some()
                || !incoming.insert((record.kind.clone(), record.id))
            {
                return Err(SetupError::Snapshot(format!(
                    "record {}({}) already exists",
                    record.kind, record.id
                )));
            }
        }
        let exists = |target: &RecordRef| {
            incoming.contains(&(target.kind.clone(), target.id)) || self.stored(&target.kind, target.id).is_some()
        };

        let mut accepted = Vec::with_capacity(snapshot.records.len());
        let mut next_ids: HashMap<String, u32> = HashMap::new();
        for mut record in snapshot.records {
            let kind = self
                .registry
                .kind(&record.kind)
                .ok_or_else(|| SetupError::UnknownKind(record.kind.clone()))?;
            if kind.is_abstract {
                return Err(SetupError::Snapshot(format!(
                    "abstract kind {} cannot hold records",
                    kind.name
                )));
            }
            let next = record.id.0.checked_add(1).ok_or_else(|| {
                SetupError::Snapshot(format!("record id {} of {} is out of range", record.id, kind.name))
            })?;
            for (name, value) in &record.values {
                let field = kind.field(name).ok_or_else(|| {
                    SetupError::Snapshot(format!("unknown field {}.{}", kind.name, name))
                })?;
                if field.is_mirror() {
                    continue;
                }
                if !field.field_type.accepts(value) {
                    return Err(SetupError::Snapshot(format!(
                        "{value} does not fit {}.{}",
                        kind.name, name
                    )));
                }
                let Value::Ref(target) = value else {
                    continue;
                };
                let acceptable = match &field.field_type {
                    FieldType::TypedReference(reference) => reference.accepts(&self.registry, &target.kind),
                    FieldType::Many2one { target: expected } => self.registry.implements(&target.kind, expected),
                    _ => true,
                };
                if !acceptable {
                    return Err(SetupError::InvalidSelection {
                        kind: kind.name.clone(),
                        field: name.clone(),
                        value: target.kind.clone(),
                    });
                }
                if !exists(target) {
                    return Err(SetupError::Snapshot(format!(
                        "{}.{} of record {} points to missing {target}",
                        kind.name, name, record.id
                    )));
                }
            }
            record
                .values
                .retain(|name, _| kind.field(name).is_some_and(|f| !f.is_mirror()));
            let entry = next_ids.entry(record.kind.clone()).or_insert(1);
            *entry = (*entry).max(next);
            accepted.push(record);
        }

        let count = accepted.len();
        for (kind, next) in next_ids {
            let current = self.next_ids.entry(kind).or_insert(1);
            *current = (*current).max(next);
        }
        for record in accepted {
            self.tables
                .entry(record.kind.clone())
                .or_default()
                .insert(record.id, record);
        }
        info!(records = count, "Snapshot loaded");
        Ok(())
    }

    // --- Transactions ---

    fn transaction<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, FrameworkError>,
    ) -> Result<T, FrameworkError> {
        let outer = std::mem::take(&mut self.journal);
        let result = f(self);
        let journal = std::mem::replace(&mut self.journal, outer);
        if let Err(e) = &result {
            warn!(operation, error = %e, changes = journal.originals.len(), "Rolled back");
            self.rollback(journal);
        }
        result
    }

    fn rollback(&mut self, journal: Journal) {
        for (kind, id, original) in journal.originals.into_iter().rev() {
            let table = self.tables.entry(kind).or_default();
            match original {
                Some(record) => {
                    table.insert(id, record);
                }
                None => {
                    table.remove(&id);
                }
            }
        }
    }

    fn stored(&self, kind: &str, id: RecordId) -> Option<&Record> {
        self.tables.get(kind)?.get(&id)
    }

    fn put(&mut self, record: Record) {
        let original = self.stored(&record.kind, record.id).cloned();
        self.journal.remember(&record.kind, record.id, original);
        self.tables
            .entry(record.kind.clone())
            .or_default()
            .insert(record.id, record);
    }

    fn take(&mut self, kind: &str, id: RecordId) -> Option<Record> {
        let removed = self.tables.get_mut(kind)?.remove(&id)?;
        self.journal.remember(kind, id, Some(removed.clone()));
        Some(removed)
    }

    fn next_id(&mut self, kind: &str) -> Result<RecordId, FrameworkError> {
        let next = self.next_ids.entry(kind.to_string()).or_insert(1);
        let id = RecordId(*next);
        *next = next
            .checked_add(1)
            .ok_or_else(|| FrameworkError::IdsExhausted(kind.to_string()))?;
        Ok(id)
    }

    // --- Lifecycle ---

    fn create_record(&mut self, kind_name: &str, values: &Values) -> Result<RecordId, FrameworkError> {
        let registry = Arc::clone(&self.registry);
        let kind = registry.get(kind_name)?;
        if kind.is_abstract {
            return Err(FrameworkError::AbstractKind(kind_name.to_string()));
        }
        self.check_values(kind, values)?;

        let event = SignalEvent {
            sender: kind_name.to_string(),
            values: values.clone(),
            fields: values.keys().cloned().collect(),
            ..SignalEvent::default()
        };
        let dispatcher = Arc::clone(&self.dispatcher);
        let mut created = None;
        dispatcher.wrap(WrapperSignal::Create, &event, &mut || -> Result<Outcome, FrameworkError> {
            dispatcher.send(Signal::PreCreate, &event)?;
            dispatcher.send(Signal::PreSave, &event)?;

            let id = self.next_id(kind_name)?;
            let mut record = Record::new(kind_name, id);
            for field in kind.fields.values().filter(|f| !f.is_mirror()) {
                let value = values
                    .get(&field.name)
                    .cloned()
                    .or_else(|| field.default.clone())
                    .unwrap_or_default();
                record.values.insert(field.name.clone(), value);
            }
            self.put(record);
            self.apply_inverses(kind, &[id], values)?;
            let record = self.read(kind_name, id)?;
            info!(kind = kind_name, %id, size = self.len(kind_name), "Created");

            let post = SignalEvent {
                ids: vec![id],
                ..event.clone()
            };
            dispatcher.send(Signal::PostCreate, &post)?;
            dispatcher.send(Signal::PostSave, &post)?;
            let changed: Vec<String> = record
                .values
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(name, _)| name.clone())
                .collect();
            if !changed.is_empty() {
                dispatcher.send(
                    Signal::Modified,
                    &SignalEvent {
                        fields: changed,
                        ..post
                    },
                )?;
            }
            created = Some(id);
            Ok(Outcome::applied(vec![record]))
        })?;

        created.ok_or_else(|| FrameworkError::Vetoed {
            signal: WrapperSignal::Create,
            sender: kind_name.to_string(),
        })
    }

    fn write_records(&mut self, kind_name: &str, ids: &[RecordId], values: &Values) -> Result<Vec<Record>, FrameworkError> {
        let registry = Arc::clone(&self.registry);
        let kind = registry.get(kind_name)?;
        self.check_values(kind, values)?;
        let before = ids
            .iter()
            .map(|&id| self.read(kind_name, id))
            .collect::<Result<Vec<_>, _>>()?;

        let event = SignalEvent {
            sender: kind_name.to_string(),
            ids: ids.to_vec(),
            values: values.clone(),
            fields: values.keys().cloned().collect(),
            records: before.clone(),
        };
        let dispatcher = Arc::clone(&self.dispatcher);
        let outcome = dispatcher.wrap(WrapperSignal::Write, &event, &mut || -> Result<Outcome, FrameworkError> {
            dispatcher.send(Signal::PreWrite, &event)?;
            dispatcher.send(Signal::PreSave, &event)?;

            for &id in ids {
                let mut record = self
                    .stored(kind_name, id)
                    .cloned()
                    .ok_or_else(|| FrameworkError::NotFound {
                        kind: kind_name.to_string(),
                        id,
                    })?;
                for (name, value) in values {
                    if kind.field(name).is_some_and(|f| !f.is_mirror()) {
                        record.values.insert(name.clone(), value.clone());
                    }
                }
                self.put(record);
            }
            self.apply_inverses(kind, ids, values)?;
            let after = ids
                .iter()
                .map(|&id| self.read(kind_name, id))
                .collect::<Result<Vec<_>, _>>()?;
            info!(kind = kind_name, ids = ?ids, "Updated");

            dispatcher.send(Signal::PostWrite, &event)?;
            dispatcher.send(Signal::PostSave, &event)?;
            let changed = changed_fields(&before, &after);
            if !changed.is_empty() {
                dispatcher.send(
                    Signal::Modified,
                    &SignalEvent {
                        fields: changed,
                        ..event.clone()
                    },
                )?;
            }
            Ok(Outcome::applied(after))
        })?;
        Ok(outcome.records)
    }

    fn unlink_records(&mut self, kind_name: &str, ids: &[RecordId]) -> Result<(), FrameworkError> {
        let before = ids
            .iter()
            .map(|&id| self.read(kind_name, id))
            .collect::<Result<Vec<_>, _>>()?;
        let event = SignalEvent {
            sender: kind_name.to_string(),
            ids: ids.to_vec(),
            records: before,
            ..SignalEvent::default()
        };
        let dispatcher = Arc::clone(&self.dispatcher);
        dispatcher.wrap(WrapperSignal::Unlink, &event, &mut || -> Result<Outcome, FrameworkError> {
            dispatcher.send(Signal::PreUnlink, &event)?;
            for &id in ids {
                self.take(kind_name, id);
            }
            info!(kind = kind_name, ids = ?ids, size = self.len(kind_name), "Deleted");
            dispatcher.send(Signal::PostUnlink, &event)?;
            Ok(Outcome::applied(Vec::new()))
        })?;
        Ok(())
    }

    // --- Validation ---

    fn check_values(&self, kind: &Kind, values: &Values) -> Result<(), FrameworkError> {
        for (name, value) in values {
            let field = kind.field(name).ok_or_else(|| FrameworkError::UnknownField {
                kind: kind.name.clone(),
                field: name.clone(),
            })?;
            if let Some(rules) = &field.mirror {
                if rules.inverse.is_none() {
                    return Err(FrameworkError::ReadonlyField {
                        kind: kind.name.clone(),
                        field: name.clone(),
                    });
                }
            }
            if !field.field_type.accepts(value) {
                return Err(FrameworkError::InvalidValue {
                    kind: kind.name.clone(),
                    field: name.clone(),
                    reason: format!("{value} does not fit {:?}", field.field_type),
                });
            }
            self.check_reference(kind, field, value)?;
        }
        Ok(())
    }

    fn check_reference(&self, kind: &Kind, field: &Field, value: &Value) -> Result<(), FrameworkError> {
        let Value::Ref(target) = value else {
            return Ok(());
        };
        let acceptable = match &field.field_type {
            FieldType::TypedReference(reference) => reference.accepts(&self.registry, &target.kind),
            FieldType::Many2one { target: expected } => self.registry.implements(&target.kind, expected),
            _ => true,
        };
        if !acceptable || self.stored(&target.kind, target.id).is_none() {
            return Err(FrameworkError::InvalidReference {
                kind: kind.name.clone(),
                field: field.name.clone(),
                target: target.to_string(),
            });
        }
        Ok(())
    }

    // --- Mirrored fields ---

    fn compute(&self, record: &Record, field: &Field) -> Value {
        let Some(rules) = &field.mirror else {
            return record.get(&field.name).clone();
        };
        let ComputeRule::CopyFrom { reference, source } = &rules.compute;
        record
            .get(reference)
            .as_record_ref()
            .and_then(|target| self.stored(&target.kind, target.id))
            .map(|target| target.get(source).clone())
            .unwrap_or_default()
    }

    /// Writes mirrored values through to the referenced records.
    fn apply_inverses(&mut self, kind: &Kind, ids: &[RecordId], values: &Values) -> Result<(), FrameworkError> {
        for (name, value) in values {
            let Some(rules) = kind.field(name).and_then(|f| f.mirror.as_ref()) else {
                continue;
            };
            let Some(InverseRule::WriteThrough { reference, source }) = &rules.inverse else {
                return Err(FrameworkError::ReadonlyField {
                    kind: kind.name.clone(),
                    field: name.clone(),
                });
            };
            for &id in ids {
                let target = self
                    .stored(&kind.name, id)
                    .and_then(|r| r.get(reference).as_record_ref().cloned())
                    .filter(|t| self.stored(&t.kind, t.id).is_some());
                let Some(target) = target else {
                    return Err(FrameworkError::MissingReference {
                        kind: kind.name.clone(),
                        id,
                        field: name.clone(),
                        reference: reference.clone(),
                    });
                };
                debug!(kind = %kind.name, %id, field = %name, target = %target, "Writing through");
                let mut through = Values::new();
                through.insert(source.clone(), value.clone());
                self.write_records(&target.kind, &[target.id], &through)?;
            }
        }
        Ok(())
    }

    // --- Search ---

    fn matches_all(&self, record: &Record, predicates: &[Predicate]) -> Result<bool, FrameworkError> {
        for predicate in predicates {
            match self.resolve_path(record, &predicate.path, false)? {
                Some(value) if predicate.matches(&value) => continue,
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Follows `path` from `record`; `None` when it crosses an unset reference.
    ///
    /// The first segment has already been checked by [`rewrite`]; every field
    /// reached through a reference must be searchable too.
    fn resolve_path(&self, record: &Record, path: &str, traversed: bool) -> Result<Option<Value>, FrameworkError> {
        let kind = self.registry.get(&record.kind)?;
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let field = kind.field(head).ok_or_else(|| FrameworkError::UnknownField {
            kind: kind.name.clone(),
            field: head.to_string(),
        })?;
        let searchable = match &field.mirror {
            Some(rules) => rules.search.is_some(),
            None => field.searchable,
        };
        if traversed && !searchable {
            return Err(FrameworkError::UnsupportedSearch {
                kind: kind.name.clone(),
                field: head.to_string(),
            });
        }
        let value = self.compute(record, field);
        let Some(rest) = rest else {
            return Ok(Some(value));
        };
        match value
            .as_record_ref()
            .and_then(|target| self.stored(&target.kind, target.id))
        {
            Some(target) => self.resolve_path(target, rest, true),
            None => Ok(None),
        }
    }
}

/// Replaces predicates on mirrored fields by traversals of their reference.
fn rewrite(kind: &Kind, predicate: &Predicate) -> Result<Predicate, FrameworkError> {
    let (head, rest) = predicate.split_path();
    let field = kind.field(head).ok_or_else(|| FrameworkError::UnknownField {
        kind: kind.name.clone(),
        field: head.to_string(),
    })?;
    let unsupported = || FrameworkError::UnsupportedSearch {
        kind: kind.name.clone(),
        field: head.to_string(),
    };
    if rest.is_some() && !field.field_type.is_reference() {
        return Err(FrameworkError::UnknownField {
            kind: kind.name.clone(),
            field: predicate.path.clone(),
        });
    }
    if let Some(rules) = &field.mirror {
        let rule = rules.search.as_ref().ok_or_else(unsupported)?;
        let path = match rest {
            Some(rest) => format!("{}.{rest}", rule.path()),
            None => rule.path(),
        };
        return Ok(Predicate {
            path,
            ..predicate.clone()
        });
    }
    if !field.searchable {
        return Err(unsupported());
    }
    Ok(predicate.clone())
}

/// Names of the fields whose value differs between `before` and `after`.
fn changed_fields(before: &[Record], after: &[Record]) -> Vec<String> {
    let mut changed: Vec<String> = Vec::new();
    for (old, new) in before.iter().zip(after) {
        for (name, value) in &new.values {
            if old.get(name) != value && !changed.contains(name) {
                changed.push(name.clone());
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::kind::KindDef;
    use crate::values;

    fn store() -> Store {
        let mut builder = Registry::builder();
        builder.register(
            KindDef::new("note")
                .field(Field::char("title"))
                .field(Field::integer("size").with_default(1i64)),
        );
        Store::new(
            Arc::new(builder.build().unwrap()),
            Arc::new(Dispatcher::new()),
        )
    }

    #[test]
    fn defaults_fill_missing_values() {
        let mut store = store();
        let id = store.create("note", values! { "title" => "a" }).unwrap();
        let note = store.read("note", id).unwrap();
        assert_eq!(note.get("size"), &Value::Integer(1));
        assert_eq!(id, RecordId(1));
    }

    #[test]
    fn failed_transaction_restores_every_record() {
        let mut store = store();
        let a = store.create("note", values! { "title" => "a" }).unwrap();
        let result: Result<(), FrameworkError> = store.transaction("test", |s| {
            s.write_records("note", &[a], &values! { "title" => "changed" })?;
            s.create_record("note", &values! { "title" => "b" })?;
            Err(FrameworkError::UnknownKind("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.len("note"), 1);
        assert_eq!(store.read("note", a).unwrap().get("title"), &Value::from("a"));
    }

    #[test]
    fn type_mismatch_and_unknown_fields_are_rejected() {
        let mut store = store();
        assert!(matches!(
            store.create("note", values! { "size" => "big" }),
            Err(FrameworkError::InvalidValue { .. })
        ));
        assert!(matches!(
            store.create("note", values! { "colour" => "red" }),
            Err(FrameworkError::UnknownField { .. })
        ));
        assert!(matches!(
            store.write("note", &[RecordId(7)], values! {}),
            Err(FrameworkError::NotFound { .. })
        ));
    }

    #[test]
    fn changed_fields_compares_each_pair() {
        let mut before = Record::new("note", 1u32);
        before.values.insert("title".into(), Value::from("a"));
        before.values.insert("size".into(), Value::Integer(1));
        let mut after = before.clone();
        after.values.insert("size".into(), Value::Integer(2));
        assert_eq!(changed_fields(&[before.clone()], &[after]), vec!["size"]);
        assert!(changed_fields(&[before.clone()], &[before]).is_empty());
    }

    #[test]
    fn loading_the_last_id_is_refused() {
        let mut store = store();
        let err = store
            .load(Snapshot {
                records: vec![Record::new("note", u32::MAX)],
            })
            .unwrap_err();
        assert!(matches!(err, SetupError::Snapshot(_)));
        assert_eq!(store.len("note"), 0);
    }

    #[test]
    fn create_fails_once_ids_run_out() {
        let mut store = store();
        store
            .load(Snapshot {
                records: vec![Record::new("note", u32::MAX - 1)],
            })
            .unwrap();
        assert!(matches!(
            store.create("note", values! { "title" => "late" }),
            Err(FrameworkError::IdsExhausted(kind)) if kind == "note"
        ));
        assert_eq!(store.len("note"), 1);
    }

    #[test]
    fn traversing_a_plain_field_is_rejected() {
        let store = store();
        assert!(matches!(
            store.search("note", &[Predicate::parse("title.name", "=", "x").unwrap()]),
            Err(FrameworkError::UnknownField { .. })
        ));
    }
}
