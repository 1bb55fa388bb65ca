//! # Signaling Receivers
//!
//! Hooks observing `test_signals.signaling_model` without touching its
//! definition:
//!
//! - `pre_save`: rejects blank names.
//! - `post_save` and `post_unlink`: append to the [`AuditLog`].
//! - `write_wrapper`: records each rename as `old -> new`.

use crate::model::SIGNALING_MODEL;
use kindred_framework::{
    Dispatcher, HookError, Proceed, RecordId, Signal, SignalEvent, WrapperSignal,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Name of the signal or wrapper that produced the entry.
    pub hook: String,
    pub kind: String,
    pub ids: Vec<RecordId>,
    pub detail: Option<String>,
}

/// Shared, append-only list of audit entries.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl AuditLog {
    fn lock(&self) -> MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, entry: AuditEntry) {
        info!(hook = %entry.hook, kind = %entry.kind, ids = ?entry.ids, "Audit");
        self.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Registers every signaling hook on `dispatcher`.
pub fn install(dispatcher: &mut Dispatcher, audit: &AuditLog) {
    dispatcher.receiver(Signal::PreSave, Some(SIGNALING_MODEL), reject_blank_name);

    for signal in [Signal::PostSave, Signal::PostUnlink] {
        let audit = audit.clone();
        dispatcher.receiver(signal, Some(SIGNALING_MODEL), move |signal, event| {
            audit.push(AuditEntry {
                hook: signal.to_string(),
                kind: event.sender.clone(),
                ids: event.ids.clone(),
                detail: None,
            });
            Ok(())
        });
    }

    let audit = audit.clone();
    dispatcher.wrapper(
        WrapperSignal::Write,
        Some(SIGNALING_MODEL),
        move |event: &SignalEvent, proceed: Proceed<'_>| {
            let before: Vec<String> = event.records.iter().map(|r| r.get("name").to_string()).collect();
            let outcome = proceed.proceed()?;
            for (old, record) in before.iter().zip(&outcome.records) {
                let new = record.get("name").to_string();
                if *old != new {
                    audit.push(AuditEntry {
                        hook: WrapperSignal::Write.to_string(),
                        kind: event.sender.clone(),
                        ids: vec![record.id],
                        detail: Some(format!("{old} -> {new}")),
                    });
                }
            }
            Ok(())
        },
    );
}

fn reject_blank_name(_signal: Signal, event: &SignalEvent) -> Result<(), HookError> {
    match event.values.get("name").and_then(|v| v.as_text()) {
        Some(name) if name.trim().is_empty() => Err("name must not be blank".into()),
        _ => Ok(()),
    }
}
