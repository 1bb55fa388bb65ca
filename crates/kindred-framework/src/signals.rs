//! # Signal Dispatcher
//!
//! The store turns every lifecycle step into a named signal; independent
//! receivers subscribe to the signals they care about instead of being wired
//! into the kinds that trigger them.
//!
//! ## Receivers
//!
//! A receiver is registered against a [`Signal`] and an optional sender kind.
//! When a signal fires for kind `K`, the receivers registered for `K` run
//! first, then the wildcard ones (registered with no sender), each group in
//! registration order.
//!
//! ## Wrappers
//!
//! A wrapper surrounds a whole operation (create, write or unlink). It gets a
//! [`Proceed`] continuation: code before `proceed()` is the pre-phase, code
//! after it the post-phase, and the [`Outcome`] returned by `proceed()` holds
//! the records as they are after the operation. A wrapper that returns without
//! calling `proceed()` vetoes the operation.
//!
//! Wrappers nest in dispatch order: the first one is the outermost, so its
//! pre-phase runs first and its post-phase last.
//!
//! ## Failures
//!
//! Dispatch is synchronous and fail-fast. The first receiver or wrapper error
//! stops dispatch and aborts the triggering operation.
//!
//! ```
//! use kindred_framework::{Dispatcher, Signal};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.receiver(Signal::PreCreate, Some("test.model"), |_signal, event| {
//!     if event.values.contains_key("forbidden") {
//!         return Err("forbidden field".into());
//!     }
//!     Ok(())
//! });
//! assert_eq!(dispatcher.receiver_count(Signal::PreCreate, "test.model"), 1);
//! ```

use crate::error::{FrameworkError, HookError};
use crate::record::{Record, RecordId, Values};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;
use tracing::debug;

/// Point events fired by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    PreCreate,
    PostCreate,
    PreWrite,
    PostWrite,
    /// Fires before both create and write.
    PreSave,
    /// Fires after both create and write.
    PostSave,
    /// Fires after create or write when some field value actually changed.
    Modified,
    PreUnlink,
    PostUnlink,
}

impl Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::PreCreate => "pre_create",
            Signal::PostCreate => "post_create",
            Signal::PreWrite => "pre_write",
            Signal::PostWrite => "post_write",
            Signal::PreSave => "pre_save",
            Signal::PostSave => "post_save",
            Signal::Modified => "modified",
            Signal::PreUnlink => "pre_unlink",
            Signal::PostUnlink => "post_unlink",
        };
        f.write_str(s)
    }
}

/// Operations a wrapper can surround.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperSignal {
    Create,
    Write,
    Unlink,
}

impl Display for WrapperSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WrapperSignal::Create => "create_wrapper",
            WrapperSignal::Write => "write_wrapper",
            WrapperSignal::Unlink => "unlink_wrapper",
        };
        f.write_str(s)
    }
}

/// Either kind of hook, for error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Signal(Signal),
    Wrapper(WrapperSignal),
}

impl Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Signal(s) => s.fmt(f),
            Hook::Wrapper(w) => w.fmt(f),
        }
    }
}

/// Payload handed to receivers and wrappers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalEvent {
    /// Kind of the records the operation acts on.
    pub sender: String,
    pub ids: Vec<RecordId>,
    /// Values passed to create or write.
    pub values: Values,
    /// Names of the fields involved. For [`Signal::Modified`], the fields whose
    /// value changed.
    pub fields: Vec<String>,
    /// The affected records as they were before the operation.
    pub records: Vec<Record>,
}

impl SignalEvent {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..Self::default()
        }
    }
}

/// What a wrapped operation produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// False when some wrapper vetoed the operation.
    pub applied: bool,
    /// The affected records after the operation. Empty for unlink.
    pub records: Vec<Record>,
}

impl Outcome {
    pub fn applied(records: Vec<Record>) -> Self {
        Self {
            applied: true,
            records,
        }
    }

    pub fn vetoed() -> Self {
        Self::default()
    }
}

/// A callback run when a signal fires.
pub trait Receiver: Send + Sync {
    fn receive(&self, signal: Signal, event: &SignalEvent) -> Result<(), HookError>;
}

impl<F> Receiver for F
where
    F: Fn(Signal, &SignalEvent) -> Result<(), HookError> + Send + Sync,
{
    fn receive(&self, signal: Signal, event: &SignalEvent) -> Result<(), HookError> {
        self(signal, event)
    }
}

/// Continuation running the rest of a wrapped operation.
///
/// `proceed` consumes the handle, so the operation runs at most once.
pub struct Proceed<'a> {
    next: &'a mut dyn FnMut() -> Result<Outcome, HookError>,
}

impl<'a> Proceed<'a> {
    fn new(next: &'a mut dyn FnMut() -> Result<Outcome, HookError>) -> Self {
        Self { next }
    }

    /// Runs the inner wrappers and the operation itself.
    pub fn proceed(self) -> Result<Outcome, HookError> {
        (self.next)()
    }
}

/// A callback surrounding an operation.
pub trait Wrapper: Send + Sync {
    fn wrap(&self, event: &SignalEvent, proceed: Proceed<'_>) -> Result<(), HookError>;
}

impl<F> Wrapper for F
where
    F: for<'a> Fn(&SignalEvent, Proceed<'a>) -> Result<(), HookError> + Send + Sync,
{
    fn wrap(&self, event: &SignalEvent, proceed: Proceed<'_>) -> Result<(), HookError> {
        self(event, proceed)
    }
}

type Registered<T> = Vec<(Option<String>, Arc<T>)>;

/// Registry of receivers and wrappers.
///
/// Filled during the load phase through `&mut self`, then shared read-only
/// (behind an `Arc`) with the store.
#[derive(Default)]
pub struct Dispatcher {
    receivers: HashMap<Signal, Registered<dyn Receiver>>,
    wrappers: HashMap<WrapperSignal, Registered<dyn Wrapper>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("receivers", &self.receivers.values().map(Vec::len).sum::<usize>())
            .field("wrappers", &self.wrappers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` whenever `signal` fires for `sender`, or for any kind if
    /// `sender` is `None`.
    pub fn receiver<F>(&mut self, signal: Signal, sender: Option<&str>, f: F) -> &mut Self
    where
        F: Fn(Signal, &SignalEvent) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.register_receiver(signal, sender, Arc::new(f))
    }

    pub fn register_receiver(
        &mut self,
        signal: Signal,
        sender: Option<&str>,
        receiver: Arc<dyn Receiver>,
    ) -> &mut Self {
        debug!(%signal, sender = sender.unwrap_or("*"), "Receiver registered");
        self.receivers
            .entry(signal)
            .or_default()
            .push((sender.map(str::to_string), receiver));
        self
    }

    /// Wraps every `signal` operation on `sender` (any kind if `None`) in `f`.
    pub fn wrapper<F>(&mut self, signal: WrapperSignal, sender: Option<&str>, f: F) -> &mut Self
    where
        F: for<'a> Fn(&SignalEvent, Proceed<'a>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.register_wrapper(signal, sender, Arc::new(f))
    }

    pub fn register_wrapper(
        &mut self,
        signal: WrapperSignal,
        sender: Option<&str>,
        wrapper: Arc<dyn Wrapper>,
    ) -> &mut Self {
        debug!(%signal, sender = sender.unwrap_or("*"), "Wrapper registered");
        self.wrappers
            .entry(signal)
            .or_default()
            .push((sender.map(str::to_string), wrapper));
        self
    }

    pub fn receiver_count(&self, signal: Signal, sender: &str) -> usize {
        self.receivers
            .get(&signal)
            .map_or(0, |entries| matching(entries, sender).len())
    }

    pub fn wrapper_count(&self, signal: WrapperSignal, sender: &str) -> usize {
        self.wrappers
            .get(&signal)
            .map_or(0, |entries| matching(entries, sender).len())
    }

    /// Fires `signal`, running every matching receiver to completion.
    pub fn send(&self, signal: Signal, event: &SignalEvent) -> Result<(), FrameworkError> {
        let Some(entries) = self.receivers.get(&signal) else {
            return Ok(());
        };
        for receiver in matching(entries, &event.sender) {
            debug!(%signal, sender = %event.sender, ids = ?event.ids, "Dispatching");
            receiver
                .receive(signal, event)
                .map_err(|e| hook_failed(Hook::Signal(signal), &event.sender, e))?;
        }
        Ok(())
    }

    /// Runs `op` inside every matching wrapper.
    ///
    /// Returns [`FrameworkError::Vetoed`] when a wrapper did not proceed.
    pub fn wrap(
        &self,
        signal: WrapperSignal,
        event: &SignalEvent,
        op: &mut dyn FnMut() -> Result<Outcome, FrameworkError>,
    ) -> Result<Outcome, FrameworkError> {
        let chain = self
            .wrappers
            .get(&signal)
            .map(|entries| matching(entries, &event.sender))
            .unwrap_or_default();
        if chain.is_empty() {
            return op();
        }

        let mut inner = || op().map_err(|e| Box::new(e) as HookError);
        let outcome = run_chain(&chain, event, &mut inner)
            .map_err(|e| hook_failed(Hook::Wrapper(signal), &event.sender, e))?;
        if !outcome.applied {
            debug!(%signal, sender = %event.sender, "Vetoed");
            return Err(FrameworkError::Vetoed {
                signal,
                sender: event.sender.clone(),
            });
        }
        Ok(outcome)
    }
}

/// Sender-specific entries first, then wildcard ones.
fn matching<T: ?Sized>(entries: &[(Option<String>, Arc<T>)], sender: &str) -> Vec<Arc<T>> {
    let specific = entries.iter().filter(|(s, _)| s.as_deref() == Some(sender));
    let wildcard = entries.iter().filter(|(s, _)| s.is_none());
    specific.chain(wildcard).map(|(_, hook)| Arc::clone(hook)).collect()
}

fn run_chain(
    chain: &[Arc<dyn Wrapper>],
    event: &SignalEvent,
    op: &mut dyn FnMut() -> Result<Outcome, HookError>,
) -> Result<Outcome, HookError> {
    let Some((outer, rest)) = chain.split_first() else {
        return op();
    };
    let mut outcome = Outcome::vetoed();
    let mut next = || -> Result<Outcome, HookError> {
        let inner = run_chain(rest, event, op)?;
        outcome = inner.clone();
        Ok(inner)
    };
    outer.wrap(event, Proceed::new(&mut next))?;
    Ok(outcome)
}

/// Framework errors raised inside hooks keep their identity.
fn hook_failed(hook: Hook, sender: &str, error: HookError) -> FrameworkError {
    match error.downcast::<FrameworkError>() {
        Ok(framework) => *framework,
        Err(source) => FrameworkError::Hook {
            hook,
            sender: sender.to_string(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn log_receiver(log: &Log, tag: &'static str) -> impl Fn(Signal, &SignalEvent) -> Result<(), HookError> {
        let log = Arc::clone(log);
        move |_, _| {
            log.lock().unwrap().push(tag.to_string());
            Ok(())
        }
    }

    #[test]
    fn specific_receivers_run_before_wildcards() {
        let log: Log = Arc::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .receiver(Signal::PostCreate, None, log_receiver(&log, "any-1"))
            .receiver(Signal::PostCreate, Some("k"), log_receiver(&log, "k-1"))
            .receiver(Signal::PostCreate, Some("other"), log_receiver(&log, "other"))
            .receiver(Signal::PostCreate, Some("k"), log_receiver(&log, "k-2"))
            .receiver(Signal::PostCreate, None, log_receiver(&log, "any-2"));

        dispatcher
            .send(Signal::PostCreate, &SignalEvent::new("k"))
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["k-1", "k-2", "any-1", "any-2"]);
    }

    #[test]
    fn failing_receiver_stops_dispatch() {
        let log: Log = Arc::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .receiver(Signal::PreWrite, Some("k"), |_, _| Err("boom".into()))
            .receiver(Signal::PreWrite, Some("k"), log_receiver(&log, "after"));

        let err = dispatcher
            .send(Signal::PreWrite, &SignalEvent::new("k"))
            .unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::Hook {
                hook: Hook::Signal(Signal::PreWrite),
                ..
            }
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn wrappers_nest_first_outermost() {
        let log: Log = Arc::default();
        let mut dispatcher = Dispatcher::new();
        for tag in ["outer", "inner"] {
            let log = Arc::clone(&log);
            dispatcher.wrapper(WrapperSignal::Write, Some("k"), move |_event: &SignalEvent, proceed: Proceed<'_>| {
                log.lock().unwrap().push(format!("{tag}:before"));
                proceed.proceed()?;
                log.lock().unwrap().push(format!("{tag}:after"));
                Ok(())
            });
        }

        let op_log = Arc::clone(&log);
        let mut op = || -> Result<Outcome, FrameworkError> {
            op_log.lock().unwrap().push("op".to_string());
            Ok(Outcome::applied(Vec::new()))
        };
        let outcome = dispatcher
            .wrap(WrapperSignal::Write, &SignalEvent::new("k"), &mut op)
            .unwrap();
        assert!(outcome.applied);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:before", "inner:before", "op", "inner:after", "outer:after"]
        );
    }

    #[test]
    fn wrapper_that_does_not_proceed_vetoes() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.wrapper(WrapperSignal::Unlink, None, |_event: &SignalEvent, _proceed: Proceed<'_>| Ok(()));

        let mut ran = false;
        let mut op = || -> Result<Outcome, FrameworkError> {
            ran = true;
            Ok(Outcome::applied(Vec::new()))
        };
        let err = dispatcher
            .wrap(WrapperSignal::Unlink, &SignalEvent::new("k"), &mut op)
            .unwrap_err();
        assert!(matches!(err, FrameworkError::Vetoed { .. }));
        assert!(!ran);
    }

    #[test]
    fn operation_errors_pass_through_wrappers_unchanged() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.wrapper(WrapperSignal::Create, None, |_event: &SignalEvent, proceed: Proceed<'_>| {
            proceed.proceed()?;
            Ok(())
        });

        let mut op = || -> Result<Outcome, FrameworkError> { Err(FrameworkError::UnknownKind("nope".into())) };
        let err = dispatcher
            .wrap(WrapperSignal::Create, &SignalEvent::new("k"), &mut op)
            .unwrap_err();
        assert!(matches!(err, FrameworkError::UnknownKind(_)));
    }
}
