//! Context management for unit-of-work chains.
//!
//! This module provides:
//! - The shared, mutable [`Context`] passed through a chain of units
//! - The dynamic [`AttributeBag`] backing it
//! - The [`CallLedger`] of completed units that drives rollback
//! - The [`RunIdentity`] correlating a context's lifetime in logs

mod bag;
mod identity;
mod ledger;

pub use bag::AttributeBag;
pub use identity::RunIdentity;
pub use ledger::CallLedger;

use crate::errors::Failure;
use crate::events::{get_event_sink, EventSink};
use crate::unit::UnitHandle;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

struct ContextInner {
    identity: RunIdentity,
    attributes: AttributeBag,
    ledger: CallLedger,
    failed: AtomicBool,
    rolled_back: AtomicBool,
    sink: RwLock<Arc<dyn EventSink>>,
}

/// The shared attribute bag, outcome state and call ledger passed through
/// a chain of units.
///
/// A `Context` is a cheap-clone handle: every clone refers to the same
/// underlying state, so each unit in a chain observes the writes of the
/// units before it. Attribute reads of absent keys return the
/// [`serde_json::Value::Null`] sentinel rather than failing, and any name
/// is a legal attribute.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

/// A source a [`Context`] can be built from: an existing context (reused
/// as-is) or a plain attribute map (seeding a fresh context).
pub enum ContextSource {
    /// An in-flight context, passed through unchanged.
    Existing(Context),
    /// Raw key/value pairs for a fresh context.
    Values(HashMap<String, serde_json::Value>),
}

impl From<Context> for ContextSource {
    fn from(context: Context) -> Self {
        Self::Existing(context)
    }
}

impl From<&Context> for ContextSource {
    fn from(context: &Context) -> Self {
        Self::Existing(context.clone())
    }
}

impl From<HashMap<String, serde_json::Value>> for ContextSource {
    fn from(values: HashMap<String, serde_json::Value>) -> Self {
        Self::Values(values)
    }
}

impl Context {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::from_values(HashMap::new())
    }

    /// Creates a context with a specific identity.
    #[must_use]
    pub fn with_identity(identity: RunIdentity) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                identity,
                attributes: AttributeBag::new(),
                ledger: CallLedger::new(),
                failed: AtomicBool::new(false),
                rolled_back: AtomicBool::new(false),
                sink: RwLock::new(get_event_sink()),
            }),
        }
    }

    /// Creates a context seeded from key/value pairs.
    #[must_use]
    pub fn from_values(values: HashMap<String, serde_json::Value>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                identity: RunIdentity::new(),
                attributes: AttributeBag::from_values(values),
                ledger: CallLedger::new(),
                failed: AtomicBool::new(false),
                rolled_back: AtomicBool::new(false),
                sink: RwLock::new(get_event_sink()),
            }),
        }
    }

    /// Builds a context from either an existing context or raw values.
    ///
    /// An existing context is returned unchanged (the same shared
    /// instance, not a copy), so callers can hand either raw data or an
    /// in-flight context to a chain without double-wrapping.
    #[must_use]
    pub fn build(source: impl Into<ContextSource>) -> Self {
        match source.into() {
            ContextSource::Existing(context) => context,
            ContextSource::Values(values) => Self::from_values(values),
        }
    }

    /// Sets the event sink for this context.
    #[must_use]
    pub fn with_event_sink(self, sink: Arc<dyn EventSink>) -> Self {
        *self.inner.sink.write() = sink;
        self
    }

    /// Returns true if `self` and `other` are handles to the same
    /// underlying context.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.inner.identity
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.inner.identity.run_id
    }

    /// Gets an attribute value, or `Value::Null` when the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> serde_json::Value {
        self.inner
            .attributes
            .get(key)
            .unwrap_or(serde_json::Value::Null)
    }

    /// Gets an attribute deserialized into a concrete type.
    ///
    /// Returns `None` when the key is absent, null, or the stored value
    /// does not deserialize into `T`.
    #[must_use]
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get(key) {
            serde_json::Value::Null => None,
            value => serde_json::from_value(value).ok(),
        }
    }

    /// Sets an attribute, overwriting any previous value.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.inner.attributes.set(key, value);
    }

    /// Merges key/value pairs into the attributes, one set at a time.
    pub fn merge(&self, values: HashMap<String, serde_json::Value>) {
        self.inner.attributes.merge(values);
    }

    /// Checks if an attribute is present (including explicit nulls).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.attributes.contains_key(key)
    }

    /// Returns all attribute keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.attributes.keys()
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.attributes.len()
    }

    /// Returns true if no attributes are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.attributes.is_empty()
    }

    /// Returns a detached copy of all attributes.
    ///
    /// Mutating the returned map does not affect the context.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        self.inner.attributes.to_dict()
    }

    /// Returns the destructuring view: all attributes plus `success` and
    /// `failure` booleans merged over any colliding attribute names.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, serde_json::Value> {
        let mut view = self.to_dict();
        view.insert("success".to_string(), serde_json::json!(self.success()));
        view.insert("failure".to_string(), serde_json::json!(self.failure()));
        view
    }

    /// Returns true if the context has not been failed.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.failure()
    }

    /// Returns true if the context has been failed.
    #[must_use]
    pub fn failure(&self) -> bool {
        self.inner.failed.load(Ordering::SeqCst)
    }

    /// Fails the context and returns the typed failure signal.
    ///
    /// The extras are merged into the attributes one set at a time
    /// before the failure flag goes up, so a rescuer observing the failed
    /// context sees the merged values. Failing an already-failed context
    /// merges again and returns a fresh signal; the flag stays set.
    ///
    /// Callers propagate the signal themselves:
    ///
    /// ```rust,ignore
    /// return Err(ctx.fail(extra).into());
    /// ```
    pub fn fail(&self, extra: HashMap<String, serde_json::Value>) -> Failure {
        self.merge(extra);
        self.inner.failed.store(true, Ordering::SeqCst);

        debug!(run_id = %self.inner.identity.run_id, "context failed");
        self.emit("context.failed", None);

        Failure::new(self.clone())
    }

    /// Records a unit as successfully completed.
    ///
    /// Called by the invocation machinery immediately after a unit's body
    /// returns normally, never by the unit itself.
    pub fn record_completion(&self, unit: UnitHandle) {
        debug!(
            run_id = %self.inner.identity.run_id,
            unit = %unit.name(),
            "unit completed"
        );
        self.inner.ledger.record(unit);
    }

    /// Rolls back every completed unit, newest first.
    ///
    /// Returns `false` immediately when a rollback already ran (nothing
    /// to do). Otherwise each ledgered unit receives exactly one
    /// compensation call in reverse completion order; a compensation
    /// error is logged and does not stop the traversal. The ledger stays
    /// inspectable afterwards.
    pub fn rollback(&self) -> bool {
        if self.inner.rolled_back.load(Ordering::SeqCst) {
            return false;
        }

        let entries = self.inner.ledger.entries();
        self.emit(
            "context.rollback",
            Some(serde_json::json!({ "units": entries.len() })),
        );

        for unit in entries.iter().rev() {
            warn!(
                run_id = %self.inner.identity.run_id,
                unit = %unit.name(),
                "rolling back unit"
            );
            if let Err(error) = unit.rollback(self) {
                warn!(
                    run_id = %self.inner.identity.run_id,
                    unit = %unit.name(),
                    error = %error,
                    "compensation failed, continuing rollback"
                );
            }
        }

        self.inner.rolled_back.store(true, Ordering::SeqCst);
        true
    }

    /// Returns true if a rollback has completed on this context.
    #[must_use]
    pub fn rolled_back(&self) -> bool {
        self.inner.rolled_back.load(Ordering::SeqCst)
    }

    /// Returns the names of completed units, in completion order.
    #[must_use]
    pub fn called(&self) -> Vec<String> {
        self.inner.ledger.names()
    }

    /// Returns the call ledger.
    #[must_use]
    pub fn ledger(&self) -> &CallLedger {
        &self.inner.ledger
    }

    /// Emits an event through this context's sink, enriched with the run
    /// identity and the current outcome flag.
    pub fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        let mut enriched = data.unwrap_or(serde_json::json!({}));

        if let serde_json::Value::Object(ref mut map) = enriched {
            for (key, value) in self.inner.identity.to_dict() {
                map.insert(key, value);
            }
            map.insert("failed".to_string(), serde_json::json!(self.failure()));
        }

        let sink = self.inner.sink.read().clone();
        sink.emit(event_type, Some(enriched));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("run_id", &self.inner.identity.run_id)
            .field("failed", &self.failure())
            .field("rolled_back", &self.rolled_back())
            .field("attributes", &self.keys())
            .field("called", &self.called())
            .finish()
    }
}
