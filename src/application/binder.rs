//! Two-way binding between form nodes and a nested state.
//!
//! A [`StateBinder`] scans a root for nodes carrying the [`BIND_MARKER`],
//! registers each one under its declared path and keeps a single listener
//! informed of every value change, whether the user changed a node or the
//! program called [`StateBinder::set_state`].
//!
//! # Usage
//!
//! ```ignore
//! let binder = StateBinder::new(&form)?;
//! binder.on_state_update(|change| println!("{} = {}", change.field, change.data));
//!
//! binder.set_state(&nested(json!({"dotsOptions": {"color": "#ffffff"}})))?;
//! assert_eq!(binder.get_state()["dotsOptions"]["color"], "#ffffff");
//! ```
//!
//! # Invariants
//!
//! 1. At most one node is registered per path, and paths never change after
//!    construction.
//! 2. No registered path is a strict prefix of another, so
//!    [`StateBinder::get_state`] always unflattens cleanly.
//! 3. Without a listener, notifications are dropped. With one, every node
//!    event and every written `set_state` pair produces exactly one
//!    synchronous notification.
//! 4. No internal borrow is held while the listener runs, so the listener
//!    may call back into the binder.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::domain::{
    BinderError, BinderResult, FlatState, NestedState, StateChange, Value, check_paths, flatten,
    unflatten,
};

/// Marker that makes a node discoverable by the binder.
pub const BIND_MARKER: &str = "node";

/// Field read and written when a node does not declare one.
pub const DEFAULT_DATA_FIELD: &str = "value";

/// Event listened to when a node does not declare one.
pub const DEFAULT_CHANGE_EVENT: &str = "change";

/// Callback a node invokes when one of its events fires.
pub type NodeCallback = Rc<dyn Fn()>;

/// Callback receiving every state change.
pub type StateListener = Rc<dyn Fn(&StateChange)>;

/// A form control the binder can read, write and observe.
pub trait BindableNode {
    /// Path of this node in the nested state, if declared.
    fn binding_path(&self) -> Option<&str>;

    /// Field holding the node's value, when it is not [`DEFAULT_DATA_FIELD`].
    fn data_field(&self) -> Option<&str> {
        None
    }

    /// Event signalling a value change, when it is not [`DEFAULT_CHANGE_EVENT`].
    fn change_event(&self) -> Option<&str> {
        None
    }

    fn get_value(&self, field: &str) -> Value;

    /// Writes a value. Must not fire the node's own events.
    fn set_value(&self, field: &str, value: Value);

    fn subscribe(&self, event: &str, callback: NodeCallback);
}

/// Something that can list the bindable nodes below it.
pub trait NodeDiscovery {
    /// Returns every node carrying `marker`, in document order.
    fn discover(&self, marker: &str) -> Vec<Rc<dyn BindableNode>>;
}

/// Outcome of a [`StateBinder::set_state`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Paths written to a node, in notification order.
    pub written: Vec<String>,
    /// Paths with no registered node.
    pub skipped: Vec<String>,
}

struct Binding {
    node: Rc<dyn BindableNode>,
    field: String,
}

impl Binding {
    fn read(&self) -> Value {
        self.node.get_value(&self.field)
    }

    fn write(&self, value: Value) {
        self.node.set_value(&self.field, value);
    }
}

struct BinderInner {
    bindings: IndexMap<String, Binding>,
    listener: RefCell<Option<StateListener>>,
}

impl BinderInner {
    fn notify(&self, field: &str, data: Value) {
        let listener = self.listener.borrow().clone();
        match listener {
            Some(listener) => {
                tracing::debug!(field, "notifying state listener");
                listener(&StateChange::new(field, data));
            }
            None => tracing::trace!(field, "no state listener registered"),
        }
    }

    fn on_node_event(&self, path: &str) {
        if let Some(binding) = self.bindings.get(path) {
            let data = binding.read();
            self.notify(path, data);
        }
    }
}

/// Keeps bound nodes and a nested state view in sync.
///
/// Cloning yields another handle to the same binder.
#[derive(Clone)]
pub struct StateBinder {
    inner: Rc<BinderInner>,
}

impl fmt::Debug for StateBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateBinder")
            .field("paths", &self.inner.bindings.keys().collect::<Vec<_>>())
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl StateBinder {
    /// Builds a binder over every marked node below `root`.
    ///
    /// All nodes are validated before any subscription is made, so a failed
    /// construction leaves the nodes untouched.
    ///
    /// # Errors
    ///
    /// - [`BinderError::MissingBindingPath`] when a node has no path.
    /// - [`BinderError::DuplicateBindingPath`] when two nodes share a path.
    /// - [`BinderError::Path`] when a path has an empty segment or is a
    ///   prefix of another path.
    pub fn new(root: &dyn NodeDiscovery) -> BinderResult<Self> {
        let mut bindings = IndexMap::new();

        for (index, node) in root.discover(BIND_MARKER).into_iter().enumerate() {
            let path = node
                .binding_path()
                .ok_or(BinderError::MissingBindingPath { index })?
                .to_string();
            let field = node.data_field().unwrap_or(DEFAULT_DATA_FIELD).to_string();

            match bindings.entry(path) {
                Entry::Occupied(entry) => {
                    return Err(BinderError::DuplicateBindingPath(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(Binding { node, field });
                }
            }
        }

        check_paths(bindings.keys().map(String::as_str))?;

        let inner = Rc::new(BinderInner {
            bindings,
            listener: RefCell::new(None),
        });

        for (path, binding) in &inner.bindings {
            let event =
                normalize_event(binding.node.change_event().unwrap_or(DEFAULT_CHANGE_EVENT));
            let weak = Rc::downgrade(&inner);
            let subscribed_path = path.clone();
            binding.node.subscribe(
                event,
                Rc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_node_event(&subscribed_path);
                    }
                }),
            );
        }

        tracing::debug!(nodes = inner.bindings.len(), "state binder created");
        Ok(Self { inner })
    }

    /// Reads every bound node into a nested state.
    pub fn get_state(&self) -> NestedState {
        let flat = self.get_flat_state();
        unflatten(&flat).unwrap_or_else(|err| {
            // Registered paths were checked at construction.
            tracing::error!(%err, "bound paths no longer unflatten");
            NestedState::new()
        })
    }

    /// Reads every bound node, keyed by path in registration order.
    pub fn get_flat_state(&self) -> FlatState {
        self.inner
            .bindings
            .iter()
            .map(|(path, binding)| (path.clone(), binding.read()))
            .collect()
    }

    /// Current value of the node bound at `path`.
    pub fn value_of(&self, path: &str) -> Option<Value> {
        self.inner.bindings.get(path).map(Binding::read)
    }

    /// Registered paths in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.inner.bindings.keys().map(String::as_str)
    }

    /// Writes a partial nested update into the bound nodes.
    ///
    /// Pairs are applied in depth-first key order. Each written pair
    /// notifies the listener once, exactly as a user-driven change would.
    /// Paths with no bound node are logged and skipped; the rest of the
    /// batch still applies.
    ///
    /// # Errors
    ///
    /// Returns [`BinderError::Path`] without writing anything when the
    /// update has a key that is empty or contains `.`.
    pub fn set_state(&self, update: &NestedState) -> BinderResult<ApplyReport> {
        let flat = flatten(update)?;
        let mut report = ApplyReport::default();

        for (path, value) in flat {
            let Some(binding) = self.inner.bindings.get(&path) else {
                tracing::warn!(path = %path, "no node bound to path, skipping");
                report.skipped.push(path);
                continue;
            };

            binding.write(value.clone());
            self.inner.notify(&path, value);
            report.written.push(path);
        }

        Ok(report)
    }

    /// Replaces the state listener. Only the latest listener is notified.
    pub fn on_state_update(&self, listener: impl Fn(&StateChange) + 'static) {
        if self.inner.listener.replace(Some(Rc::new(listener))).is_some() {
            tracing::debug!("replaced state listener");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.inner.listener.borrow().is_some()
    }

    /// A handle that does not keep the binder alive.
    ///
    /// Listeners that call back into the binder should capture this rather
    /// than a [`StateBinder`], which would form a reference cycle.
    pub fn downgrade(&self) -> WeakStateBinder {
        WeakStateBinder {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning handle to a [`StateBinder`].
#[derive(Clone)]
pub struct WeakStateBinder {
    inner: Weak<BinderInner>,
}

impl WeakStateBinder {
    pub fn upgrade(&self) -> Option<StateBinder> {
        self.inner.upgrade().map(|inner| StateBinder { inner })
    }
}

/// Strips an `on` prefix from declared event names (`oninput` -> `input`).
pub fn normalize_event(event: &str) -> &str {
    event.strip_prefix("on").unwrap_or(event)
}
