//! # Per-Instance Event Dispatch
//!
//! Every observable instance owns one [`Dispatcher`]: a mapping from event
//! key to its ordered listener list. Dispatch is synchronous and
//! single-threaded; listener callbacks run to completion before the
//! triggering call returns.
//!
//! ```text
//! ┌─────────┐  set / trigger  ┌────────────┐  in order  ┌──────────┐
//! │ Mutator │────────────────▶│ Dispatcher │───────────▶│ Listener │
//! └─────────┘                 └────────────┘            └──────────┘
//!                                   │
//!                             ┌─────▼─────┐
//!                             │ EventKey  │
//!                             └───────────┘
//! ```
//!
//! Subscriptions are described by an [`EventSpec`]: the event key plus an
//! optional guard, the name of an attribute on the target that must be
//! truthy at trigger time for the callback to run. The guard is a
//! structured field rather than a suffix spliced into the event name, so
//! names containing separator characters stay unambiguous.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use thiserror::Error;
use tracing::trace;
use uuid::Uuid;

use crate::value::Value;

/// Event identity.
///
/// The three `Change*` variants are the reserved keys emitted on every
/// observed-attribute mutation, in declaration order below. `Custom` covers
/// application-defined events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// Some observed attribute on the instance changed.
    Change,
    /// The named attribute changed.
    ChangeAttr(String),
    /// The named attribute changed to a specific rendered value.
    ChangeValue { attribute: String, value: String },
    /// Application-defined event.
    Custom(String),
}

impl EventKey {
    pub fn change_of(attribute: impl Into<String>) -> Self {
        Self::ChangeAttr(attribute.into())
    }

    /// Value-keyed change event; `value` is rendered through its `Display`
    /// form.
    pub fn change_to(attribute: impl Into<String>, value: &Value) -> Self {
        Self::ChangeValue {
            attribute: attribute.into(),
            value: value.to_string(),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Change => f.write_str("change"),
            EventKey::ChangeAttr(attribute) => write!(f, "change:{}", attribute),
            EventKey::ChangeValue { attribute, value } => {
                write!(f, "change:{}:{}", attribute, value)
            }
            EventKey::Custom(name) => f.write_str(name),
        }
    }
}

/// Subscription descriptor: which event to listen for, optionally gated by
/// a guard attribute on the target.
#[derive(Debug, Clone)]
pub struct EventSpec {
    key: EventKey,
    guard: Option<String>,
}

impl EventSpec {
    pub fn on(key: EventKey) -> Self {
        Self { key, guard: None }
    }

    /// Gate the subscription on `attribute` holding a truthy value on the
    /// target at trigger time. A falsy guard skips the callback but leaves
    /// the subscription in place.
    pub fn when(mut self, attribute: impl Into<String>) -> Self {
        self.guard = Some(attribute.into());
        self
    }

    pub fn key(&self) -> &EventKey {
        &self.key
    }

    pub fn guard(&self) -> Option<&str> {
        self.guard.as_deref()
    }
}

impl From<EventKey> for EventSpec {
    fn from(key: EventKey) -> Self {
        Self::on(key)
    }
}

type Callback = Rc<dyn Fn(&[Value])>;

#[derive(Clone)]
struct Listener {
    id: Uuid,
    guard: Option<String>,
    once: bool,
    callback: Callback,
}

type Slots = HashMap<EventKey, Vec<Listener>>;

/// Per-instance event dispatcher.
///
/// Insertion order is invocation order. Intentionally not `Send`: the
/// design assumes a single logical thread of control, with reentrant
/// triggers allowed and cross-thread use not.
#[derive(Default)]
pub struct Dispatcher {
    slots: Rc<RefCell<Slots>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for the event described by `spec`.
    pub fn subscribe(
        &self,
        spec: impl Into<EventSpec>,
        callback: impl Fn(&[Value]) + 'static,
    ) -> ListenerHandle {
        self.attach(spec.into(), Rc::new(callback), false)
    }

    /// Like [`subscribe`](Dispatcher::subscribe), but the listener removes
    /// itself after its first invocation that satisfies its guard.
    pub fn subscribe_once(
        &self,
        spec: impl Into<EventSpec>,
        callback: impl Fn(&[Value]) + 'static,
    ) -> ListenerHandle {
        self.attach(spec.into(), Rc::new(callback), true)
    }

    /// Invoke every listener currently registered for `key`, in
    /// registration order, passing `args`. No-op when nothing is
    /// subscribed.
    ///
    /// `guard_eval` resolves a guard attribute name to its truthiness on
    /// the dispatching instance. Iteration runs over a snapshot and
    /// re-checks liveness per listener, so a callback may unsubscribe
    /// itself or others mid-dispatch. Once-listeners are removed before
    /// their callback runs; a reentrant trigger cannot fire them twice.
    pub fn emit(&self, key: &EventKey, args: &[Value], guard_eval: &dyn Fn(&str) -> bool) {
        let snapshot = match self.slots.borrow().get(key) {
            Some(listeners) if !listeners.is_empty() => listeners.clone(),
            _ => return,
        };
        trace!(event = %key, listeners = snapshot.len(), "dispatching");
        for listener in snapshot {
            let live = self
                .slots
                .borrow()
                .get(key)
                .map_or(false, |l| l.iter().any(|x| x.id == listener.id));
            if !live {
                continue;
            }
            if let Some(guard) = &listener.guard {
                if !guard_eval(guard) {
                    continue;
                }
            }
            if listener.once {
                remove_listener(&self.slots, key, listener.id);
            }
            (listener.callback)(args);
        }
    }

    /// Number of listeners currently registered for `key`.
    pub fn subscribers(&self, key: &EventKey) -> usize {
        self.slots.borrow().get(key).map_or(0, Vec::len)
    }

    fn attach(&self, spec: EventSpec, callback: Callback, once: bool) -> ListenerHandle {
        let EventSpec { key, guard } = spec;
        let id = Uuid::new_v4();
        self.slots
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .push(Listener {
                id,
                guard,
                once,
                callback,
            });
        ListenerHandle {
            key,
            id,
            slots: Rc::downgrade(&self.slots),
        }
    }
}

fn remove_listener(slots: &RefCell<Slots>, key: &EventKey, id: Uuid) -> bool {
    let mut slots = slots.borrow_mut();
    match slots.get_mut(key) {
        Some(listeners) => {
            let before = listeners.len();
            listeners.retain(|listener| listener.id != id);
            let removed = listeners.len() != before;
            if listeners.is_empty() {
                slots.remove(key);
            }
            removed
        }
        None => false,
    }
}

/// Handle to a registered listener.
///
/// Dropping the handle does not detach the listener; removal happens only
/// through [`unlisten`](ListenerHandle::unlisten) or once-semantics.
#[derive(Debug)]
pub struct ListenerHandle {
    key: EventKey,
    id: Uuid,
    slots: Weak<RefCell<Slots>>,
}

impl ListenerHandle {
    /// Remove the listener. Idempotent; returns whether a listener was
    /// actually removed. A handle outliving its dispatcher is a no-op.
    pub fn unlisten(&self) -> bool {
        match self.slots.upgrade() {
            Some(slots) => remove_listener(&slots, &self.key, self.id),
            None => false,
        }
    }

    pub fn key(&self) -> &EventKey {
        &self.key
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum EventError {
    /// `listen_to` was handed an absent target.
    #[error("listen target is absent")]
    InvalidTarget,
}

pub type EventResult<T> = Result<T, EventError>;
