//! Observable model composition.
//!
//! [`Model`] is the base the rest of the crate composes into: a concrete
//! type supplies its declaration table and its dispatcher, and gets the
//! instrumented write path, subscription surface, attribute enumeration
//! and snapshots as provided methods.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::dispatcher::{
    Dispatcher, EventError, EventKey, EventResult, EventSpec, ListenerHandle,
};
use crate::schema::Schema;
use crate::value::Value;

/// Errors from the instrumented attribute write path.
#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("attribute is read-only: {0}")]
    ReadOnlyAttribute(String),

    /// The validation predicate rejected the assignment; the attribute
    /// keeps its previous value and no events fire.
    #[error("validation rejected for {attribute}: {value}")]
    ValidationRejected { attribute: String, value: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// An observable object with declared observed attributes.
///
/// Implementors provide [`schema`](Model::schema) (built once behind a
/// `OnceLock` static) and [`dispatcher`](Model::dispatcher) (one per
/// instance); everything else is provided. Constructors conventionally
/// touch `Self::schema()` so the chain is instrumented when the first
/// instance is built.
pub trait Model: Sized + 'static {
    /// The declaration table for this concrete type.
    fn schema() -> &'static Schema<Self>;

    /// This instance's event dispatcher.
    fn dispatcher(&self) -> &Dispatcher;

    /// Read a declared attribute (getter-only attributes included).
    fn get(&self, name: &str) -> Option<Value> {
        Self::schema()
            .attribute(name)
            .map(|attribute| attribute.value_of(self))
    }

    /// The instrumented write path: validate, write, then notify.
    ///
    /// On acceptance the write is followed synchronously by three events in
    /// fixed order: [`EventKey::Change`] with the attribute name and new
    /// value, [`EventKey::ChangeAttr`] with the new value, and
    /// [`EventKey::ChangeValue`] with no arguments (both coordinates are in
    /// the key). On rejection the attribute keeps its previous value, a
    /// diagnostic is logged, no events fire, and the rejection is returned
    /// for the caller to judge.
    fn set(&mut self, name: &str, value: Value) -> ModelResult<()> {
        let attribute = Self::schema()
            .attribute(name)
            .ok_or_else(|| ModelError::UnknownAttribute(name.to_string()))?;
        let write = attribute
            .writer()
            .ok_or_else(|| ModelError::ReadOnlyAttribute(name.to_string()))?;
        if !attribute.accepts(&value) {
            warn!(
                attribute = name,
                value = %value,
                kind = %value.kind(),
                "invalid value rejected; attribute unchanged"
            );
            return Err(ModelError::ValidationRejected {
                attribute: name.to_string(),
                value: value.to_string(),
            });
        }

        write(self, value.clone());

        self.trigger(
            &EventKey::Change,
            &[Value::String(name.to_string()), value.clone()],
        );
        self.trigger(&EventKey::change_of(name), &[value.clone()]);
        self.trigger(&EventKey::change_to(name, &value), &[]);
        Ok(())
    }

    /// Dispatch `key` on this instance. Guarded listeners resolve their
    /// guard attribute against this instance's current values; a guard
    /// naming an undeclared attribute evaluates falsy.
    fn trigger(&self, key: &EventKey, args: &[Value]) {
        let guard_eval =
            |attribute: &str| self.get(attribute).map_or(false, |value| value.is_truthy());
        self.dispatcher().emit(key, args, &guard_eval);
    }

    /// Subscribe `callback` on `target`. An absent target is the one hard
    /// failure of the subscription surface.
    fn listen_to<T: Model>(
        &self,
        target: Option<&T>,
        spec: impl Into<EventSpec>,
        callback: impl Fn(&[Value]) + 'static,
    ) -> EventResult<ListenerHandle> {
        let target = target.ok_or(EventError::InvalidTarget)?;
        Ok(target.dispatcher().subscribe(spec, callback))
    }

    /// Like [`listen_to`](Model::listen_to), but the subscription removes
    /// itself after its first invocation that satisfies its guard.
    fn listen_to_once<T: Model>(
        &self,
        target: Option<&T>,
        spec: impl Into<EventSpec>,
        callback: impl Fn(&[Value]) + 'static,
    ) -> EventResult<ListenerHandle> {
        let target = target.ok_or(EventError::InvalidTarget)?;
        Ok(target.dispatcher().subscribe_once(spec, callback))
    }

    /// Ordered observed attribute names across the declaration chain.
    fn props(&self) -> &'static [&'static str] {
        Self::schema().props()
    }

    /// Plain mapping of every observed attribute to its current value.
    fn to_snapshot(&self) -> HashMap<String, Value> {
        Self::schema()
            .props()
            .iter()
            .filter_map(|name| self.get(name).map(|value| (name.to_string(), value)))
            .collect()
    }

    /// The snapshot as a plain JSON object.
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            Self::schema()
                .props()
                .iter()
                .filter_map(|name| {
                    self.get(name)
                        .map(|value| (name.to_string(), (&value).into()))
                })
                .collect(),
        )
    }
}
