//! # utsuri: Reactive Observed-Attribute Models
//!
//! utsuri is a minimal reactive-model library: concrete types declare a set
//! of observed attributes in a per-type declaration table, and every
//! accepted write through the model surface synchronously emits structured
//! change events. A lightweight publish/subscribe layer supports plain,
//! guarded and one-shot subscriptions, and a small optional-value wrapper
//! tracks presence explicitly. It targets application code that needs
//! ad-hoc change notification — UI state, simple model objects — without a
//! full framework.
//!
//! ## Components
//!
//! - **Declaration tables** ([`schema`]): each concrete type declares its
//!   observed attributes once, behind a `OnceLock` static, with a link per
//!   type in its declaration chain.
//! - **Instrumentation registry** ([`attr_registry`]): process-wide record
//!   of which chains have been instrumented, keyed by the qualified chain
//!   path, so a chain is never instrumented twice.
//! - **Event dispatch** ([`dispatcher`]): per-instance listener tables with
//!   synchronous, registration-ordered delivery.
//! - **Model surface** ([`model`]): the trait composing the above into
//!   `get` / `set` / `trigger` / `listen_to` / `listen_to_once` /
//!   `props` / `to_snapshot`.
//! - **Optional values** ([`maybe`]): presence-tracking wrapper.
//!
//! ## Mutation Flow
//!
//! ```text
//! set("x", v) ──▶ validate ──▶ write ──▶ Change ──▶ ChangeAttr ──▶ ChangeValue
//!                    │
//!                    └─ rejected: log + error, value unchanged, no events
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::OnceLock;
//! use utsuri::{Attribute, Dispatcher, EventKey, Model, Schema, Value};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//!     events: Dispatcher,
//! }
//!
//! impl Model for Point {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<Point>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::builder("Point")
//!                 .attribute(Attribute::new(
//!                     "x",
//!                     |p: &Point| p.x.into(),
//!                     |p, v| {
//!                         if let Value::Integer(i) = v {
//!                             p.x = i
//!                         }
//!                     },
//!                 ))
//!                 .attribute(Attribute::new(
//!                     "y",
//!                     |p: &Point| p.y.into(),
//!                     |p, v| {
//!                         if let Value::Integer(i) = v {
//!                             p.y = i
//!                         }
//!                     },
//!                 ))
//!                 .build()
//!         })
//!     }
//!
//!     fn dispatcher(&self) -> &Dispatcher {
//!         &self.events
//!     }
//! }
//!
//! let mut point = Point::default();
//! let handle = point
//!     .listen_to(Some(&point), EventKey::change_of("x"), |args| {
//!         println!("x is now {}", args[0]);
//!     })
//!     .unwrap();
//!
//! point.set("x", Value::Integer(3)).unwrap();
//! assert_eq!(point.get("x"), Some(Value::Integer(3)));
//! handle.unlisten();
//! ```

pub mod attr_registry;
pub mod dispatcher;
pub mod error;
pub mod maybe;
pub mod model;
pub mod schema;
pub mod value;

// Re-exports
pub use dispatcher::{Dispatcher, EventError, EventKey, EventResult, EventSpec, ListenerHandle};
pub use error::{Error, UtsuriResult};
pub use maybe::Maybe;
pub use model::{Model, ModelError, ModelResult};
pub use schema::{Attribute, Schema, SchemaBuilder};
pub use value::{Value, ValueKind};
