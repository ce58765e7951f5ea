//! Per-type declaration tables for observed attributes.
//!
//! A concrete type declares which of its attributes are observed by
//! building a [`Schema`] once, behind a `OnceLock` static. The schema
//! records the type's declaration chain (most-derived link first), the
//! accessors for each attribute, and the ordered list of observed names.
//! Building the schema registers the chain in the process-wide
//! [registry](crate::attr_registry), which is what keeps a chain from being
//! instrumented twice no matter how many instances are constructed.

use tracing::{debug, warn};

use crate::attr_registry;
use crate::value::Value;

/// Descriptor for one attribute on one link of a declaration chain.
/// Immutable after declaration.
pub struct Attribute<T> {
    name: &'static str,
    read: fn(&T) -> Value,
    write: Option<fn(&mut T, Value)>,
    validate: Option<fn(&Value) -> bool>,
}

impl<T> Attribute<T> {
    /// An observed attribute: read and write accessors, every accepted
    /// write emits change events.
    pub fn new(name: &'static str, read: fn(&T) -> Value, write: fn(&mut T, Value)) -> Self {
        Self {
            name,
            read,
            write: Some(write),
            validate: None,
        }
    }

    /// An observed attribute whose writes must satisfy `validate`;
    /// rejected writes leave the previous value in place.
    pub fn validated(
        name: &'static str,
        read: fn(&T) -> Value,
        write: fn(&mut T, Value),
        validate: fn(&Value) -> bool,
    ) -> Self {
        Self {
            name,
            read,
            write: Some(write),
            validate: Some(validate),
        }
    }

    /// A getter-only attribute. Left alone by instrumentation: readable
    /// through the model surface, but never part of `props()`, snapshots,
    /// or change events.
    pub fn read_only(name: &'static str, read: fn(&T) -> Value) -> Self {
        Self {
            name,
            read,
            write: None,
            validate: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the attribute declares both accessors.
    pub fn is_observed(&self) -> bool {
        self.write.is_some()
    }

    pub(crate) fn value_of(&self, instance: &T) -> Value {
        (self.read)(instance)
    }

    pub(crate) fn writer(&self) -> Option<fn(&mut T, Value)> {
        self.write
    }

    pub(crate) fn accepts(&self, value: &Value) -> bool {
        self.validate.map_or(true, |validate| validate(value))
    }
}

struct ChainLink<T> {
    type_name: &'static str,
    attributes: Vec<Attribute<T>>,
}

/// Declaration table for a concrete type: its chain of links and the
/// memoized ordered set of observed attribute names.
pub struct Schema<T> {
    chain_path: String,
    links: Vec<ChainLink<T>>,
    props: Vec<&'static str>,
}

impl<T> Schema<T> {
    /// Start declaring a schema; `type_name` names the most-derived link.
    pub fn builder(type_name: &'static str) -> SchemaBuilder<T> {
        SchemaBuilder {
            done: Vec::new(),
            current: ChainLink {
                type_name,
                attributes: Vec::new(),
            },
        }
    }

    /// Qualified chain identity, base-most link first (`"Widget#Button"`).
    pub fn chain_path(&self) -> &str {
        &self.chain_path
    }

    /// Ordered observed attribute names across the chain: most-derived
    /// link first, each name listed once, getter-only attributes excluded.
    pub fn props(&self) -> &[&'static str] {
        &self.props
    }

    /// Look up a declared attribute; the most-derived declaration wins.
    pub fn attribute(&self, name: &str) -> Option<&Attribute<T>> {
        self.links
            .iter()
            .find_map(|link| link.attributes.iter().find(|a| a.name() == name))
    }
}

/// Builder for a declaration table. Attributes land on the link currently
/// open; [`base`](SchemaBuilder::base) closes it and opens the next link up
/// the chain, mirroring the walk from the most-derived type upward.
pub struct SchemaBuilder<T> {
    done: Vec<ChainLink<T>>,
    current: ChainLink<T>,
}

impl<T> SchemaBuilder<T> {
    pub fn attribute(mut self, attribute: Attribute<T>) -> Self {
        self.current.attributes.push(attribute);
        self
    }

    /// Open the next link up the declaration chain.
    pub fn base(mut self, type_name: &'static str) -> Self {
        let finished = std::mem::replace(
            &mut self.current,
            ChainLink {
                type_name,
                attributes: Vec::new(),
            },
        );
        self.done.push(finished);
        self
    }

    /// Finish the table: compute the chain path and props order, and
    /// register the chain in the process-wide registry.
    pub fn build(mut self) -> Schema<T> {
        self.done.push(self.current);
        let links = self.done;

        let chain_path = links
            .iter()
            .rev()
            .map(|link| link.type_name)
            .collect::<Vec<_>>()
            .join("#");

        let mut props: Vec<&'static str> = Vec::new();
        for link in &links {
            for attribute in &link.attributes {
                if attribute.is_observed() && !props.contains(&attribute.name()) {
                    props.push(attribute.name());
                }
            }
        }

        if attr_registry::instrument(&chain_path) {
            debug!(chain = %chain_path, props = ?props, "observed attributes declared");
        } else {
            warn!(
                chain = %chain_path,
                "declaration chain already instrumented; duplicate schema build"
            );
        }

        Schema {
            chain_path,
            links,
            props,
        }
    }
}
