//! Cached, name-based property access for bean types.
//!
//! A *bean* is a type that publishes getter/setter accessors following a
//! naming convention (`get_<p>`/`is_<p>` and `set_<p>`, with indexed variants
//! taking a position). Given a bean type, this crate
//!
//! - discovers its properties once per process and caches the result
//!   ([`BeanClass`]);
//! - wraps a target instance, or creates one lazily, and hands out cached
//!   property handles by name ([`BeanWrapper`]);
//! - reads and writes property values through those handles
//!   ([`PropertyHandle`], [`IndexedPropertyHandle`]).
//!
//! # Example
//!
//! ```
//! use beans::prelude::*;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//!     items: Vec<String>,
//! }
//!
//! impl Bean for Person {
//!     fn describe(surface: &mut AccessorSurface<Self>) {
//!         surface
//!             .default_constructor()
//!             .reader("get_name", |p: &Person| p.name.clone())
//!             .writer("set_name", |p: &mut Person, name: String| p.name = name)
//!             .reader("get_items", |p: &Person| p.items.clone())
//!             .indexed_reader("get_items", |p: &Person, i| p.items.get(i).cloned());
//!     }
//! }
//!
//! # fn main() -> Result<(), BeanError> {
//! let wrapper = BeanWrapper::<Person>::lazy()?;
//! assert!(wrapper.has_property("name"));
//! assert!(wrapper.has_indexed_property("items"));
//! assert!(!wrapper.is_instantiated());
//!
//! let name = wrapper.property("name")?;
//! name.set(String::from("Alice"))?;
//! assert_eq!(name.get::<String>()?, "Alice");
//! assert_eq!(name.to_string(), format!("{}.name", Person::bean_name()));
//!
//! let items = wrapper.indexed_property("items")?;
//! assert!(matches!(items.get_value_at(0), Err(BeanError::IndexOutOfBounds { .. })));
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `profiling`: instrument discovery and property access with the
//!   [`profiling`](https://docs.rs/profiling) crate.
//! - `profile-with-puffin`: route `profiling` scopes to puffin.
//!
//! Graph traversal helpers from `beans-graph` are re-exported as [`graph`].

mod bean;
mod descriptor;
mod error;
mod event;
mod introspect;
mod property;
mod surface;
mod value;

pub use bean::BeanWrapper;
pub use descriptor::{AccessFlags, Accessor, IndexedAccessors, PropertyDescriptor};
pub use error::{
    AccessType, BeanError, Cause, ConstructionError, DiscoveryError, PropertyAccessError,
    PropertyKind,
};
pub use event::{ChangeSupport, EventSupport, Listener, ListenerSource};
pub use introspect::{BeanClass, TypeMetadata};
pub use property::{IndexedPropertyHandle, PropertyHandle};
pub use surface::{AccessorKind, AccessorSurface, Bean};
pub use value::{Value, ValueType};

pub use beans_graph as graph;

/// Common imports for implementing and using beans.
pub mod prelude {
    pub use crate::bean::BeanWrapper;
    pub use crate::error::{BeanError, DiscoveryError, PropertyAccessError};
    pub use crate::introspect::BeanClass;
    pub use crate::property::{IndexedPropertyHandle, PropertyHandle};
    pub use crate::surface::{AccessorSurface, Bean};
    pub use crate::value::{Value, ValueType};
}
