//! Bean wrappers: name-based property access on one target object.
//!
//! A [`BeanWrapper`] binds a target (or, when created lazily, the means to
//! construct one) to its type's [`BeanClass`], and hands out property handles
//! by name. Handles are created on first request and cached, so every request
//! for the same name returns the same `Rc`.
//!
//! # Example
//!
//! ```
//! use beans::{AccessorSurface, Bean, BeanWrapper};
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
//!             .indexed_reader("get_items", |p: &Person, i| p.items.get(i).cloned())
//!             .indexed_writer("set_items", |p: &mut Person, i, item: String| {
//!                 p.items.get_mut(i).map(|slot| *slot = item)
//!             });
//!     }
//! }
//!
//! # fn main() -> Result<(), beans::BeanError> {
//! let wrapper = BeanWrapper::new(Person {
//!     name: "Alice".into(),
//!     items: vec!["a".into(), "b".into()],
//! })?;
//!
//! wrapper.property("name")?.set(String::from("Bob"))?;
//! assert_eq!(wrapper.target()?.name, "Bob");
//!
//! let items = wrapper.indexed_property("items")?;
//! assert_eq!(items.get_at::<String>(1)?, "b");
//! # Ok(())
//! # }
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{AccessType, BeanError, PropertyAccessError, PropertyKind};
use crate::introspect::BeanClass;
use crate::property::{IndexedPropertyHandle, PropertyHandle, TargetCell};
use crate::surface::Bean;

/// Name-based property access on one target of type `T`.
///
/// Wrappers are single-threaded (`!Send`); the metadata they share through
/// [`BeanClass`] is not.
pub struct BeanWrapper<T> {
    class: BeanClass<T>,
    target: Rc<TargetCell<T>>,
    properties: RefCell<FxHashMap<String, Rc<PropertyHandle<T>>>>,
    indexed_properties: RefCell<FxHashMap<String, Rc<IndexedPropertyHandle<T>>>>,
}

impl<T: Bean> BeanWrapper<T> {
    /// Wrap an existing target.
    ///
    /// Fails only if the metadata of `T` cannot be discovered.
    pub fn new(target: T) -> Result<Self, BeanError> {
        Ok(Self::with_class(BeanClass::get()?, target))
    }

    /// Wrap an existing target using already resolved metadata.
    pub fn with_class(class: BeanClass<T>, target: T) -> Self {
        let cell = TargetCell::bound(class.clone(), target);
        Self::from_cell(class, cell)
    }

    /// A wrapper whose target is created on first use through the type's
    /// registered constructor.
    pub fn from_class(class: BeanClass<T>) -> Self {
        let cell = TargetCell::lazy(class.clone());
        Self::from_cell(class, cell)
    }

    /// Resolve the metadata of `T` and create a lazy wrapper.
    pub fn lazy() -> Result<Self, BeanError> {
        Ok(Self::from_class(BeanClass::get()?))
    }

    fn from_cell(class: BeanClass<T>, cell: TargetCell<T>) -> Self {
        Self {
            class,
            target: Rc::new(cell),
            properties: RefCell::new(FxHashMap::default()),
            indexed_properties: RefCell::new(FxHashMap::default()),
        }
    }

    // === Probes ===

    /// True if `T` has a property named `name`. Indexed properties count.
    pub fn has_property(&self, name: &str) -> bool {
        self.class.property_descriptor(name).is_some()
    }

    /// True if `T` has an indexed property named `name`.
    pub fn has_indexed_property(&self, name: &str) -> bool {
        self.class.indexed_property_descriptor(name).is_some()
    }

    /// True if `T` has a scalar or an indexed property named `name`.
    pub fn has_any_property(&self, name: &str) -> bool {
        self.has_property(name) || self.has_indexed_property(name)
    }

    // === Resolution ===

    /// The handle of the property `name`, scalar or indexed.
    ///
    /// Forces instantiation of a lazy target. For an indexed property the
    /// returned handle is the scalar side of the cached indexed handle.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn property(&self, name: &str) -> Result<Rc<PropertyHandle<T>>, BeanError> {
        if let Some(handle) = self.properties.borrow().get(name) {
            return Ok(Rc::clone(handle));
        }

        let descriptor = self
            .class
            .property_descriptor(name)
            .ok_or_else(|| BeanError::NoSuchProperty {
                bean: self.class.name(),
                property: name.to_string(),
                kind: PropertyKind::Any,
            })?;
        if descriptor.is_indexed() {
            return self
                .indexed_property(name)
                .map(|indexed| Rc::clone(indexed.as_property()));
        }

        self.target.get_or_init()?;
        let handle = PropertyHandle::new(Rc::clone(&self.target), Arc::clone(descriptor));
        let handle = Rc::new(handle);
        debug!(property = %handle, "created property handle");
        self.properties.borrow_mut().insert(name.to_string(), Rc::clone(&handle));
        Ok(handle)
    }

    /// The handle of the indexed property `name`.
    ///
    /// A name that only exists as a scalar property is reported as not found.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn indexed_property(&self, name: &str) -> Result<Rc<IndexedPropertyHandle<T>>, BeanError> {
        if let Some(handle) = self.indexed_properties.borrow().get(name) {
            return Ok(Rc::clone(handle));
        }

        let not_found = || BeanError::NoSuchProperty {
            bean: self.class.name(),
            property: name.to_string(),
            kind: PropertyKind::Indexed,
        };
        let descriptor = self.class.indexed_property_descriptor(name).ok_or_else(not_found)?;

        self.target.get_or_init()?;
        let property = PropertyHandle::new(Rc::clone(&self.target), Arc::clone(descriptor));
        let property = Rc::new(property);
        let handle = IndexedPropertyHandle::new(Rc::clone(&property)).ok_or_else(not_found)?;
        let handle = Rc::new(handle);
        debug!(property = %handle, "created indexed property handle");

        self.properties.borrow_mut().insert(name.to_string(), property);
        self.indexed_properties
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&handle));
        Ok(handle)
    }

    // === Target ===

    pub fn bean_class(&self) -> &BeanClass<T> {
        &self.class
    }

    /// True once the target exists; always true for eagerly bound wrappers.
    pub fn is_instantiated(&self) -> bool {
        self.target.is_initialized()
    }

    /// Create the target of a lazy wrapper now, if it does not exist yet.
    pub fn instantiate(&self) -> Result<(), BeanError> {
        self.target.get_or_init().map(|_| ())
    }

    /// Borrow the target, instantiating it first if needed.
    ///
    /// Fails with a construction error if a lazy target cannot be created,
    /// and with a wrapping read error while the target is mutably borrowed.
    pub fn target(&self) -> Result<Ref<'_, T>, BeanError> {
        let bean = self.class.name();
        let cell = self.target.get_or_init()?;
        cell.try_borrow().map_err(|err| {
            PropertyAccessError::wrapping(bean, AccessType::Read, err.to_string()).into()
        })
    }

    /// Mutably borrow the target, instantiating it first if needed.
    ///
    /// Fails like [`target`](Self::target), and while any other borrow of
    /// the target is alive.
    pub fn target_mut(&self) -> Result<RefMut<'_, T>, BeanError> {
        let bean = self.class.name();
        let cell = self.target.get_or_init()?;
        cell.try_borrow_mut().map_err(|err| {
            PropertyAccessError::wrapping(bean, AccessType::Write, err.to_string()).into()
        })
    }

    /// Unwrap the target.
    ///
    /// Returns `None` if a lazy target was never created, or if property
    /// handles obtained from this wrapper are still alive and share it.
    pub fn into_target(self) -> Option<T> {
        let Self {
            target,
            properties,
            indexed_properties,
            ..
        } = self;
        drop(indexed_properties);
        drop(properties);
        Rc::try_unwrap(target).ok().and_then(TargetCell::into_inner)
    }
}

impl<T> fmt::Debug for BeanWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanWrapper")
            .field("class", &self.class)
            .field("cached_properties", &self.properties.borrow().len())
            .finish_non_exhaustive()
    }
}
