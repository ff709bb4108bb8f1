//! Property handles bound to a concrete target.
//!
//! A [`PropertyHandle`] pairs a shared [`PropertyDescriptor`] with the target
//! of the [`BeanWrapper`](crate::BeanWrapper) that created it. Handles are
//! cached by their wrapper, so asking for the same property twice yields the
//! same `Rc`. An [`IndexedPropertyHandle`] extends a scalar handle with
//! position-based access.

use std::any::Any;
use std::cell::{OnceCell, Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::{Accessor, PropertyDescriptor};
use crate::error::{AccessType, BeanError, PropertyAccessError};
use crate::introspect::BeanClass;
use crate::surface::{Bean, IndexedReadFn, IndexedWriteFn, ReadFn};
use crate::{Value, ValueType};

// ============================================================================
// Target Cell
// ============================================================================

/// The target object shared by a wrapper and its handles.
///
/// The slot is filled at most once: either up front, or on first access
/// through the type's registered constructor.
pub(crate) struct TargetCell<T> {
    class: BeanClass<T>,
    slot: OnceCell<RefCell<T>>,
}

impl<T: Bean> TargetCell<T> {
    pub(crate) fn bound(class: BeanClass<T>, target: T) -> Self {
        Self {
            class,
            slot: OnceCell::from(RefCell::new(target)),
        }
    }

    pub(crate) fn lazy(class: BeanClass<T>) -> Self {
        Self {
            class,
            slot: OnceCell::new(),
        }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The target, creating it first if this cell is still empty.
    pub(crate) fn get_or_init(&self) -> Result<&RefCell<T>, BeanError> {
        if let Some(cell) = self.slot.get() {
            return Ok(cell);
        }
        debug!(bean = self.class.name(), "instantiating lazy bean target");
        let target = self.class.new_instance()?;
        Ok(self.slot.get_or_init(|| RefCell::new(target)))
    }

    pub(crate) fn into_inner(self) -> Option<T> {
        self.slot.into_inner().map(RefCell::into_inner)
    }
}

// ============================================================================
// Scalar Handle
// ============================================================================

/// A named property of one target object.
pub struct PropertyHandle<T> {
    target: Rc<TargetCell<T>>,
    descriptor: Arc<PropertyDescriptor<T>>,
    value_type: OnceCell<ValueType>,
}

impl<T: Bean> PropertyHandle<T> {
    pub(crate) fn new(target: Rc<TargetCell<T>>, descriptor: Arc<PropertyDescriptor<T>>) -> Self {
        Self {
            target,
            descriptor,
            value_type: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Name of the bean type declaring this property.
    pub fn owner(&self) -> &'static str {
        self.descriptor.owner()
    }

    pub fn descriptor(&self) -> &PropertyDescriptor<T> {
        &self.descriptor
    }

    pub fn is_readable(&self) -> bool {
        self.descriptor.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.descriptor.is_writable()
    }

    pub fn is_indexed(&self) -> bool {
        self.descriptor.is_indexed()
    }

    /// The declared type of the property, computed once per handle.
    pub fn value_type(&self) -> ValueType {
        *self.value_type.get_or_init(|| self.descriptor.property_type())
    }

    /// Read the property through its reader.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_value(&self) -> Result<Value, BeanError> {
        let qualified = self.descriptor.qualified_name();
        let read = self.reader()?;
        let target = self.target()?;
        (read.function)(&*target).map_err(|cause| {
            PropertyAccessError::wrapping(qualified, AccessType::Read, cause).into()
        })
    }

    /// Read the property as a `V`.
    ///
    /// A property without a reader fails the same way as
    /// [`get_value`](Self::get_value), whatever `V` is.
    pub fn get<V: Any>(&self) -> Result<V, BeanError> {
        self.reader()?;
        self.check_type::<V>(self.value_type())?;
        let value = self.get_value()?;
        value.downcast::<V>().map_err(|value| BeanError::TypeMismatch {
            property: self.descriptor.qualified_name().to_string(),
            expected: value.value_type(),
            found: ValueType::of::<V>(),
        })
    }

    /// Write the property through its writer.
    ///
    /// The value is checked against the declared type before the writer
    /// runs; a mismatch leaves the target untouched.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set_value(&self, value: Value) -> Result<(), BeanError> {
        let qualified = self.descriptor.qualified_name();
        let write = self
            .descriptor
            .write()
            .ok_or_else(|| PropertyAccessError::structural(qualified, AccessType::Write))?;
        if value.value_type() != write.value_type() {
            return Err(BeanError::TypeMismatch {
                property: qualified.to_string(),
                expected: write.value_type(),
                found: value.value_type(),
            });
        }
        let mut target = self.target_mut()?;
        (write.function)(&mut *target, value).map_err(|cause| {
            PropertyAccessError::wrapping(qualified, AccessType::Write, cause).into()
        })
    }

    /// Write the property from a `V`.
    pub fn set<V: Any>(&self, value: V) -> Result<(), BeanError> {
        self.set_value(Value::new(value))
    }

    fn reader(&self) -> Result<&Accessor<ReadFn<T>>, BeanError> {
        let qualified = self.descriptor.qualified_name();
        self.descriptor
            .read()
            .ok_or_else(|| PropertyAccessError::structural(qualified, AccessType::Read).into())
    }

    fn check_type<V: Any>(&self, expected: ValueType) -> Result<(), BeanError> {
        if expected.is::<V>() {
            Ok(())
        } else {
            Err(BeanError::TypeMismatch {
                property: self.descriptor.qualified_name().to_string(),
                expected,
                found: ValueType::of::<V>(),
            })
        }
    }

    pub(crate) fn target(&self) -> Result<Ref<'_, T>, BeanError> {
        let qualified = self.descriptor.qualified_name();
        let cell = self.target.get_or_init()?;
        cell.try_borrow().map_err(|err| {
            PropertyAccessError::wrapping(qualified, AccessType::Read, err.to_string()).into()
        })
    }

    pub(crate) fn target_mut(&self) -> Result<RefMut<'_, T>, BeanError> {
        let qualified = self.descriptor.qualified_name();
        let cell = self.target.get_or_init()?;
        cell.try_borrow_mut().map_err(|err| {
            PropertyAccessError::wrapping(qualified, AccessType::Write, err.to_string()).into()
        })
    }
}

impl<T> fmt::Debug for PropertyHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyHandle")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PropertyHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.descriptor, f)
    }
}

// ============================================================================
// Indexed Handle
// ============================================================================

/// A named indexed property of one target object.
///
/// Derefs to the scalar [`PropertyHandle`] of the same property, so whole-value
/// access (`get_value`/`set_value`) is available when the bean publishes it.
pub struct IndexedPropertyHandle<T> {
    property: Rc<PropertyHandle<T>>,
    element_type: ValueType,
}

impl<T: Bean> IndexedPropertyHandle<T> {
    /// `None` if the property behind `property` is not indexed.
    pub(crate) fn new(property: Rc<PropertyHandle<T>>) -> Option<Self> {
        let element_type = property.descriptor.indexed()?.element_type();
        Some(Self {
            property,
            element_type,
        })
    }

    /// The scalar handle of the same property.
    pub fn as_property(&self) -> &Rc<PropertyHandle<T>> {
        &self.property
    }

    pub fn element_type(&self) -> ValueType {
        self.element_type
    }

    pub fn is_indexed_readable(&self) -> bool {
        self.indexed_read().is_some()
    }

    pub fn is_indexed_writable(&self) -> bool {
        self.indexed_write().is_some()
    }

    /// Read the element at `index`.
    ///
    /// Negative indices and positions the bean reports as out of range fail
    /// with [`BeanError::IndexOutOfBounds`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_value_at(&self, index: isize) -> Result<Value, BeanError> {
        let qualified = self.descriptor().qualified_name();
        let read = self.indexed_reader()?;
        let position = self.position(index)?;
        let target = self.property.target()?;
        (read.function)(&*target, position)
            .map_err(|cause| PropertyAccessError::wrapping(qualified, AccessType::Read, cause))?
            .ok_or_else(|| self.out_of_bounds(index))
    }

    /// Write the element at `index`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set_value_at(&self, index: isize, value: Value) -> Result<(), BeanError> {
        let qualified = self.descriptor().qualified_name();
        let write = self
            .indexed_write()
            .ok_or_else(|| PropertyAccessError::structural(qualified, AccessType::Write))?;
        if value.value_type() != self.element_type {
            return Err(BeanError::TypeMismatch {
                property: qualified.to_string(),
                expected: self.element_type,
                found: value.value_type(),
            });
        }
        let position = self.position(index)?;
        let mut target = self.property.target_mut()?;
        (write.function)(&mut *target, position, value)
            .map_err(|cause| PropertyAccessError::wrapping(qualified, AccessType::Write, cause))?
            .ok_or_else(|| self.out_of_bounds(index))
    }

    /// Read the element at `index` as a `V`.
    pub fn get_at<V: Any>(&self, index: isize) -> Result<V, BeanError> {
        self.indexed_reader()?;
        self.property.check_type::<V>(self.element_type)?;
        let value = self.get_value_at(index)?;
        value.downcast::<V>().map_err(|value| BeanError::TypeMismatch {
            property: self.descriptor().qualified_name().to_string(),
            expected: value.value_type(),
            found: ValueType::of::<V>(),
        })
    }

    /// Write the element at `index` from a `V`.
    pub fn set_at<V: Any>(&self, index: isize, value: V) -> Result<(), BeanError> {
        self.set_value_at(index, Value::new(value))
    }

    fn indexed_read(&self) -> Option<&Accessor<IndexedReadFn<T>>> {
        self.descriptor().indexed().and_then(|indexed| indexed.read())
    }

    fn indexed_write(&self) -> Option<&Accessor<IndexedWriteFn<T>>> {
        self.descriptor().indexed().and_then(|indexed| indexed.write())
    }

    fn indexed_reader(&self) -> Result<&Accessor<IndexedReadFn<T>>, BeanError> {
        let qualified = self.descriptor().qualified_name();
        self.indexed_read()
            .ok_or_else(|| PropertyAccessError::structural(qualified, AccessType::Read).into())
    }

    fn position(&self, index: isize) -> Result<usize, BeanError> {
        usize::try_from(index).map_err(|_| self.out_of_bounds(index))
    }

    fn out_of_bounds(&self, index: isize) -> BeanError {
        BeanError::IndexOutOfBounds {
            property: self.descriptor().qualified_name().to_string(),
            index,
        }
    }
}

impl<T> Deref for IndexedPropertyHandle<T> {
    type Target = PropertyHandle<T>;

    fn deref(&self) -> &Self::Target {
        &self.property
    }
}

impl<T> fmt::Debug for IndexedPropertyHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedPropertyHandle")
            .field("descriptor", &self.property.descriptor)
            .field("element_type", &self.element_type)
            .finish()
    }
}

impl<T> fmt::Display for IndexedPropertyHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.property, f)
    }
}
