//! Type-erased property values.
//!
//! Bean properties are resolved by name at runtime, so the values flowing
//! through a [`PropertyHandle`](crate::PropertyHandle) cannot be statically
//! typed. [`Value`] boxes any `'static` value together with its [`ValueType`],
//! and the typed `get::<V>()` / `set::<V>()` helpers on the handles convert
//! back and forth.
//!
//! # Example
//!
//! ```
//! use beans::{Value, ValueType};
//!
//! let value = Value::new(String::from("Alice"));
//! assert_eq!(value.value_type(), ValueType::of::<String>());
//! assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("Alice"));
//! assert!(value.downcast::<i32>().is_err());
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The declared type of a property value.
///
/// Two value types are equal when their `TypeId`s are equal; the name is only
/// kept for diagnostics.
#[derive(Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    /// The value type of `V`.
    #[inline]
    pub fn of<V: Any>() -> Self {
        Self {
            id: TypeId::of::<V>(),
            name: type_name::<V>(),
        }
    }

    /// The `TypeId` of this value type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The Rust type name, as reported by [`std::any::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this is the value type of `V`.
    #[inline]
    pub fn is<V: Any>(&self) -> bool {
        self.id == TypeId::of::<V>()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueType({})", self.name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A boxed property value of any `'static` type.
pub struct Value {
    inner: Box<dyn Any>,
    value_type: ValueType,
}

impl Value {
    /// Box a value.
    pub fn new<V: Any>(value: V) -> Self {
        Self {
            inner: Box::new(value),
            value_type: ValueType::of::<V>(),
        }
    }

    /// The type of the boxed value.
    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Check whether the boxed value is a `V`.
    #[inline]
    pub fn is<V: Any>(&self) -> bool {
        self.value_type.is::<V>()
    }

    /// Borrow the boxed value as a `V`.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.inner.downcast_ref::<V>()
    }

    /// Take the boxed value out as a `V`.
    ///
    /// On a type mismatch the value is handed back unchanged.
    pub fn downcast<V: Any>(self) -> Result<V, Value> {
        let value_type = self.value_type;
        match self.inner.downcast::<V>() {
            Ok(boxed) => Ok(*boxed),
            Err(inner) => Err(Value { inner, value_type }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.value_type.name)
            .finish_non_exhaustive()
    }
}
