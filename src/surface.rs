//! Accessor surfaces: how bean types publish their properties.
//!
//! Rust has no runtime reflection, so a bean type lists its public accessors
//! explicitly in [`Bean::describe`]. Each accessor is a named, type-erased
//! closure; discovery later pairs accessors into properties by name:
//!
//! - `get_<p>` / `is_<p>` readers (`is_` only for `bool` values)
//! - `set_<p>` writers
//! - indexed readers/writers take a position and report out-of-range
//!   positions by returning `None`
//!
//! # Example
//!
//! ```
//! use beans::{AccessorSurface, Bean};
//!
//! #[derive(Default)]
//! struct Playlist {
//!     title: String,
//!     tracks: Vec<String>,
//!     shuffle: bool,
//! }
//!
//! impl Bean for Playlist {
//!     fn describe(surface: &mut AccessorSurface<Self>) {
//!         surface
//!             .default_constructor()
//!             .reader("get_title", |p: &Playlist| p.title.clone())
//!             .writer("set_title", |p: &mut Playlist, title: String| p.title = title)
//!             .reader("is_shuffle", |p: &Playlist| p.shuffle)
//!             .reader("get_tracks", |p: &Playlist| p.tracks.clone())
//!             .indexed_reader("get_tracks", |p: &Playlist, i| p.tracks.get(i).cloned())
//!             .indexed_writer("set_tracks", |p: &mut Playlist, i, track: String| {
//!                 p.tracks.get_mut(i).map(|slot| *slot = track)
//!             });
//!     }
//! }
//! # let _ = beans::BeanClass::<Playlist>::get();
//! ```
//!
//! A reader and an indexed reader may share a method name; they are distinct
//! accessors of the same property.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::Cause;
use crate::{Value, ValueType};

pub(crate) type ReadFn<T> = Arc<dyn Fn(&T) -> Result<Value, Cause> + Send + Sync>;
pub(crate) type WriteFn<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), Cause> + Send + Sync>;
pub(crate) type IndexedReadFn<T> =
    Arc<dyn Fn(&T, usize) -> Result<Option<Value>, Cause> + Send + Sync>;
pub(crate) type IndexedWriteFn<T> =
    Arc<dyn Fn(&mut T, usize, Value) -> Result<Option<()>, Cause> + Send + Sync>;
pub(crate) type ConstructFn<T> = Arc<dyn Fn() -> Result<T, Cause> + Send + Sync>;

/// A type whose properties can be accessed by name.
///
/// Implementors describe their accessor surface once; the result is cached
/// for the lifetime of the process by [`BeanClass`](crate::BeanClass).
pub trait Bean: Sized + 'static {
    /// Name used in diagnostics and in `Bean.property` renderings.
    fn bean_name() -> &'static str {
        type_name::<Self>()
    }

    /// Publish the accessors (and optionally the no-argument constructor)
    /// of this type.
    fn describe(surface: &mut AccessorSurface<Self>);
}

/// The shape of a registered accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Read,
    Write,
    IndexedRead,
    IndexedWrite,
}

impl AccessorKind {
    /// True for `IndexedRead` and `IndexedWrite`.
    pub fn is_indexed(self) -> bool {
        matches!(self, AccessorKind::IndexedRead | AccessorKind::IndexedWrite)
    }

    pub fn is_read(self) -> bool {
        matches!(self, AccessorKind::Read | AccessorKind::IndexedRead)
    }
}

pub(crate) enum AccessorFn<T> {
    Read(ReadFn<T>),
    Write(WriteFn<T>),
    IndexedRead(IndexedReadFn<T>),
    IndexedWrite(IndexedWriteFn<T>),
}

impl<T> AccessorFn<T> {
    pub(crate) fn kind(&self) -> AccessorKind {
        match self {
            AccessorFn::Read(_) => AccessorKind::Read,
            AccessorFn::Write(_) => AccessorKind::Write,
            AccessorFn::IndexedRead(_) => AccessorKind::IndexedRead,
            AccessorFn::IndexedWrite(_) => AccessorKind::IndexedWrite,
        }
    }
}

/// One registered accessor method, before discovery pairs it with others.
pub(crate) struct AccessorDef<T> {
    pub(crate) method: String,
    /// Value type for scalar accessors, element type for indexed ones.
    pub(crate) value_type: ValueType,
    /// `Vec<Element>` for indexed accessors.
    pub(crate) collection_type: Option<ValueType>,
    pub(crate) function: AccessorFn<T>,
}

impl<T> AccessorDef<T> {
    pub(crate) fn kind(&self) -> AccessorKind {
        self.function.kind()
    }
}

/// Builder collecting the accessor surface of a bean type.
///
/// Handed to [`Bean::describe`]; every method returns `&mut Self` so
/// registrations can be chained.
pub struct AccessorSurface<T> {
    pub(crate) accessors: Vec<AccessorDef<T>>,
    pub(crate) constructors: Vec<ConstructFn<T>>,
}

impl<T: 'static> AccessorSurface<T> {
    pub(crate) fn new() -> Self {
        Self {
            accessors: Vec::new(),
            constructors: Vec::new(),
        }
    }

    fn push(
        &mut self,
        method: String,
        value_type: ValueType,
        collection_type: Option<ValueType>,
        function: AccessorFn<T>,
    ) -> &mut Self {
        self.accessors.push(AccessorDef {
            method,
            value_type,
            collection_type,
            function,
        });
        self
    }

    // === Constructors ===

    /// Register the no-argument constructor used by lazily-initialized wrappers.
    pub fn constructor<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructors.push(Arc::new(move || Ok(f())));
        self
    }

    /// Register a no-argument constructor that may fail.
    pub fn try_constructor<F, E>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<Cause>,
    {
        self.constructors.push(Arc::new(move || f().map_err(Into::into)));
        self
    }

    /// Use `T::default()` as the no-argument constructor.
    pub fn default_constructor(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.constructor(T::default)
    }

    // === Scalar accessors ===

    /// Register a reader (`get_<p>` or `is_<p>`).
    pub fn reader<V, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let function: ReadFn<T> = Arc::new(move |target: &T| Ok(Value::new(f(target))));
        self.push(method.into(), ValueType::of::<V>(), None, AccessorFn::Read(function))
    }

    /// Register a reader whose invocation may fail.
    pub fn try_reader<V, E, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        E: Into<Cause>,
        F: Fn(&T) -> Result<V, E> + Send + Sync + 'static,
    {
        let function: ReadFn<T> = Arc::new(move |target: &T| {
            f(target).map(Value::new).map_err(Into::into)
        });
        self.push(method.into(), ValueType::of::<V>(), None, AccessorFn::Read(function))
    }

    /// Register a writer (`set_<p>`).
    pub fn writer<V, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.try_writer(method, move |target: &mut T, value: V| {
            f(target, value);
            Ok::<(), Cause>(())
        })
    }

    /// Register a writer whose invocation may fail.
    pub fn try_writer<V, E, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        E: Into<Cause>,
        F: Fn(&mut T, V) -> Result<(), E> + Send + Sync + 'static,
    {
        let function: WriteFn<T> = Arc::new(move |target: &mut T, value: Value| {
            let value = unbox::<V>(value)?;
            f(target, value).map_err(Into::into)
        });
        self.push(method.into(), ValueType::of::<V>(), None, AccessorFn::Write(function))
    }

    // === Indexed accessors ===

    /// Register an indexed reader; `None` means the position is out of range.
    pub fn indexed_reader<V, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        F: Fn(&T, usize) -> Option<V> + Send + Sync + 'static,
    {
        self.try_indexed_reader(method, move |target: &T, index| Ok::<_, Cause>(f(target, index)))
    }

    /// Register an indexed reader whose invocation may fail.
    pub fn try_indexed_reader<V, E, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        E: Into<Cause>,
        F: Fn(&T, usize) -> Result<Option<V>, E> + Send + Sync + 'static,
    {
        let function: IndexedReadFn<T> = Arc::new(move |target: &T, index| {
            f(target, index)
                .map(|value| value.map(Value::new))
                .map_err(Into::into)
        });
        self.push(
            method.into(),
            ValueType::of::<V>(),
            Some(ValueType::of::<Vec<V>>()),
            AccessorFn::IndexedRead(function),
        )
    }

    /// Register an indexed writer; `None` means the position is out of range.
    pub fn indexed_writer<V, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        F: Fn(&mut T, usize, V) -> Option<()> + Send + Sync + 'static,
    {
        self.try_indexed_writer(method, move |target: &mut T, index, value: V| {
            Ok::<_, Cause>(f(target, index, value))
        })
    }

    /// Register an indexed writer whose invocation may fail.
    pub fn try_indexed_writer<V, E, F>(&mut self, method: impl Into<String>, f: F) -> &mut Self
    where
        V: Any,
        E: Into<Cause>,
        F: Fn(&mut T, usize, V) -> Result<Option<()>, E> + Send + Sync + 'static,
    {
        let function: IndexedWriteFn<T> = Arc::new(move |target: &mut T, index, value: Value| {
            let value = unbox::<V>(value)?;
            f(target, index, value).map_err(Into::into)
        });
        self.push(
            method.into(),
            ValueType::of::<V>(),
            Some(ValueType::of::<Vec<V>>()),
            AccessorFn::IndexedWrite(function),
        )
    }
}

impl<T> fmt::Debug for AccessorSurface<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<_> = self
            .accessors
            .iter()
            .map(|def| (def.method.as_str(), def.kind()))
            .collect();
        f.debug_struct("AccessorSurface")
            .field("accessors", &methods)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Writers only ever see values already checked against their declared
/// type, but the erased closure cannot prove it.
fn unbox<V: Any>(value: Value) -> Result<V, Cause> {
    value.downcast::<V>().map_err(|value| {
        format!(
            "expected a `{}` argument, got `{}`",
            type_name::<V>(),
            value.value_type()
        )
        .into()
    })
}
