//! Error types for bean introspection and property access.
//!
//! ```text
//! BeanError (top-level wrapper)
//! ├── Discovery(DiscoveryError)        - a bean type's accessor surface is malformed
//! ├── NoSuchProperty                   - no (indexed) property with that name
//! ├── Access(PropertyAccessError)      - not readable/writable, or the accessor failed
//! ├── IndexOutOfBounds                 - indexed access outside the property's storage
//! ├── Construction(ConstructionError)  - the lazy target could not be created
//! └── TypeMismatch                     - a value of the wrong type was supplied/requested
//! ```
//!
//! Nothing in this crate retries or swallows these errors; they are returned to
//! the immediate caller.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::ValueType;

/// A lower-level failure raised by an accessor or constructor.
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

// ============================================================================
// Discovery Errors
// ============================================================================

/// The accessor surface of a bean type could not be turned into properties.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// An accessor name does not follow the `get_`/`is_`/`set_` convention
    /// for its shape.
    #[error("malformed accessor `{bean}::{method}`: {reason}")]
    MalformedAccessorName {
        bean: &'static str,
        method: String,
        reason: &'static str,
    },

    /// The same accessor method was registered twice.
    #[error("accessor `{bean}::{method}` is registered more than once")]
    DuplicateAccessor { bean: &'static str, method: String },

    /// Accessors of one property disagree about its type.
    #[error("conflicting types for property `{bean}.{property}`: `{first}` and `{second}`")]
    TypeConflict {
        bean: &'static str,
        property: String,
        first: ValueType,
        second: ValueType,
    },

    /// More than one no-argument constructor was registered.
    #[error("`{bean}` registers more than one constructor")]
    DuplicateConstructor { bean: &'static str },

    /// Discovery of `bean` was requested again, on the same thread, while
    /// its own discovery was still running.
    #[error("discovery of `{bean}` re-entered itself through `describe`")]
    CyclicDiscovery { bean: &'static str },
}

impl DiscoveryError {
    /// The bean type whose discovery failed.
    pub fn bean(&self) -> &'static str {
        match self {
            DiscoveryError::MalformedAccessorName { bean, .. } => bean,
            DiscoveryError::DuplicateAccessor { bean, .. } => bean,
            DiscoveryError::TypeConflict { bean, .. } => bean,
            DiscoveryError::DuplicateConstructor { bean } => bean,
            DiscoveryError::CyclicDiscovery { bean } => bean,
        }
    }
}

// ============================================================================
// Access Errors
// ============================================================================

/// Which side of a property an access error concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessType {
    Read,
    Write,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Read => f.write_str("read"),
            AccessType::Write => f.write_str("write"),
        }
    }
}

/// A property could not be read or written.
///
/// Without a cause the property simply has no accessor for the requested
/// access (it is not readable, or not writable). With a cause the accessor
/// exists but failed; the cause is available through [`StdError::source`].
#[derive(Debug)]
pub struct PropertyAccessError {
    property: String,
    access: AccessType,
    cause: Option<Cause>,
}

impl PropertyAccessError {
    /// The property has no accessor for `access`.
    pub fn structural(property: impl Into<String>, access: AccessType) -> Self {
        Self {
            property: property.into(),
            access,
            cause: None,
        }
    }

    /// The accessor for `access` failed with `cause`.
    pub fn wrapping(
        property: impl Into<String>,
        access: AccessType,
        cause: impl Into<Cause>,
    ) -> Self {
        Self {
            property: property.into(),
            access,
            cause: Some(cause.into()),
        }
    }

    /// Qualified property name (`Bean.property`).
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn access(&self) -> AccessType {
        self.access
    }

    /// The underlying accessor failure, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// True when the property lacks the accessor altogether.
    pub fn is_structural(&self) -> bool {
        self.cause.is_none()
    }
}

impl fmt::Display for PropertyAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.cause, self.access) {
            (None, AccessType::Read) => write!(f, "property `{}` is not readable", self.property),
            (None, AccessType::Write) => write!(f, "property `{}` is not writable", self.property),
            (Some(cause), access) => {
                write!(f, "could not {} property `{}`: {}", access, self.property, cause)
            }
        }
    }
}

impl StdError for PropertyAccessError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

// ============================================================================
// Construction Errors
// ============================================================================

/// The target of a lazily-initialized wrapper could not be created.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// The bean type registers no no-argument constructor.
    #[error("`{bean}` has no no-argument constructor")]
    NoConstructor { bean: &'static str },

    /// The registered constructor failed.
    #[error("constructing `{bean}` failed")]
    Failed {
        bean: &'static str,
        #[source]
        cause: Cause,
    },
}

// ============================================================================
// Top-level Error
// ============================================================================

/// What kind of property a failed lookup asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Scalar or indexed.
    Any,
    Indexed,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Any => f.write_str("property"),
            PropertyKind::Indexed => f.write_str("indexed property"),
        }
    }
}

/// Errors returned by bean wrappers and property handles.
#[derive(Debug, Error)]
pub enum BeanError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("`{bean}` has no {kind} named `{property}`")]
    NoSuchProperty {
        bean: &'static str,
        property: String,
        kind: PropertyKind,
    },

    #[error(transparent)]
    Access(#[from] PropertyAccessError),

    #[error("index {index} is out of bounds for indexed property `{property}`")]
    IndexOutOfBounds { property: String, index: isize },

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("property `{property}` holds `{expected}` values, not `{found}`")]
    TypeMismatch {
        property: String,
        expected: ValueType,
        found: ValueType,
    },
}

impl BeanError {
    /// True for a failed property lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BeanError::NoSuchProperty { .. })
    }

    /// The access error, if this is one.
    pub fn as_access(&self) -> Option<&PropertyAccessError> {
        match self {
            BeanError::Access(err) => Some(err),
            _ => None,
        }
    }
}
