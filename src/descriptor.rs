//! Property descriptors produced by discovery.
//!
//! A [`PropertyDescriptor`] is the static description of one property of a
//! bean type: its name, its value type and whichever of the four accessors
//! (read, write, indexed read, indexed write) the type publishes. Descriptors
//! are immutable and shared through `Arc` by every handle bound to them.

use std::fmt;

use bitflags::bitflags;

use crate::ValueType;
use crate::surface::{IndexedReadFn, IndexedWriteFn, ReadFn, WriteFn};

bitflags! {
    /// Accessors available on a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const INDEXED_READ = 1 << 2;
        const INDEXED_WRITE = 1 << 3;
    }
}

/// A resolved accessor method.
pub struct Accessor<F> {
    pub(crate) method: String,
    pub(crate) value_type: ValueType,
    pub(crate) function: F,
}

impl<F> Accessor<F> {
    /// Method name as registered (e.g. `get_name`).
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Return type for readers, argument type for writers; the element type
    /// for indexed accessors.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

impl<F> fmt::Debug for Accessor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("method", &self.method)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// The indexed half of an indexed property.
pub struct IndexedAccessors<T> {
    pub(crate) element_type: ValueType,
    pub(crate) collection_type: ValueType,
    pub(crate) read: Option<Accessor<IndexedReadFn<T>>>,
    pub(crate) write: Option<Accessor<IndexedWriteFn<T>>>,
}

impl<T> IndexedAccessors<T> {
    pub fn element_type(&self) -> ValueType {
        self.element_type
    }

    /// `Vec<Element>`, the type of whole-value accessors on the same property.
    pub fn collection_type(&self) -> ValueType {
        self.collection_type
    }

    pub fn read(&self) -> Option<&Accessor<IndexedReadFn<T>>> {
        self.read.as_ref()
    }

    pub fn write(&self) -> Option<&Accessor<IndexedWriteFn<T>>> {
        self.write.as_ref()
    }
}

/// Static description of one bean property.
pub struct PropertyDescriptor<T> {
    pub(crate) name: String,
    pub(crate) qualified_name: String,
    pub(crate) owner: &'static str,
    pub(crate) read: Option<Accessor<ReadFn<T>>>,
    pub(crate) write: Option<Accessor<WriteFn<T>>>,
    pub(crate) indexed: Option<IndexedAccessors<T>>,
}

impl<T> PropertyDescriptor<T> {
    /// Property name (`name` for `get_name`/`set_name`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the bean type declaring this property.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// `Bean.property`, used in diagnostics.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn read(&self) -> Option<&Accessor<ReadFn<T>>> {
        self.read.as_ref()
    }

    pub fn write(&self) -> Option<&Accessor<WriteFn<T>>> {
        self.write.as_ref()
    }

    pub fn indexed(&self) -> Option<&IndexedAccessors<T>> {
        self.indexed.as_ref()
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed.is_some()
    }

    pub fn is_readable(&self) -> bool {
        self.read.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// The declared value type: the reader's type if there is a reader,
    /// else the writer's. Indexed-only properties report their collection
    /// type.
    pub fn property_type(&self) -> ValueType {
        self.read
            .as_ref()
            .map(Accessor::value_type)
            .or_else(|| self.write.as_ref().map(Accessor::value_type))
            .or_else(|| self.indexed.as_ref().map(IndexedAccessors::collection_type))
            .unwrap_or_else(ValueType::of::<()>)
    }

    /// Which accessors this property has.
    pub fn access_flags(&self) -> AccessFlags {
        let mut flags = AccessFlags::empty();
        flags.set(AccessFlags::READ, self.read.is_some());
        flags.set(AccessFlags::WRITE, self.write.is_some());
        if let Some(indexed) = &self.indexed {
            flags.set(AccessFlags::INDEXED_READ, indexed.read.is_some());
            flags.set(AccessFlags::INDEXED_WRITE, indexed.write.is_some());
        }
        flags
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("type", &self.property_type())
            .field("access", &self.access_flags())
            .finish()
    }
}

impl<T> fmt::Display for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use crate::error::Cause;
    use std::sync::Arc;

    struct Sensor {
        readings: Vec<f64>,
    }

    fn scalar(read: bool, write: bool) -> PropertyDescriptor<Sensor> {
        PropertyDescriptor {
            name: "label".to_string(),
            qualified_name: "Sensor.label".to_string(),
            owner: "Sensor",
            read: read.then(|| Accessor {
                method: "get_label".to_string(),
                value_type: ValueType::of::<String>(),
                function: Arc::new(|_: &Sensor| Ok::<_, Cause>(Value::new(String::new())))
                    as ReadFn<Sensor>,
            }),
            write: write.then(|| Accessor {
                method: "set_label".to_string(),
                value_type: ValueType::of::<String>(),
                function: Arc::new(|_: &mut Sensor, _: Value| Ok::<_, Cause>(()))
                    as WriteFn<Sensor>,
            }),
            indexed: None,
        }
    }

    #[test]
    fn read_only_descriptor() {
        let desc = scalar(true, false);
        assert!(desc.is_readable());
        assert!(!desc.is_writable());
        assert!(!desc.is_indexed());
        assert_eq!(desc.access_flags(), AccessFlags::READ);
        assert_eq!(desc.property_type(), ValueType::of::<String>());
    }

    #[test]
    fn write_only_descriptor_takes_type_from_writer() {
        let desc = scalar(false, true);
        assert_eq!(desc.access_flags(), AccessFlags::WRITE);
        assert_eq!(desc.property_type(), ValueType::of::<String>());
        assert_eq!(desc.write().map(Accessor::method), Some("set_label"));
    }

    #[test]
    fn indexed_only_descriptor_reports_collection_type() {
        let desc = PropertyDescriptor {
            name: "readings".to_string(),
            qualified_name: "Sensor.readings".to_string(),
            owner: "Sensor",
            read: None,
            write: None,
            indexed: Some(IndexedAccessors {
                element_type: ValueType::of::<f64>(),
                collection_type: ValueType::of::<Vec<f64>>(),
                read: Some(Accessor {
                    method: "get_readings".to_string(),
                    value_type: ValueType::of::<f64>(),
                    function: Arc::new(|s: &Sensor, i: usize| {
                        Ok::<_, Cause>(s.readings.get(i).copied().map(Value::new))
                    }) as IndexedReadFn<Sensor>,
                }),
                write: None,
            }),
        };

        assert!(desc.is_indexed());
        assert!(!desc.is_readable());
        assert_eq!(desc.access_flags(), AccessFlags::INDEXED_READ);
        assert_eq!(desc.property_type(), ValueType::of::<Vec<f64>>());
        assert_eq!(desc.to_string(), "Sensor.readings");
    }

    #[test]
    fn debug_output() {
        let debug = format!("{:?}", scalar(true, true));
        assert!(debug.contains("PropertyDescriptor"));
        assert!(debug.contains("label"));
        assert!(debug.contains("READ | WRITE"));
    }
}
