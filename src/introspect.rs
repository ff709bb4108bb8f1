//! Discovery of bean properties and the process-wide metadata cache.
//!
//! [`BeanClass::get`] resolves the [`TypeMetadata`] of a bean type. The first
//! request for a type runs discovery: the type's accessor surface is collected
//! through [`Bean::describe`], accessor names are split into property names,
//! accessors are paired per property, classified as scalar or indexed, and
//! checked for consistency. The result is cached for the lifetime of the
//! process and never evicted.
//!
//! ```text
//! describe()      get_name, set_name, get_items(i), set_items(i, v)
//!     │
//!     ▼
//! discover()      name: String (read, write)   items: Vec<String> [indexed read, indexed write]
//!     │
//!     ▼
//! METADATA_CACHE  TypeId -> Arc<TypeMetadata<T>>
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

use crate::ValueType;
use crate::descriptor::{Accessor, IndexedAccessors, PropertyDescriptor};
use crate::error::{ConstructionError, DiscoveryError};
use crate::surface::{
    AccessorDef, AccessorFn, AccessorKind, AccessorSurface, Bean, ConstructFn, IndexedReadFn,
    IndexedWriteFn, ReadFn, WriteFn,
};

lazy_static! {
    /// Discovered metadata, keyed by the bean's `TypeId`. Values are
    /// `Arc<TypeMetadata<T>>` for the matching `T`.
    static ref METADATA_CACHE: RwLock<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>> =
        RwLock::new(FxHashMap::default());
}

thread_local! {
    /// Bean types whose discovery is running on this thread.
    static DISCOVERING: RefCell<FxHashSet<TypeId>> = RefCell::new(FxHashSet::default());
}

// ============================================================================
// Type Metadata
// ============================================================================

/// The discovered property shape of one bean type.
pub struct TypeMetadata<T> {
    name: &'static str,
    properties: BTreeMap<String, Arc<PropertyDescriptor<T>>>,
    constructor: Option<ConstructFn<T>>,
}

impl<T> TypeMetadata<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn property(&self, name: &str) -> Option<&Arc<PropertyDescriptor<T>>> {
        self.properties.get(name)
    }

    /// All properties, ordered by name.
    pub fn properties(&self) -> impl Iterator<Item = &Arc<PropertyDescriptor<T>>> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<T> fmt::Debug for TypeMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("name", &self.name)
            .field("properties", &self.properties.values().collect::<Vec<_>>())
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}

// ============================================================================
// Bean Class
// ============================================================================

/// Shared handle to the cached metadata of bean type `T`.
///
/// Cloning is cheap; every `BeanClass<T>` in the process points at the same
/// [`TypeMetadata`].
pub struct BeanClass<T> {
    metadata: Arc<TypeMetadata<T>>,
}

impl<T: Bean> BeanClass<T> {
    /// Resolve the metadata of `T`, running discovery on first use.
    ///
    /// Discovery failures are returned as-is and not cached; the accessor
    /// surface of a type never changes, so asking again fails the same way.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get() -> Result<Self, DiscoveryError> {
        resolve::<T>().map(|metadata| BeanClass { metadata })
    }

    /// Create a fresh instance through the registered no-argument constructor.
    pub fn new_instance(&self) -> Result<T, ConstructionError> {
        let bean = self.metadata.name;
        let constructor = self
            .metadata
            .constructor
            .as_ref()
            .ok_or(ConstructionError::NoConstructor { bean })?;
        constructor().map_err(|cause| ConstructionError::Failed { bean, cause })
    }
}

impl<T> BeanClass<T> {
    pub fn name(&self) -> &'static str {
        self.metadata.name
    }

    pub fn type_id(&self) -> TypeId
    where
        T: 'static,
    {
        TypeId::of::<T>()
    }

    pub fn metadata(&self) -> &TypeMetadata<T> {
        &self.metadata
    }

    /// Descriptor of the property `name`, scalar or indexed.
    pub fn property_descriptor(&self, name: &str) -> Option<&Arc<PropertyDescriptor<T>>> {
        self.metadata.property(name)
    }

    /// Descriptor of the property `name` if it is an indexed property.
    pub fn indexed_property_descriptor(&self, name: &str) -> Option<&Arc<PropertyDescriptor<T>>> {
        self.metadata.property(name).filter(|descriptor| descriptor.is_indexed())
    }

    /// All property descriptors, ordered by name.
    pub fn property_descriptors(&self) -> impl Iterator<Item = &Arc<PropertyDescriptor<T>>> {
        self.metadata.properties()
    }

    /// All property names, in order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.metadata.properties.keys().map(String::as_str)
    }

    pub fn has_constructor(&self) -> bool {
        self.metadata.constructor.is_some()
    }

    /// True when both handles refer to the same cached metadata.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.metadata, &other.metadata)
    }
}

impl<T> Clone for BeanClass<T> {
    fn clone(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
        }
    }
}

impl<T> fmt::Debug for BeanClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BeanClass").field(&self.metadata.name).finish()
    }
}

// ============================================================================
// Cache
// ============================================================================

#[cfg_attr(feature = "profiling", profiling::function)]
fn resolve<T: Bean>() -> Result<Arc<TypeMetadata<T>>, DiscoveryError> {
    let key = TypeId::of::<T>();

    if let Some(metadata) = METADATA_CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .and_then(downcast::<T>)
    {
        return Ok(metadata);
    }

    // No lock is held while `describe` runs, so it may resolve other beans.
    // A type that reaches itself again through those resolutions is a cycle.
    let Some(_guard) = DiscoveryGuard::enter(key) else {
        let err = DiscoveryError::CyclicDiscovery {
            bean: T::bean_name(),
        };
        warn!(bean = T::bean_name(), error = %err, "bean discovery failed");
        return Err(err);
    };
    let discovered = Arc::new(discover::<T>().inspect_err(|err| {
        warn!(bean = T::bean_name(), error = %err, "bean discovery failed");
    })?);

    let mut cache = METADATA_CACHE.write().unwrap_or_else(PoisonError::into_inner);
    let entry = cache
        .entry(key)
        .or_insert_with(|| Arc::clone(&discovered) as Arc<dyn Any + Send + Sync>);
    Ok(downcast::<T>(entry).unwrap_or(discovered))
}

fn downcast<T: Bean>(entry: &Arc<dyn Any + Send + Sync>) -> Option<Arc<TypeMetadata<T>>> {
    Arc::clone(entry).downcast::<TypeMetadata<T>>().ok()
}

/// Marks one type as being discovered on the current thread until dropped.
struct DiscoveryGuard(TypeId);

impl DiscoveryGuard {
    /// `None` if discovery of `key` is already running on this thread.
    fn enter(key: TypeId) -> Option<Self> {
        DISCOVERING
            .with_borrow_mut(|discovering| discovering.insert(key))
            .then(|| DiscoveryGuard(key))
    }
}

impl Drop for DiscoveryGuard {
    fn drop(&mut self) {
        DISCOVERING.with_borrow_mut(|discovering| discovering.remove(&self.0));
    }
}

// ============================================================================
// Discovery
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Get,
    Is,
    Set,
}

/// Split an accessor method name into its prefix and property name.
fn split_method(method: &str) -> Option<(Prefix, &str)> {
    [("get_", Prefix::Get), ("is_", Prefix::Is), ("set_", Prefix::Set)]
        .into_iter()
        .find_map(|(text, prefix)| method.strip_prefix(text).map(|rest| (prefix, rest)))
}

/// Accessors of one property, collected before validation.
struct PropertyDraft<T> {
    get: Option<Accessor<ReadFn<T>>>,
    is: Option<Accessor<ReadFn<T>>>,
    write: Option<Accessor<WriteFn<T>>>,
    indexed_read: Option<Accessor<IndexedReadFn<T>>>,
    indexed_write: Option<Accessor<IndexedWriteFn<T>>>,
    collection_type: Option<ValueType>,
}

impl<T> Default for PropertyDraft<T> {
    fn default() -> Self {
        Self {
            get: None,
            is: None,
            write: None,
            indexed_read: None,
            indexed_write: None,
            collection_type: None,
        }
    }
}

impl<T> PropertyDraft<T> {
    fn add(&mut self, prefix: Prefix, def: AccessorDef<T>) {
        let AccessorDef {
            method,
            value_type,
            collection_type,
            function,
        } = def;
        if collection_type.is_some() {
            self.collection_type = collection_type;
        }
        match function {
            AccessorFn::Read(function) => {
                let slot = if prefix == Prefix::Is {
                    &mut self.is
                } else {
                    &mut self.get
                };
                *slot = Some(Accessor {
                    method,
                    value_type,
                    function,
                });
            }
            AccessorFn::Write(function) => {
                self.write = Some(Accessor {
                    method,
                    value_type,
                    function,
                })
            }
            AccessorFn::IndexedRead(function) => {
                self.indexed_read = Some(Accessor {
                    method,
                    value_type,
                    function,
                })
            }
            AccessorFn::IndexedWrite(function) => {
                self.indexed_write = Some(Accessor {
                    method,
                    value_type,
                    function,
                })
            }
        }
    }

    fn finish(
        self,
        bean: &'static str,
        name: String,
    ) -> Result<PropertyDescriptor<T>, DiscoveryError> {
        let conflict = |first: ValueType, second: ValueType| DiscoveryError::TypeConflict {
            bean,
            property: name.clone(),
            first,
            second,
        };

        // `is_` wins over `get_` for the same boolean property.
        let read = match (self.is, self.get) {
            (Some(is), Some(get)) => {
                if is.value_type != get.value_type {
                    return Err(conflict(is.value_type, get.value_type));
                }
                trace!(bean, property = %name, ignored = %get.method, "preferring `is_` reader");
                Some(is)
            }
            (is, get) => is.or(get),
        };

        if let (Some(read), Some(write)) = (&read, &self.write) {
            if read.value_type != write.value_type {
                return Err(conflict(read.value_type, write.value_type));
            }
        }

        let indexed = match (self.indexed_read, self.indexed_write) {
            (None, None) => None,
            (indexed_read, indexed_write) => {
                if let (Some(r), Some(w)) = (&indexed_read, &indexed_write) {
                    if r.value_type != w.value_type {
                        return Err(conflict(r.value_type, w.value_type));
                    }
                }
                let element_type = indexed_read
                    .as_ref()
                    .map(Accessor::value_type)
                    .or_else(|| indexed_write.as_ref().map(Accessor::value_type))
                    .unwrap_or_else(ValueType::of::<()>);
                let collection_type = self.collection_type.unwrap_or_else(ValueType::of::<Vec<()>>);

                // Whole-value accessors of an indexed property work on `Vec<Element>`.
                let scalar_type = read
                    .as_ref()
                    .map(Accessor::value_type)
                    .or_else(|| self.write.as_ref().map(Accessor::value_type));
                if let Some(scalar_type) = scalar_type {
                    if scalar_type != collection_type {
                        return Err(conflict(collection_type, scalar_type));
                    }
                }

                Some(IndexedAccessors {
                    element_type,
                    collection_type,
                    read: indexed_read,
                    write: indexed_write,
                })
            }
        };

        Ok(PropertyDescriptor {
            qualified_name: format!("{bean}.{name}"),
            name,
            owner: bean,
            read,
            write: self.write,
            indexed,
        })
    }
}

/// Run discovery for `T` without consulting the cache.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn discover<T: Bean>() -> Result<TypeMetadata<T>, DiscoveryError> {
    let bean = T::bean_name();
    debug!(bean, "discovering bean properties");

    let mut surface = AccessorSurface::<T>::new();
    T::describe(&mut surface);
    let AccessorSurface {
        accessors,
        mut constructors,
    } = surface;

    if constructors.len() > 1 {
        return Err(DiscoveryError::DuplicateConstructor { bean });
    }

    let mut seen: FxHashSet<(String, AccessorKind)> = FxHashSet::default();
    let mut drafts: BTreeMap<String, PropertyDraft<T>> = BTreeMap::new();

    for def in accessors {
        let kind = def.kind();
        if !seen.insert((def.method.clone(), kind)) {
            return Err(DiscoveryError::DuplicateAccessor {
                bean,
                method: def.method,
            });
        }

        let malformed = |reason: &'static str| DiscoveryError::MalformedAccessorName {
            bean,
            method: def.method.clone(),
            reason,
        };

        let (prefix, property) = split_method(&def.method)
            .ok_or_else(|| malformed("accessor names must start with `get_`, `is_` or `set_`"))?;
        if property.is_empty() {
            return Err(malformed("missing property name after the prefix"));
        }
        match (prefix, kind.is_read()) {
            (Prefix::Set, true) => {
                return Err(malformed(
                    "readers must be named `get_<property>` or `is_<property>`",
                ));
            }
            (Prefix::Get | Prefix::Is, false) => {
                return Err(malformed("writers must be named `set_<property>`"));
            }
            (Prefix::Is, true) if kind.is_indexed() || !def.value_type.is::<bool>() => {
                return Err(malformed("`is_` readers must be scalar and return `bool`"));
            }
            _ => {}
        }

        let property = property.to_owned();
        trace!(bean, property = %property, method = %def.method, ?kind, "discovered accessor");
        drafts.entry(property).or_default().add(prefix, def);
    }

    let mut properties = BTreeMap::new();
    for (name, draft) in drafts {
        let descriptor = draft.finish(bean, name.clone())?;
        trace!(bean, property = %name, access = ?descriptor.access_flags(), "discovered property");
        properties.insert(name, Arc::new(descriptor));
    }

    debug!(bean, properties = properties.len(), "bean properties discovered");
    Ok(TypeMetadata {
        name: bean,
        properties,
        constructor: constructors.pop(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::AccessFlags;

    #[derive(Default)]
    struct Person {
        name: String,
        age: u32,
        active: bool,
        nicknames: Vec<String>,
    }

    impl Bean for Person {
        fn bean_name() -> &'static str {
            "Person"
        }

        fn describe(surface: &mut AccessorSurface<Self>) {
            surface
                .default_constructor()
                .reader("get_name", |p: &Person| p.name.clone())
                .writer("set_name", |p: &mut Person, name: String| p.name = name)
                .reader("get_age", |p: &Person| p.age)
                .reader("is_active", |p: &Person| p.active)
                .writer("set_active", |p: &mut Person, active: bool| p.active = active)
                .writer("set_nicknames", |p: &mut Person, n: Vec<String>| p.nicknames = n)
                .indexed_reader("get_nicknames", |p: &Person, i| p.nicknames.get(i).cloned())
                .indexed_writer("set_nicknames", |p: &mut Person, i, n: String| {
                    p.nicknames.get_mut(i).map(|slot| *slot = n)
                });
        }
    }

    fn discover_err<T: Bean>() -> DiscoveryError {
        match discover::<T>() {
            Ok(_) => panic!("discovery of {} unexpectedly succeeded", T::bean_name()),
            Err(err) => err,
        }
    }

    #[test]
    fn discovers_scalar_properties() {
        let metadata = discover::<Person>().unwrap();
        assert_eq!(metadata.name(), "Person");

        let name = metadata.property("name").unwrap();
        assert_eq!(name.access_flags(), AccessFlags::READ | AccessFlags::WRITE);
        assert_eq!(name.property_type(), ValueType::of::<String>());
        assert_eq!(name.qualified_name(), "Person.name");

        let age = metadata.property("age").unwrap();
        assert!(age.is_readable());
        assert!(!age.is_writable());
    }

    #[test]
    fn is_prefix_defines_boolean_reader() {
        let metadata = discover::<Person>().unwrap();
        let active = metadata.property("active").unwrap();
        assert_eq!(active.read().map(Accessor::method), Some("is_active"));
        assert!(active.is_writable());
    }

    #[test]
    fn indexed_property_classification() {
        let metadata = discover::<Person>().unwrap();
        let nicknames = metadata.property("nicknames").unwrap();
        assert!(nicknames.is_indexed());
        assert_eq!(
            nicknames.access_flags(),
            AccessFlags::WRITE | AccessFlags::INDEXED_READ | AccessFlags::INDEXED_WRITE
        );
        let indexed = nicknames.indexed().unwrap();
        assert_eq!(indexed.element_type(), ValueType::of::<String>());
        assert_eq!(indexed.collection_type(), ValueType::of::<Vec<String>>());
        assert_eq!(nicknames.property_type(), ValueType::of::<Vec<String>>());
    }

    #[test]
    fn properties_are_ordered_by_name() {
        let metadata = discover::<Person>().unwrap();
        let names: Vec<_> = metadata.properties().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["active", "age", "name", "nicknames"]);
    }

    #[test]
    fn bean_class_is_cached() {
        let first = BeanClass::<Person>::get().unwrap();
        let second = BeanClass::<Person>::get().unwrap();
        assert!(first.ptr_eq(&second));
        assert!(first.has_constructor());
        assert_eq!(first.type_id(), TypeId::of::<Person>());
        assert_eq!(
            first.property_names().collect::<Vec<_>>(),
            vec!["active", "age", "name", "nicknames"]
        );
        assert!(first.indexed_property_descriptor("name").is_none());
        assert!(first.indexed_property_descriptor("nicknames").is_some());
    }

    #[test]
    fn new_instance_uses_constructor() {
        let class = BeanClass::<Person>::get().unwrap();
        let person = class.new_instance().unwrap();
        assert!(person.name.is_empty());
    }

    struct NoPrefix;

    impl Bean for NoPrefix {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface.reader("name", |_: &NoPrefix| 1u8);
        }
    }

    #[test]
    fn missing_prefix_is_malformed() {
        assert!(matches!(
            discover_err::<NoPrefix>(),
            DiscoveryError::MalformedAccessorName { ref method, .. } if method == "name"
        ));
    }

    struct EmptyName;

    impl Bean for EmptyName {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface.writer("set_", |_: &mut EmptyName, _: u8| {});
        }
    }

    #[test]
    fn empty_property_name_is_malformed() {
        assert!(matches!(
            discover_err::<EmptyName>(),
            DiscoveryError::MalformedAccessorName { .. }
        ));
    }

    struct SetterNamedReader;

    impl Bean for SetterNamedReader {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface.reader("set_value", |_: &SetterNamedReader| 0i32);
        }
    }

    #[test]
    fn reader_with_set_prefix_is_malformed() {
        assert!(matches!(
            discover_err::<SetterNamedReader>(),
            DiscoveryError::MalformedAccessorName { .. }
        ));
    }

    struct NonBoolIs;

    impl Bean for NonBoolIs {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface.reader("is_ready", |_: &NonBoolIs| 1u8);
        }
    }

    #[test]
    fn is_prefix_requires_bool() {
        assert!(matches!(
            discover_err::<NonBoolIs>(),
            DiscoveryError::MalformedAccessorName { .. }
        ));
    }

    struct Duplicate;

    impl Bean for Duplicate {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface
                .reader("get_value", |_: &Duplicate| 1i32)
                .reader("get_value", |_: &Duplicate| 2i32);
        }
    }

    #[test]
    fn duplicate_accessor_is_rejected() {
        assert_eq!(
            discover_err::<Duplicate>(),
            DiscoveryError::DuplicateAccessor {
                bean: Duplicate::bean_name(),
                method: "get_value".to_string(),
            }
        );
    }

    struct Mismatched;

    impl Bean for Mismatched {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface
                .reader("get_value", |_: &Mismatched| 1i32)
                .writer("set_value", |_: &mut Mismatched, _: String| {});
        }
    }

    #[test]
    fn reader_writer_type_conflict() {
        assert!(matches!(
            discover_err::<Mismatched>(),
            DiscoveryError::TypeConflict { ref property, first, second, .. }
                if property == "value" && first.is::<i32>() && second.is::<String>()
        ));
    }

    struct MismatchedIndexed;

    impl Bean for MismatchedIndexed {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface
                .reader("get_values", |_: &MismatchedIndexed| Vec::<u8>::new())
                .indexed_reader("get_values", |_: &MismatchedIndexed, _| None::<i64>);
        }
    }

    #[test]
    fn scalar_accessor_of_indexed_property_must_be_vec_of_element() {
        assert!(matches!(
            discover_err::<MismatchedIndexed>(),
            DiscoveryError::TypeConflict { .. }
        ));
    }

    struct TwoConstructors;

    impl Bean for TwoConstructors {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface.constructor(|| TwoConstructors).constructor(|| TwoConstructors);
        }
    }

    #[test]
    fn duplicate_constructor_is_rejected() {
        assert!(matches!(
            discover_err::<TwoConstructors>(),
            DiscoveryError::DuplicateConstructor { .. }
        ));
    }

    #[test]
    fn failed_discovery_is_surfaced_by_bean_class() {
        assert!(BeanClass::<Mismatched>::get().is_err());
        // Not cached: a second request fails again rather than hitting a stale entry.
        assert!(matches!(
            BeanClass::<Mismatched>::get(),
            Err(DiscoveryError::TypeConflict { .. })
        ));
    }

    struct Customer {
        name: String,
    }

    impl Bean for Customer {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface.reader("get_name", |c: &Customer| c.name.clone());
        }
    }

    struct Invoice {
        customer: Customer,
        total: u64,
    }

    impl Bean for Invoice {
        fn describe(surface: &mut AccessorSurface<Self>) {
            surface.reader("get_total", |i: &Invoice| i.total);
            let customer = BeanClass::<Customer>::get();
            if customer.is_ok_and(|class| class.property_descriptor("name").is_some()) {
                surface.reader("get_customer_name", |i: &Invoice| i.customer.name.clone());
            }
        }
    }

    #[test]
    fn describe_may_resolve_other_beans() {
        let invoice = BeanClass::<Invoice>::get().unwrap();
        assert_eq!(
            invoice.property_names().collect::<Vec<_>>(),
            vec!["customer_name", "total"]
        );

        let customer = BeanClass::<Customer>::get().unwrap();
        assert!(customer.ptr_eq(&BeanClass::<Customer>::get().unwrap()));
    }

    static NESTED_PARENT_LOOKUPS: Mutex<Vec<Result<(), DiscoveryError>>> = Mutex::new(Vec::new());

    struct Parent {
        children: Vec<u32>,
    }

    struct Child {
        parent_id: u32,
    }

    impl Bean for Parent {
        fn describe(surface: &mut AccessorSurface<Self>) {
            let _ = BeanClass::<Child>::get();
            surface.reader("get_child_count", |p: &Parent| p.children.len());
        }
    }

    impl Bean for Child {
        fn describe(surface: &mut AccessorSurface<Self>) {
            // Asked twice: a rejected request must not clear the outer marker.
            for _ in 0..2 {
                let lookup = BeanClass::<Parent>::get().map(|_| ());
                NESTED_PARENT_LOOKUPS.lock().unwrap().push(lookup);
            }
            surface.reader("get_parent_id", |c: &Child| c.parent_id);
        }
    }

    #[test]
    fn mutually_resolving_beans_report_the_cycle() {
        let parent = BeanClass::<Parent>::get().unwrap();
        let names: Vec<_> = parent.property_names().collect();
        assert_eq!(names, vec!["child_count"]);

        // The nested requests for `Parent` came while `Parent` was being discovered.
        let cycle = DiscoveryError::CyclicDiscovery {
            bean: Parent::bean_name(),
        };
        let nested = std::mem::take(&mut *NESTED_PARENT_LOOKUPS.lock().unwrap());
        assert_eq!(nested, vec![Err(cycle.clone()), Err(cycle)]);

        // Both types are cached afterwards; the guard did not outlive discovery.
        assert!(parent.ptr_eq(&BeanClass::<Parent>::get().unwrap()));
        let child = BeanClass::<Child>::get().unwrap();
        let names: Vec<_> = child.property_names().collect();
        assert_eq!(names, vec!["parent_id"]);
    }

    struct SelfReferential;

    impl Bean for SelfReferential {
        fn describe(surface: &mut AccessorSurface<Self>) {
            if BeanClass::<SelfReferential>::get().is_err() {
                surface.reader("is_cyclic", |_: &SelfReferential| true);
            }
        }
    }

    #[test]
    fn bean_resolving_itself_is_cyclic() {
        let class = BeanClass::<SelfReferential>::get().unwrap();
        assert!(class.property_descriptor("cyclic").is_some());
    }
}
