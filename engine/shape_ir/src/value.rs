//! The runtime value model.
//!
//! A `Value` is a dynamically-shaped tree: scalars, ordered lists, and keyed
//! maps, arbitrarily nested, plus opaque objects carrying a class name.
//!
//! # Container identity and versioning
//!
//! Lists and maps are the mutable containers. Each carries a process-unique
//! id assigned at construction and a version counter bumped on every
//! mutation. The pair (`id`, `version`) is the `Fingerprint` the validation
//! cache keys on: pointer equality is not assumed, so the design stays
//! portable to value-semantics hosts. All mutation goes through methods on
//! the container, which is what keeps the counter honest.
//!
//! Versions propagate upward: placing a container inside another links the
//! child to its parent, and every bump walks those links, so mutating a
//! nested container advances the version of each enclosing one. A cached
//! fingerprint of the outer value therefore goes stale no matter how deep
//! the mutation happened. Links are only ever added; a link to a container
//! that no longer holds the child costs a spurious re-validation, never a
//! stale result.
//!
//! # Thread safety
//!
//! Containers are `Arc`-shared and internally locked. Validation only takes
//! read locks; the engine's contract is that values are not mutated while a
//! validation of them is in flight.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard};
use smallvec::SmallVec;

use crate::{Name, StringInterner};

/// Process-wide container id source.
static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

fn next_container_id() -> u64 {
    NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Shared identity and version cell of a container, with weak links to
/// the containers it has been placed into.
struct ContainerMeta {
    id: u64,
    version: AtomicU64,
    parents: RwLock<Vec<Weak<ContainerMeta>>>,
}

impl ContainerMeta {
    fn new() -> Arc<ContainerMeta> {
        Arc::new(ContainerMeta {
            id: next_container_id(),
            version: AtomicU64::new(0),
            parents: RwLock::new(Vec::new()),
        })
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Bump this container's version and every reachable ancestor's.
    fn bump(&self) {
        let mut seen = SmallVec::<[u64; 8]>::new();
        self.bump_chain(&mut seen);
    }

    fn bump_chain(&self, seen: &mut SmallVec<[u64; 8]>) {
        // Container cycles terminate here.
        if seen.contains(&self.id) {
            return;
        }
        seen.push(self.id);
        self.version.fetch_add(1, Ordering::Release);
        for parent in self.parents.read().iter() {
            if let Some(parent) = parent.upgrade() {
                parent.bump_chain(seen);
            }
        }
    }

    /// Record that `child` now sits directly inside this container, so
    /// its mutations reach this container's version.
    fn adopt(self: &Arc<Self>, child: &Value) {
        let child_meta = match child {
            Value::List(list) => &list.meta,
            Value::Map(map) => &map.meta,
            _ => return,
        };
        if Arc::ptr_eq(child_meta, self) {
            return;
        }
        let mut parents = child_meta.parents.write();
        parents.retain(|link| link.strong_count() > 0);
        if parents
            .iter()
            .filter_map(Weak::upgrade)
            .any(|parent| parent.id == self.id)
        {
            return;
        }
        parents.push(Arc::downgrade(self));
    }
}

/// The runtime kind of a value, for diagnostics and kind checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    Object,
}

impl ValueKind {
    /// Lowercase kind name as it appears in diagnostics ("string given").
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A map key: interned string or integer.
///
/// `Ord` is derived so map iteration is deterministic (BTreeMap), which
/// keeps diagnostics stable across runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Int(i64),
    Str(Name),
}

impl MapKey {
    /// Intern a string key.
    pub fn str(interner: &StringInterner, key: &str) -> MapKey {
        MapKey::Str(interner.intern(key))
    }

    /// Render for diagnostics: string keys quoted, integer keys bare.
    pub fn display(self, interner: &StringInterner) -> String {
        match self {
            MapKey::Str(name) => format!("'{}'", interner.lookup(name)),
            MapKey::Int(n) => n.to_string(),
        }
    }
}

/// Identity + mutation-version fingerprint of a container value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub container: u64,
    pub version: u64,
}

/// A mutable ordered sequence of values.
pub struct ListValue {
    meta: Arc<ContainerMeta>,
    elems: RwLock<Vec<Value>>,
}

impl ListValue {
    /// Create a list with a fresh container id, linking any container
    /// elements to it.
    pub fn new(elems: Vec<Value>) -> Self {
        let meta = ContainerMeta::new();
        for elem in &elems {
            meta.adopt(elem);
        }
        ListValue {
            meta,
            elems: RwLock::new(elems),
        }
    }

    /// Container id, unique per process.
    pub fn id(&self) -> u64 {
        self.meta.id
    }

    /// Current mutation version.
    pub fn version(&self) -> u64 {
        self.meta.version()
    }

    /// Read access to the elements.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.elems.read()
    }

    /// Append an element, bumping the version.
    pub fn push(&self, value: Value) {
        self.meta.adopt(&value);
        self.elems.write().push(value);
        self.meta.bump();
    }

    /// Replace the element at `index`, bumping the version.
    /// Returns false (without bumping) if the index is out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut elems = self.elems.write();
        match elems.get_mut(index) {
            Some(slot) => {
                self.meta.adopt(&value);
                *slot = value;
                drop(elems);
                self.meta.bump();
                true
            }
            None => false,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elems.read().len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.elems.read().is_empty()
    }
}

impl fmt::Debug for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListValue")
            .field("id", &self.id())
            .field("version", &self.version())
            .field("elems", &*self.read())
            .finish()
    }
}

/// A mutable keyed mapping from `MapKey` to values.
pub struct MapValue {
    meta: Arc<ContainerMeta>,
    entries: RwLock<BTreeMap<MapKey, Value>>,
}

impl MapValue {
    /// Create a map with a fresh container id, linking any container
    /// entries to it.
    pub fn new(entries: BTreeMap<MapKey, Value>) -> Self {
        let meta = ContainerMeta::new();
        for entry in entries.values() {
            meta.adopt(entry);
        }
        MapValue {
            meta,
            entries: RwLock::new(entries),
        }
    }

    /// Container id, unique per process.
    pub fn id(&self) -> u64 {
        self.meta.id
    }

    /// Current mutation version.
    pub fn version(&self) -> u64 {
        self.meta.version()
    }

    /// Read access to the entries.
    pub fn read(&self) -> RwLockReadGuard<'_, BTreeMap<MapKey, Value>> {
        self.entries.read()
    }

    /// Insert or replace an entry, bumping the version.
    pub fn insert(&self, key: MapKey, value: Value) -> Option<Value> {
        self.meta.adopt(&value);
        let prev = self.entries.write().insert(key, value);
        self.meta.bump();
        prev
    }

    /// Remove an entry, bumping the version if it was present.
    pub fn remove(&self, key: MapKey) -> Option<Value> {
        let removed = self.entries.write().remove(&key);
        if removed.is_some() {
            self.meta.bump();
        }
        removed
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapValue")
            .field("id", &self.id())
            .field("version", &self.version())
            .field("entries", &*self.read())
            .finish()
    }
}

/// An opaque host object. The engine never inspects object internals;
/// class membership is judged by the host's is-instance-of predicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectValue {
    pub class: Name,
}

/// A dynamically-shaped runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(Arc<ListValue>),
    Map(Arc<MapValue>),
    Object(Arc<ObjectValue>),
}

impl Value {
    /// String value.
    pub fn string(s: &str) -> Value {
        Value::Str(Arc::from(s))
    }

    /// List value with a fresh container id.
    pub fn list(elems: Vec<Value>) -> Value {
        Value::List(Arc::new(ListValue::new(elems)))
    }

    /// Map value with a fresh container id.
    pub fn map(entries: impl IntoIterator<Item = (MapKey, Value)>) -> Value {
        Value::Map(Arc::new(MapValue::new(entries.into_iter().collect())))
    }

    /// Object value of the given class.
    pub fn object(class: Name) -> Value {
        Value::Object(Arc::new(ObjectValue { class }))
    }

    /// The runtime kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Identity fingerprint, present only for containers.
    ///
    /// Scalars have no stable identity and are never cached; validating a
    /// scalar is O(1) anyway.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        match self {
            Value::List(list) => Some(Fingerprint {
                container: list.id(),
                version: list.version(),
            }),
            Value::Map(map) => Some(Fingerprint {
                container: map.id(),
                version: map.version(),
            }),
            _ => None,
        }
    }
}
