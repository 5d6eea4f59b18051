//! Container kinds and the multimap they build.
//!
//! [`MapKind`] selects the outer mapping and [`CollectionKind`] the per-key value group.
//! Both are fixed before the first entry is inserted.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use ahash::{AHashMap, AHashSet};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize, Serializer};

/// Ordering/uniqueness policy of the outer mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    /// Hash map with unspecified iteration order. Declared as `HASHMAP`.
    #[default]
    #[serde(rename = "HASHMAP")]
    Hash,
    /// Hash map that iterates in key insertion order. Declared as `LINKED_HASHMAP`.
    #[serde(rename = "LINKED_HASHMAP")]
    LinkedHash,
    /// Map sorted by key. Declared as `TREEMAP`.
    #[serde(rename = "TREEMAP")]
    Tree,
}

/// Ordering/uniqueness policy of each key's value group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    /// Duplicates allowed, insertion order. Declared as `LIST`.
    #[default]
    #[serde(rename = "LIST")]
    List,
    /// Unique values, unspecified order. Declared as `SET`.
    #[serde(rename = "SET")]
    Set,
    /// Unique values in first-insertion order. Declared as `ORDERED_SET`.
    #[serde(rename = "ORDERED_SET")]
    OrderedSet,
}

/// A declared kind name that is not one of the recognized values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown container kind `{}`", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl MapKind {
    pub const ALL: [MapKind; 3] = [MapKind::Hash, MapKind::LinkedHash, MapKind::Tree];

    /// Canonical name, as written in the `type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapKind::Hash => "HASHMAP",
            MapKind::LinkedHash => "LINKED_HASHMAP",
            MapKind::Tree => "TREEMAP",
        }
    }
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::List,
        CollectionKind::Set,
        CollectionKind::OrderedSet,
    ];

    /// Canonical name, as written in the `collection` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::List => "LIST",
            CollectionKind::Set => "SET",
            CollectionKind::OrderedSet => "ORDERED_SET",
        }
    }
}

impl FromStr for MapKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

impl FromStr for CollectionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered group of values stored under one key.
#[derive(Clone, Debug)]
pub enum ValueGroup<V> {
    List(Vec<V>),
    Set(AHashSet<V>),
    OrderedSet(IndexSet<V>),
}

impl<V: Eq + Hash> ValueGroup<V> {
    /// Fresh, empty group of the given kind.
    pub fn new(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::List => ValueGroup::List(Vec::new()),
            CollectionKind::Set => ValueGroup::Set(AHashSet::new()),
            CollectionKind::OrderedSet => ValueGroup::OrderedSet(IndexSet::new()),
        }
    }

    /// Add a value. Returns `false` when a set kind already held an equal value.
    pub fn push(&mut self, value: V) -> bool {
        match self {
            ValueGroup::List(values) => {
                values.push(value);
                true
            }
            ValueGroup::Set(values) => values.insert(value),
            ValueGroup::OrderedSet(values) => values.insert(value),
        }
    }

    pub fn contains(&self, value: &V) -> bool {
        match self {
            ValueGroup::List(values) => values.contains(value),
            ValueGroup::Set(values) => values.contains(value),
            ValueGroup::OrderedSet(values) => values.contains(value),
        }
    }
}

impl<V> ValueGroup<V> {
    pub fn kind(&self) -> CollectionKind {
        match self {
            ValueGroup::List(_) => CollectionKind::List,
            ValueGroup::Set(_) => CollectionKind::Set,
            ValueGroup::OrderedSet(_) => CollectionKind::OrderedSet,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ValueGroup::List(values) => values.len(),
            ValueGroup::Set(values) => values.len(),
            ValueGroup::OrderedSet(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate values in the group's own order (unspecified for [`CollectionKind::Set`]).
    pub fn iter(&self) -> GroupIter<'_, V> {
        match self {
            ValueGroup::List(values) => GroupIter::List(values.iter()),
            ValueGroup::Set(values) => GroupIter::Set(values.iter()),
            ValueGroup::OrderedSet(values) => GroupIter::OrderedSet(values.iter()),
        }
    }

    pub fn to_vec(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<V: Eq + Hash> PartialEq for ValueGroup<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueGroup::List(a), ValueGroup::List(b)) => a == b,
            (ValueGroup::Set(a), ValueGroup::Set(b)) => **a == **b,
            (ValueGroup::OrderedSet(a), ValueGroup::OrderedSet(b)) => a.iter().eq(b.iter()),
            _ => false,
        }
    }
}

impl<V: Eq + Hash> Eq for ValueGroup<V> {}

impl<'a, V> IntoIterator for &'a ValueGroup<V> {
    type Item = &'a V;
    type IntoIter = GroupIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Serialize> Serialize for ValueGroup<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Iterator over the values of a [`ValueGroup`].
pub enum GroupIter<'a, V> {
    List(std::slice::Iter<'a, V>),
    Set(std::collections::hash_set::Iter<'a, V>),
    OrderedSet(indexmap::set::Iter<'a, V>),
}

impl<'a, V> Iterator for GroupIter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            GroupIter::List(it) => it.next(),
            GroupIter::Set(it) => it.next(),
            GroupIter::OrderedSet(it) => it.next(),
        }
    }
}

/// Mapping from converted keys to their value groups.
///
/// Every key present has a non-empty group: entries are only recorded once both the
/// key and the value converted.
#[derive(Clone, Debug)]
pub enum Multimap<K, V> {
    Hash(AHashMap<K, ValueGroup<V>>),
    LinkedHash(IndexMap<K, ValueGroup<V>>),
    Tree(BTreeMap<K, ValueGroup<V>>),
}

impl<K: Eq + Hash + Ord, V: Eq + Hash> Multimap<K, V> {
    /// Fresh, empty mapping of the given kind.
    pub fn new(kind: MapKind) -> Self {
        match kind {
            MapKind::Hash => Multimap::Hash(AHashMap::new()),
            MapKind::LinkedHash => Multimap::LinkedHash(IndexMap::new()),
            MapKind::Tree => Multimap::Tree(BTreeMap::new()),
        }
    }

    /// Append `value` to the group under `key`, creating a `collection` group if the key
    /// is new. Returns `false` when a set group silently dropped a duplicate.
    pub fn insert(&mut self, key: K, value: V, collection: CollectionKind) -> bool {
        let group = match self {
            Multimap::Hash(map) => map
                .entry(key)
                .or_insert_with(|| ValueGroup::new(collection)),
            Multimap::LinkedHash(map) => map
                .entry(key)
                .or_insert_with(|| ValueGroup::new(collection)),
            Multimap::Tree(map) => map
                .entry(key)
                .or_insert_with(|| ValueGroup::new(collection)),
        };
        group.push(value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&ValueGroup<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + Ord + ?Sized,
    {
        match self {
            Multimap::Hash(map) => map.get(key),
            Multimap::LinkedHash(map) => map.get(key),
            Multimap::Tree(map) => map.get(key),
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + Ord + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K, V> Multimap<K, V> {
    pub fn kind(&self) -> MapKind {
        match self {
            Multimap::Hash(_) => MapKind::Hash,
            Multimap::LinkedHash(_) => MapKind::LinkedHash,
            Multimap::Tree(_) => MapKind::Tree,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        match self {
            Multimap::Hash(map) => map.len(),
            Multimap::LinkedHash(map) => map.len(),
            Multimap::Tree(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of stored values across all groups.
    pub fn values_len(&self) -> usize {
        self.iter().map(|(_, group)| group.len()).sum()
    }

    /// Iterate `(key, group)` pairs in the map kind's order.
    pub fn iter(&self) -> MapIter<'_, K, V> {
        match self {
            Multimap::Hash(map) => MapIter::Hash(map.iter()),
            Multimap::LinkedHash(map) => MapIter::LinkedHash(map.iter()),
            Multimap::Tree(map) => MapIter::Tree(map.iter()),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// The kind of the value groups, or `None` when the map is empty.
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        self.iter().next().map(|(_, group)| group.kind())
    }
}

impl<K: Eq + Hash + Ord, V: Eq + Hash> PartialEq for Multimap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Multimap::Hash(a), Multimap::Hash(b)) => **a == **b,
            (Multimap::LinkedHash(a), Multimap::LinkedHash(b)) => a.iter().eq(b.iter()),
            (Multimap::Tree(a), Multimap::Tree(b)) => a == b,
            _ => false,
        }
    }
}

impl<K: Eq + Hash + Ord, V: Eq + Hash> Eq for Multimap<K, V> {}

impl<'a, K, V> IntoIterator for &'a Multimap<K, V> {
    type Item = (&'a K, &'a ValueGroup<V>);
    type IntoIter = MapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Serialize, V: Serialize> Serialize for Multimap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Iterator over the `(key, group)` pairs of a [`Multimap`].
pub enum MapIter<'a, K, V> {
    Hash(std::collections::hash_map::Iter<'a, K, ValueGroup<V>>),
    LinkedHash(indexmap::map::Iter<'a, K, ValueGroup<V>>),
    Tree(std::collections::btree_map::Iter<'a, K, ValueGroup<V>>),
}

impl<'a, K, V> Iterator for MapIter<'a, K, V> {
    type Item = (&'a K, &'a ValueGroup<V>);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MapIter::Hash(it) => it.next(),
            MapIter::LinkedHash(it) => it.next(),
            MapIter::Tree(it) => it.next(),
        }
    }
}
