use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::containers::{CollectionKind, MapKind};

/// Parser configuration options.
///
/// Use this to override container kinds, choose between fail-fast and
/// continue-on-error, and set an optional [`Budget`].
///
/// Example: parse a small map, forcing a sorted outer map.
///
/// ```rust
/// use xml_multimap::{from_str_with_options, MapKind};
///
/// let xml = r#"
/// <map type="LINKED_HASHMAP">
///     <entry key="b" value="2"/>
///     <entry key="a" value="1"/>
/// </map>
/// "#;
///
/// let options = xml_multimap::options! {
///     map_kind: Some(MapKind::Tree),
/// };
///
/// let map = from_str_with_options(xml, options);
/// assert_eq!(map.kind(), MapKind::Tree);
/// assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Map kind override. Takes precedence over the root tag's `type` attribute.
    pub map_kind: Option<MapKind>,
    /// Collection kind override. Takes precedence over the root tag's `collection` attribute.
    pub collection_kind: Option<CollectionKind>,
    /// If true, violations other than fatal ones skip only the offending
    /// attribute, element or entry. If false (default), the first violation aborts
    /// the parse and an empty map of the resolved kind is returned.
    pub continue_on_error: bool,
    /// Trim leading and trailing XML whitespace from element text. Default: true.
    /// Attribute values are never trimmed.
    pub trim_text: bool,
    /// Optional budget enforced while reading the document.
    pub budget: Option<Budget>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            map_kind: None,
            collection_kind: None,
            continue_on_error: false,
            trim_text: true,
            budget: Some(Budget::default()),
        }
    }
}

impl Options {
    /// The explicit container overrides captured by these options.
    pub fn type_override(&self) -> TypeOverride {
        match (self.map_kind, self.collection_kind) {
            (None, None) => TypeOverride::None,
            (Some(map), None) => TypeOverride::Map(map),
            (None, Some(collection)) => TypeOverride::Collection(collection),
            (Some(map), Some(collection)) => TypeOverride::Both(map, collection),
        }
    }
}

/// Caller-specified container kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeOverride {
    #[default]
    None,
    Map(MapKind),
    Collection(CollectionKind),
    Both(MapKind, CollectionKind),
}

impl TypeOverride {
    pub fn map_kind(&self) -> Option<MapKind> {
        match self {
            TypeOverride::Map(map) | TypeOverride::Both(map, _) => Some(*map),
            TypeOverride::None | TypeOverride::Collection(_) => None,
        }
    }

    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match self {
            TypeOverride::Collection(collection) | TypeOverride::Both(_, collection) => {
                Some(*collection)
            }
            TypeOverride::None | TypeOverride::Map(_) => None,
        }
    }

    /// Resolve the container kinds for one parse.
    ///
    /// Each axis independently takes the override if present, else the value
    /// declared in the document, else the default (hash map, list).
    pub fn resolve(
        &self,
        declared_map: Option<MapKind>,
        declared_collection: Option<CollectionKind>,
    ) -> (MapKind, CollectionKind) {
        let map = self.map_kind().or(declared_map).unwrap_or_default();
        let collection = self
            .collection_kind()
            .or(declared_collection)
            .unwrap_or_default();
        (map, collection)
    }
}
