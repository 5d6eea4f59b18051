//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! These macros keep call sites ergonomic while allowing the crate to evolve
//! its option structs over time (e.g., adding fields) without forcing breaking changes.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// use xml_multimap::CollectionKind;
///
/// let options = xml_multimap::options! {
///     collection_kind: Some(CollectionKind::OrderedSet),
///     continue_on_error: true,
/// };
/// assert!(options.continue_on_error);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            #[allow(deprecated)]
            {
                opt.$field = $value;
            }
        )*
        opt
    }};
}

/// Construct [`crate::Budget`] from `Default` and a list of field assignments.
///
/// ```rust
/// let budget = xml_multimap::budget! {
///     max_depth: 8,
/// };
/// assert_eq!(budget.max_depth, 8);
/// ```
#[macro_export]
macro_rules! budget {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut budget = $crate::Budget::default();
        $(
            {
                budget.$field = $value;
            }
        )*
        budget
    }};
}
