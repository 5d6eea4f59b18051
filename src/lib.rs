#![forbid(unsafe_code)]
//! Load `<map>`/`<entry>` XML documents into typed multimaps.
//!
//! ```rust
//! use xml_multimap::{from_str, MapKind};
//!
//! let map = from_str(r#"
//!     <map>
//!         <entry key="foo" value="bar1"/>
//!         <entry key="foo" value="bar2"/>
//!         <entry key="baz">qux1</entry>
//!     </map>
//! "#);
//! assert_eq!(map.kind(), MapKind::Hash);
//! assert_eq!(map.get("foo").unwrap().to_vec(), ["bar1", "bar2"]);
//! assert_eq!(map.get("baz").unwrap().to_vec(), ["qux1"]);
//! ```

pub use budget::{Budget, BudgetBreach, BudgetReport, check_xml_budget};
pub use containers::{CollectionKind, MapKind, Multimap, UnknownKind, ValueGroup};
pub use conversions::{
    Conversion, ConversionError, TotalF32, TotalF64, boolean_conversion, conversion,
    double_conversion, float_conversion, from_str_conversion, integer_conversion,
    short_conversion, string_conversion,
};
pub use error::Error;
pub use events::{Attribute, Attributes, Ev, Events, ReplayEvents};
pub use location::Location;
pub use options::{Options, TypeOverride};
pub use parser::{
    MultimapParser, ParseReport, ParserConfig, from_str, from_str_with_options,
};

pub mod budget;
pub mod containers;
pub mod conversions;
mod entry;
mod error;
pub mod events;
mod location;
mod macros;
pub mod options;
mod parser;
mod policy;
mod snippet;
mod walker;
