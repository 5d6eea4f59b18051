//! Configured entry points.

use std::fmt;
use std::hash::Hash;

use crate::budget::Budget;
use crate::containers::{CollectionKind, MapKind, Multimap};
use crate::conversions::{Conversion, string_conversion};
use crate::error::Error;
use crate::events::{Events, LiveEvents};
use crate::options::{Options, TypeOverride};
use crate::walker::Walker;

/// Everything one parse needs: how to convert keys and values, and the [`Options`].
///
/// Never mutated during a parse, so one config may drive any number of parses,
/// sequentially or from several threads at once.
pub struct ParserConfig<K, V> {
    key_conversion: Conversion<K>,
    value_conversion: Conversion<V>,
    options: Options,
}

impl<K, V> ParserConfig<K, V> {
    pub fn new(
        key_conversion: Conversion<K>,
        value_conversion: Conversion<V>,
        options: Options,
    ) -> Self {
        Self {
            key_conversion,
            value_conversion,
            options,
        }
    }

    pub fn key_conversion(&self) -> &Conversion<K> {
        &self.key_conversion
    }

    pub fn value_conversion(&self) -> &Conversion<V> {
        &self.value_conversion
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn type_override(&self) -> TypeOverride {
        self.options.type_override()
    }
}

impl<K, V> Clone for ParserConfig<K, V> {
    fn clone(&self) -> Self {
        Self {
            key_conversion: self.key_conversion.clone(),
            value_conversion: self.value_conversion.clone(),
            options: self.options.clone(),
        }
    }
}

impl<K, V> fmt::Debug for ParserConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("key", &std::any::type_name::<K>())
            .field("value", &std::any::type_name::<V>())
            .field("options", &self.options)
            .finish()
    }
}

/// Outcome of one parse.
///
/// `violations` holds every violation skipped under continue-on-error, followed by the
/// aborting one when `aborted` is set. An aborted parse always carries an empty map of
/// the resolved kind.
#[derive(Clone, Debug)]
pub struct ParseReport<K, V> {
    pub map: Multimap<K, V>,
    pub violations: Vec<Error>,
    pub aborted: bool,
}

impl<K, V> ParseReport<K, V> {
    /// No violation of any kind was found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violation that aborted the parse, if any.
    pub fn fatal(&self) -> Option<&Error> {
        if self.aborted {
            self.violations.last()
        } else {
            None
        }
    }

    /// `Err` with the aborting violation, else the map.
    pub fn into_result(mut self) -> Result<Multimap<K, V>, Error> {
        if self.aborted
            && let Some(err) = self.violations.pop()
        {
            return Err(err);
        }
        Ok(self.map)
    }
}

/// Immutable, fluent parser.
///
/// Every builder call consumes the parser and returns a new one.
///
/// ```rust
/// use xml_multimap::{boolean_conversion, integer_conversion, MultimapParser};
///
/// let parser = MultimapParser::new()
///     .with_key_conversion(integer_conversion())
///     .with_value_conversion(boolean_conversion())
///     .continue_on_error(true);
///
/// let map = parser.parse(r#"
///     <map>
///         <entry key="1" value="true"/>
///         <entry key="1" value="nope"/>
///     </map>
/// "#);
/// assert_eq!(map.get(&1).unwrap().to_vec(), vec![true]);
/// ```
#[derive(Debug)]
pub struct MultimapParser<K, V> {
    config: ParserConfig<K, V>,
}

impl<K, V> Clone for MultimapParser<K, V> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl MultimapParser<String, String> {
    /// String keys and values, default options.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::new(
                string_conversion(),
                string_conversion(),
                Options::default(),
            ),
        }
    }
}

impl Default for MultimapParser<String, String> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MultimapParser<K, V> {
    pub fn from_config(config: ParserConfig<K, V>) -> Self {
        Self { config }
    }

    pub fn with_key_conversion<K2>(self, key_conversion: Conversion<K2>) -> MultimapParser<K2, V> {
        let ParserConfig {
            value_conversion,
            options,
            ..
        } = self.config;
        MultimapParser {
            config: ParserConfig::new(key_conversion, value_conversion, options),
        }
    }

    pub fn with_value_conversion<V2>(
        self,
        value_conversion: Conversion<V2>,
    ) -> MultimapParser<K, V2> {
        let ParserConfig {
            key_conversion,
            options,
            ..
        } = self.config;
        MultimapParser {
            config: ParserConfig::new(key_conversion, value_conversion, options),
        }
    }

    /// Force the outer map kind, whatever the document declares.
    pub fn with_map_kind(mut self, kind: MapKind) -> Self {
        self.config.options.map_kind = Some(kind);
        self
    }

    /// Force the value group kind, whatever the document declares.
    pub fn with_collection_kind(mut self, kind: CollectionKind) -> Self {
        self.config.options.collection_kind = Some(kind);
        self
    }

    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.config.options.continue_on_error = enabled;
        self
    }

    pub fn trim_text(mut self, enabled: bool) -> Self {
        self.config.options.trim_text = enabled;
        self
    }

    /// `None` disables budget enforcement.
    pub fn with_budget(mut self, budget: Option<Budget>) -> Self {
        self.config.options.budget = budget;
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.config.options = options;
        self
    }

    pub fn config(&self) -> &ParserConfig<K, V> {
        &self.config
    }

    pub fn into_config(self) -> ParserConfig<K, V> {
        self.config
    }
}

impl<K, V> MultimapParser<K, V>
where
    K: Eq + Hash + Ord,
    V: Eq + Hash,
{
    /// Parse `input`. Never fails: violations yield an empty or partial map.
    pub fn parse(&self, input: &str) -> Multimap<K, V> {
        self.parse_with_report(input).map
    }

    /// Parse `input` and keep the violations found along the way.
    pub fn parse_with_report(&self, input: &str) -> ParseReport<K, V> {
        let options = &self.config.options;
        let mut src = LiveEvents::new(input, options.budget.clone(), options.trim_text);
        self.parse_events(&mut src)
    }

    /// Parse an already tokenized document.
    ///
    /// The budget and text trimming are properties of the tokenizer, so they do not apply
    /// here; the caller's event source is used as is.
    pub fn parse_events(&self, events: &mut dyn Events) -> ParseReport<K, V> {
        Walker::new(&self.config).run(events)
    }
}

/// Parse a map of strings with default options.
///
/// ```rust
/// let map = xml_multimap::from_str(r#"<map><entry key="k">v</entry></map>"#);
/// assert_eq!(map.get("k").unwrap().to_vec(), vec!["v".to_string()]);
/// ```
pub fn from_str(input: &str) -> Multimap<String, String> {
    MultimapParser::new().parse(input)
}

/// Parse a map of strings with the given [`Options`].
pub fn from_str_with_options(input: &str, options: Options) -> Multimap<String, String> {
    MultimapParser::new().with_options(options).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversions::integer_conversion;

    #[test]
    fn builder_calls_leave_the_original_untouched() {
        let base = MultimapParser::new();
        let tuned = base.clone().with_map_kind(MapKind::Tree).continue_on_error(true);
        assert_eq!(base.config().type_override(), TypeOverride::None);
        assert_eq!(tuned.config().type_override(), TypeOverride::Map(MapKind::Tree));
        assert!(tuned.config().options().continue_on_error);
        assert!(!base.config().options().continue_on_error);
    }

    #[test]
    fn changing_conversions_keeps_options() {
        let parser = MultimapParser::new()
            .with_collection_kind(CollectionKind::Set)
            .with_key_conversion(integer_conversion());
        assert_eq!(
            parser.config().type_override(),
            TypeOverride::Collection(CollectionKind::Set)
        );
        let map =
            parser.parse(r#"<map><entry key="7" value="x"/><entry key="7" value="x"/></map>"#);
        assert_eq!(map.get(&7).unwrap().len(), 1);
    }

    #[test]
    fn into_result_surfaces_the_abort() {
        let report = MultimapParser::new().parse_with_report("<nothing/>");
        assert!(report.aborted);
        assert!(matches!(report.fatal(), Some(Error::MissingRoot { .. })));
        assert!(matches!(report.into_result(), Err(Error::MissingRoot { .. })));

        let report = MultimapParser::new().parse_with_report("<map/>");
        assert!(report.is_clean());
        assert!(report.into_result().unwrap().is_empty());
    }
}
