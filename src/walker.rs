//! Single-pass state machine over the document's event stream.

use std::hash::Hash;

use crate::containers::{CollectionKind, MapKind, Multimap};
use crate::entry::{self, RawEntry};
use crate::error::Error;
use crate::events::{self, Attributes, Ev, Events};
use crate::location::Location;
use crate::parser::{ParseReport, ParserConfig};
use crate::policy::ErrorPolicy;

pub(crate) const ROOT_TAG: &str = "map";
pub(crate) const ENTRY_TAG: &str = "entry";
const TYPE_ATTR: &str = "type";
const COLLECTION_ATTR: &str = "collection";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    SeekingRoot,
    InRoot,
    Done,
}

pub(crate) struct Walker<'c, K, V> {
    config: &'c ParserConfig<K, V>,
    state: State,
    root_name: String,
    map_kind: MapKind,
    collection_kind: CollectionKind,
    map: Multimap<K, V>,
    policy: ErrorPolicy,
}

impl<'c, K, V> Walker<'c, K, V>
where
    K: Eq + Hash + Ord,
    V: Eq + Hash,
{
    pub(crate) fn new(config: &'c ParserConfig<K, V>) -> Self {
        let (map_kind, collection_kind) = config.options().type_override().resolve(None, None);
        Self {
            config,
            state: State::SeekingRoot,
            root_name: ROOT_TAG.to_owned(),
            map_kind,
            collection_kind,
            map: Multimap::new(map_kind),
            policy: ErrorPolicy::new(config.options().continue_on_error),
        }
    }

    /// Consume `ev` to the end and assemble the result.
    pub(crate) fn run(mut self, ev: &mut dyn Events) -> ParseReport<K, V> {
        match self.drive(ev) {
            Ok(()) => {
                tracing::debug!(
                    keys = self.map.len(),
                    values = self.map.values_len(),
                    violations = self.policy.len(),
                    "parsed multimap"
                );
                ParseReport {
                    map: self.map,
                    violations: self.policy.into_violations(),
                    aborted: false,
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "parse aborted");
                let mut violations = self.policy.into_violations();
                violations.push(err);
                ParseReport {
                    map: Multimap::new(self.map_kind),
                    violations,
                    aborted: true,
                }
            }
        }
    }

    fn drive(&mut self, ev: &mut dyn Events) -> Result<(), Error> {
        loop {
            match self.state {
                State::SeekingRoot => self.seek_root(ev)?,
                State::InRoot => self.walk_root(ev)?,
                State::Done => return self.finish(ev),
            }
        }
    }

    fn seek_root(&mut self, ev: &mut dyn Events) -> Result<(), Error> {
        match ev.next()? {
            None => Err(Error::MissingRoot {
                location: ev.last_location(),
            }),
            Some(Ev::Start {
                name,
                attributes,
                location,
            }) if name.eq_ignore_ascii_case(ROOT_TAG) => {
                self.root_name = name;
                self.read_root(attributes, location)?;
                self.state = State::InRoot;
                Ok(())
            }
            Some(Ev::Start { .. }) => Err(find_nested_root(ev)?),
            // Stray top-level text carries no structure.
            Some(Ev::Text { .. }) => Ok(()),
            Some(Ev::End { name, location }) => Err(unmatched_end(&name, location)),
        }
    }

    /// Read the root attributes, then fix the container kinds for the rest of the parse.
    ///
    /// A violation that aborts here leaves the kinds chosen by the overrides alone.
    fn read_root(&mut self, attributes: Attributes, location: Location) -> Result<(), Error> {
        let mut declared_map = None;
        let mut declared_collection = None;

        for attr in attributes {
            if attr.name.eq_ignore_ascii_case(TYPE_ATTR) {
                match attr.value.parse::<MapKind>() {
                    Ok(kind) => declared_map = Some(kind),
                    Err(_) => self.policy.recover(Error::InvalidKind {
                        attribute: TYPE_ATTR,
                        value: attr.value,
                        location,
                    })?,
                }
            } else if attr.name.eq_ignore_ascii_case(COLLECTION_ATTR) {
                match attr.value.parse::<CollectionKind>() {
                    Ok(kind) => declared_collection = Some(kind),
                    Err(_) => self.policy.recover(Error::InvalidKind {
                        attribute: COLLECTION_ATTR,
                        value: attr.value,
                        location,
                    })?,
                }
            } else {
                self.policy.recover(Error::UnknownAttribute {
                    element: self.root_name.clone(),
                    name: attr.name,
                    location,
                })?;
            }
        }

        let (map_kind, collection_kind) = self
            .config
            .options()
            .type_override()
            .resolve(declared_map, declared_collection);
        self.map_kind = map_kind;
        self.collection_kind = collection_kind;
        self.map = Multimap::new(map_kind);
        tracing::debug!(
            ?declared_map,
            ?declared_collection,
            %map_kind,
            %collection_kind,
            "resolved container kinds"
        );
        Ok(())
    }

    fn walk_root(&mut self, ev: &mut dyn Events) -> Result<(), Error> {
        match ev.next()? {
            Some(Ev::Start {
                name,
                attributes,
                location,
            }) if name.eq_ignore_ascii_case(ENTRY_TAG) => {
                let raw = entry::extract(ev, &mut self.policy, &name, attributes, location)?;
                if let Some(raw) = raw {
                    self.assemble(raw)?;
                }
            }
            Some(Ev::Start { name, location, .. }) => {
                self.policy.recover(Error::UnknownTag {
                    parent: self.root_name.clone(),
                    name,
                    location,
                })?;
                ev.skip_element()?;
            }
            Some(Ev::Text { value, .. }) if events::is_blank(&value) => {}
            Some(Ev::Text { location, .. }) => {
                self.policy.recover(Error::UnexpectedText {
                    element: self.root_name.clone(),
                    location,
                })?;
            }
            Some(Ev::End { .. }) => self.state = State::Done,
            None => return Err(Error::eof(ev.last_location())),
        }
        Ok(())
    }

    /// Convert both tokens and insert; a failed conversion drops the whole entry.
    fn assemble(&mut self, raw: RawEntry) -> Result<(), Error> {
        tracing::trace!(form = ?raw.form, key = %raw.key.text, "entry");
        let key = match (self.config.key_conversion())(&raw.key.text) {
            Ok(key) => key,
            Err(cause) => {
                return self.policy.recover(Error::KeyConversion {
                    cause,
                    location: raw.key.location,
                });
            }
        };
        let value = match (self.config.value_conversion())(&raw.value.text) {
            Ok(value) => value,
            Err(cause) => {
                return self.policy.recover(Error::ValueConversion {
                    cause,
                    location: raw.value.location,
                });
            }
        };
        if !self.map.insert(key, value, self.collection_kind) {
            tracing::trace!(key = %raw.key.text, "duplicate value dropped by set group");
        }
        Ok(())
    }

    /// After the root closes only text may follow.
    fn finish(&mut self, ev: &mut dyn Events) -> Result<(), Error> {
        while let Some(next) = ev.next()? {
            match next {
                Ev::Start { location, .. } => return Err(Error::MisplacedRoot { location }),
                Ev::End { name, location } => return Err(unmatched_end(&name, location)),
                Ev::Text { .. } => {}
            }
        }
        Ok(())
    }
}

/// The outermost element is not the root: tell a nested root apart from no root at all.
fn find_nested_root(ev: &mut dyn Events) -> Result<Error, Error> {
    while let Some(next) = ev.next()? {
        if let Ev::Start { name, location, .. } = next
            && name.eq_ignore_ascii_case(ROOT_TAG)
        {
            return Ok(Error::MisplacedRoot { location });
        }
    }
    Ok(Error::MissingRoot {
        location: ev.last_location(),
    })
}

fn unmatched_end(name: &str, location: Location) -> Error {
    Error::syntax(format!("unmatched end tag </{name}>"), location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversions::integer_conversion;
    use crate::events::LiveEvents;
    use crate::parser::MultimapParser;

    fn walk(xml: &str, continue_on_error: bool) -> ParseReport<String, String> {
        let parser = MultimapParser::new().continue_on_error(continue_on_error);
        let mut src = LiveEvents::new(xml, None, true);
        Walker::new(parser.config()).run(&mut src)
    }

    #[test]
    fn empty_root_yields_empty_map() {
        let report = walk("<map/>", false);
        assert!(!report.aborted);
        assert!(report.map.is_empty());
        assert_eq!(report.map.kind(), MapKind::Hash);
    }

    #[test]
    fn root_is_matched_case_insensitively() {
        let report = walk(r#"<MAP Type="treemap"><Entry key="a" value="1"/></MAP>"#, false);
        assert!(!report.aborted);
        assert_eq!(report.map.kind(), MapKind::Tree);
        assert_eq!(report.map.len(), 1);
    }

    #[test]
    fn element_after_root_is_misplaced() {
        let report = walk(r#"<map/><map/>"#, true);
        assert!(report.aborted);
        assert!(matches!(
            report.violations[..],
            [Error::MisplacedRoot { .. }]
        ));
    }

    #[test]
    fn nested_root_is_misplaced_and_plain_document_is_missing_root() {
        let report = walk("<doc><map/></doc>", true);
        assert!(matches!(report.violations[..], [Error::MisplacedRoot { .. }]));

        let report = walk("<doc><entry/></doc>", true);
        assert!(matches!(report.violations[..], [Error::MissingRoot { .. }]));
    }

    #[test]
    fn root_violation_aborts_before_kinds_resolve() {
        let report = walk(
            r#"<map type="TREEMAP" collection="BAG"><entry key="k" value="v"/></map>"#,
            false,
        );
        assert!(report.aborted);
        assert_eq!(report.map.kind(), MapKind::Hash);
        assert!(matches!(
            report.violations[..],
            [Error::InvalidKind {
                attribute: "collection",
                ..
            }]
        ));

        let report = walk(
            r#"<map type="TREEMAP" collection="BAG"><entry key="k" value="v"/></map>"#,
            true,
        );
        assert!(!report.aborted);
        assert_eq!(report.map.kind(), MapKind::Tree);
        assert_eq!(report.map.len(), 1);
    }

    #[test]
    fn conversion_failure_drops_entry() {
        let parser = MultimapParser::new()
            .continue_on_error(true)
            .with_value_conversion(integer_conversion());
        let mut src = LiveEvents::new(
            r#"<map><entry key="a" value="1"/><entry key="a" value="x"/></map>"#,
            None,
            true,
        );
        let report = Walker::new(parser.config()).run(&mut src);
        assert_eq!(report.map.get("a").unwrap().to_vec(), vec![1]);
        assert!(matches!(
            report.violations[..],
            [Error::ValueConversion { .. }]
        ));
    }
}
