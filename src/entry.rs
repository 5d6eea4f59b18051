//! Recognition of a single `<entry>` element.
//!
//! An entry is written in one of three forms, chosen by the attributes of the entry tag:
//!
//! ```xml
//! <entry key="K" value="V"/>                   <!-- attributes -->
//! <entry key="K">V</entry>                     <!-- key attribute + body text -->
//! <entry><key>K</key><value>V</value></entry>  <!-- child tags -->
//! ```
//!
//! When both attributes are present the children are not inspected at all.

use crate::error::Error;
use crate::events::{self, Attributes, Ev, Events};
use crate::location::Location;
use crate::policy::ErrorPolicy;

pub(crate) const KEY: &str = "key";
pub(crate) const VALUE: &str = "value";

/// Which syntax an entry was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryForm {
    Attributes,
    KeyAttribute,
    Tags,
}

/// An unconverted key or value token and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) text: String,
    pub(crate) location: Location,
}

/// One raw key/value pair, before conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawEntry {
    pub(crate) key: Token,
    pub(crate) value: Token,
    pub(crate) form: EntryForm,
}

/// Extract one entry whose start tag has just been consumed.
///
/// On `Ok` the stream is positioned after the entry's end tag. `Ok(None)` means the entry
/// was dropped under continue-on-error; `Err` aborts the parse.
pub(crate) fn extract(
    ev: &mut dyn Events,
    policy: &mut ErrorPolicy,
    tag: &str,
    attributes: Attributes,
    location: Location,
) -> Result<Option<RawEntry>, Error> {
    let mut key_attr = None;
    let mut value_attr = None;
    for attr in attributes {
        if attr.name.eq_ignore_ascii_case(KEY) {
            key_attr = Some(attr.value);
        } else if attr.name.eq_ignore_ascii_case(VALUE) {
            value_attr = Some(attr.value);
        } else {
            policy.recover(Error::UnknownAttribute {
                element: tag.to_owned(),
                name: attr.name,
                location,
            })?;
        }
    }

    let token = |text: String| Token { text, location };
    match (key_attr, value_attr) {
        (Some(key), Some(value)) => {
            ev.skip_element()?;
            Ok(Some(RawEntry {
                key: token(key),
                value: token(value),
                form: EntryForm::Attributes,
            }))
        }
        (Some(key), None) => {
            let value = read_text(ev, policy, tag, location, Leaf::EntryBody)?;
            Ok(value.map(|value| RawEntry {
                key: token(key),
                value,
                form: EntryForm::KeyAttribute,
            }))
        }
        (None, Some(_)) => {
            ev.skip_element()?;
            policy.recover(Error::MalformedEntry {
                reason: "`value` attribute without a `key` attribute",
                location,
            })?;
            Ok(None)
        }
        (None, None) => read_tags(ev, policy, tag, location),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Leaf {
    /// Body of an entry with only a `key` attribute: child elements are unknown tags.
    EntryBody,
    /// Body of a `<key>` or `<value>` child: child elements make the entry malformed.
    KeyOrValue,
}

/// Collect the text of the current element through its end tag.
///
/// Returns `Ok(None)` if the element turned out malformed and was skipped.
fn read_text(
    ev: &mut dyn Events,
    policy: &mut ErrorPolicy,
    tag: &str,
    location: Location,
    leaf: Leaf,
) -> Result<Option<Token>, Error> {
    let mut text = String::new();
    let mut text_location = None;
    let mut malformed = false;

    loop {
        match ev.next()? {
            Some(Ev::Text { value, location }) => {
                text_location.get_or_insert(location);
                text.push_str(&value);
            }
            Some(Ev::Start {
                name,
                location: child,
                ..
            }) => {
                let err = match leaf {
                    Leaf::EntryBody => Error::UnknownTag {
                        parent: tag.to_owned(),
                        name,
                        location: child,
                    },
                    Leaf::KeyOrValue => {
                        malformed = true;
                        Error::MalformedEntry {
                            reason: "nested element inside <key> or <value>",
                            location: child,
                        }
                    }
                };
                policy.recover(err)?;
                ev.skip_element()?;
            }
            Some(Ev::End { .. }) => break,
            None => return Err(Error::eof(ev.last_location())),
        }
    }

    if malformed {
        return Ok(None);
    }
    Ok(Some(Token {
        text,
        location: text_location.unwrap_or(location),
    }))
}

fn read_tags(
    ev: &mut dyn Events,
    policy: &mut ErrorPolicy,
    tag: &str,
    location: Location,
) -> Result<Option<RawEntry>, Error> {
    let mut key: Option<Token> = None;
    let mut value: Option<Token> = None;
    let mut dropped = false;

    loop {
        match ev.next()? {
            Some(Ev::Start {
                name,
                attributes,
                location: child,
            }) => {
                let slot = if name.eq_ignore_ascii_case(KEY) {
                    &mut key
                } else if name.eq_ignore_ascii_case(VALUE) {
                    &mut value
                } else {
                    policy.recover(Error::UnknownTag {
                        parent: tag.to_owned(),
                        name,
                        location: child,
                    })?;
                    ev.skip_element()?;
                    continue;
                };

                for attr in attributes {
                    policy.recover(Error::UnknownAttribute {
                        element: name.clone(),
                        name: attr.name,
                        location: child,
                    })?;
                }

                if slot.is_some() {
                    dropped = true;
                    policy.recover(Error::MalformedEntry {
                        reason: "duplicate <key> or <value> element",
                        location: child,
                    })?;
                    ev.skip_element()?;
                    continue;
                }

                match read_text(ev, policy, &name, child, Leaf::KeyOrValue)? {
                    Some(token) => *slot = Some(token),
                    None => dropped = true,
                }
            }
            Some(Ev::Text { value, .. }) if events::is_blank(&value) => {}
            Some(Ev::Text {
                location: text_location,
                ..
            }) => {
                policy.recover(Error::UnexpectedText {
                    element: tag.to_owned(),
                    location: text_location,
                })?;
            }
            Some(Ev::End { .. }) => break,
            None => return Err(Error::eof(ev.last_location())),
        }
    }

    if dropped {
        return Ok(None);
    }
    match (key, value) {
        (Some(key), Some(value)) => Ok(Some(RawEntry {
            key,
            value,
            form: EntryForm::Tags,
        })),
        (None, _) => {
            policy.recover(Error::MalformedEntry {
                reason: "missing <key> element",
                location,
            })?;
            Ok(None)
        }
        (Some(_), None) => {
            policy.recover(Error::MalformedEntry {
                reason: "missing <value> element",
                location,
            })?;
            Ok(None)
        }
    }
}
