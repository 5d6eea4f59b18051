//! Owned XML event stream fed to the document walker.
//!
//! [`LiveEvents`] wraps a `quick_xml::Reader` and:
//! - skips comments, processing instructions, XML declarations and DOCTYPE
//! - expands empty elements into a start/end pair
//! - merges adjacent text and CDATA runs; when trimming, drops runs that trim to nothing
//! - resolves byte offsets into line/column [`Location`]s
//! - enforces an optional [`Budget`]

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;

use crate::budget::{Budget, BudgetEnforcer};
use crate::error::Error;
use crate::location::{LineIndex, Location};

/// One attribute of a start tag, with its value already unescaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Attributes of a single start tag. Most tags in a map document carry at most two.
pub type Attributes = SmallVec<[Attribute; 4]>;

/// Simplified owned event kind consumed by the walker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ev {
    Start {
        name: String,
        attributes: Attributes,
        location: Location,
    },
    End {
        name: String,
        location: Location,
    },
    /// A run of character data. Whitespace-only runs appear only when text is not trimmed.
    Text { value: String, location: Location },
}

impl Ev {
    pub fn location(&self) -> Location {
        match self {
            Ev::Start { location, .. } | Ev::End { location, .. } | Ev::Text { location, .. } => {
                *location
            }
        }
    }
}

/// Forward-only source of [`Ev`]s.
pub trait Events {
    fn next(&mut self) -> Result<Option<Ev>, Error>;

    fn last_location(&self) -> Location;

    /// Consume events through the end tag matching an already consumed start tag.
    fn skip_element(&mut self) -> Result<(), Error> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()? {
                Some(Ev::Start { .. }) => depth += 1,
                Some(Ev::End { .. }) => depth -= 1,
                Some(Ev::Text { .. }) => {}
                None => return Err(Error::eof(self.last_location())),
            }
        }
        Ok(())
    }
}

/// Live event source over a `quick_xml::Reader`.
pub(crate) struct LiveEvents<'a> {
    reader: Reader<&'a [u8]>,
    index: LineIndex<'a>,
    input_len: usize,
    budget: Option<BudgetEnforcer>,
    trim_text: bool,
    started: bool,
    // Open elements, for reporting truncated input.
    depth: usize,
    // First non-text event read while merging a text run.
    stash: Option<Ev>,
    // End event synthesized for an empty element.
    pending_end: Option<Ev>,
    last_location: Location,
}

impl<'a> LiveEvents<'a> {
    /// Create a new live event source.
    ///
    /// # Parameters
    /// - `input`: XML source string.
    /// - `budget`: optional budget, enforced on every event handed out.
    /// - `trim_text`: trim leading/trailing XML whitespace off text runs.
    pub(crate) fn new(input: &'a str, budget: Option<Budget>, trim_text: bool) -> Self {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            index: LineIndex::new(input),
            input_len: input.len(),
            budget: budget.map(BudgetEnforcer::new),
            trim_text,
            started: false,
            depth: 0,
            stash: None,
            pending_end: None,
            last_location: Location::UNKNOWN,
        }
    }

    fn next_impl(&mut self) -> Result<Option<Ev>, Error> {
        if !self.started {
            self.started = true;
            if let Some(budget) = self.budget.as_mut() {
                budget
                    .observe_input(self.input_len)
                    .map_err(|breach| Error::budget(breach, Location::UNKNOWN))?;
            }
        }

        loop {
            let raw = match self.stash.take() {
                Some(ev) => Some(ev),
                None => self.read_raw()?,
            };

            let ev = match raw {
                None => return Ok(None),
                Some(Ev::Text {
                    mut value,
                    location,
                }) => {
                    loop {
                        match self.read_raw()? {
                            Some(Ev::Text { value: more, .. }) => value.push_str(&more),
                            other => {
                                self.stash = other;
                                break;
                            }
                        }
                    }
                    if self.trim_text {
                        let trimmed = trim_xml_whitespace(&value);
                        if trimmed.is_empty() {
                            continue;
                        }
                        if trimmed.len() != value.len() {
                            value = trimmed.to_owned();
                        }
                    }
                    Ev::Text { value, location }
                }
                Some(other) => other,
            };

            if let Some(budget) = self.budget.as_mut() {
                budget
                    .observe(&ev)
                    .map_err(|breach| Error::budget(breach, ev.location()))?;
            }
            self.last_location = ev.location();
            return Ok(Some(ev));
        }
    }

    fn read_raw(&mut self) -> Result<Option<Ev>, Error> {
        if let Some(ev) = self.pending_end.take() {
            return Ok(Some(ev));
        }

        loop {
            let location = self.index.locate(self.reader.buffer_position() as usize);

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.depth += 1;
                    return start_event(&e, location).map(Some);
                }
                Ok(Event::Empty(e)) => {
                    let ev = start_event(&e, location)?;
                    if let Ev::Start { name, .. } = &ev {
                        self.pending_end = Some(Ev::End {
                            name: name.clone(),
                            location,
                        });
                    }
                    return Ok(Some(ev));
                }
                Ok(Event::End(e)) => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Some(Ev::End {
                        name: decode_name(e.name().as_ref()),
                        location,
                    }));
                }
                Ok(Event::Text(e)) => {
                    let value = e.unescape().map_err(|err| {
                        Error::syntax(format!("invalid text content: {err}"), location)
                    })?;
                    return Ok(Some(Ev::Text {
                        value: value.into_owned(),
                        location,
                    }));
                }
                Ok(Event::CData(e)) => {
                    return Ok(Some(Ev::Text {
                        value: String::from_utf8_lossy(e.as_ref()).into_owned(),
                        location,
                    }));
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {
                    continue;
                }
                Ok(Event::Eof) => {
                    if self.depth > 0 {
                        return Err(Error::eof(location));
                    }
                    return Ok(None);
                }
                Err(err) => {
                    let location = self.index.locate(self.reader.error_position() as usize);
                    return Err(Error::syntax(err.to_string(), location));
                }
            }
        }
    }

    /// Budget counters observed so far.
    #[cfg(test)]
    pub(crate) fn budget_report(self) -> Option<crate::budget::BudgetReport> {
        self.budget.map(BudgetEnforcer::finalize)
    }
}

impl<'a> Events for LiveEvents<'a> {
    fn next(&mut self) -> Result<Option<Ev>, Error> {
        self.next_impl()
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}

/// Event source that replays a pre-built buffer, e.g. events produced by another XML
/// pull parser.
pub struct ReplayEvents {
    buf: std::vec::IntoIter<Ev>,
    last_location: Location,
}

impl ReplayEvents {
    pub fn new(buf: Vec<Ev>) -> Self {
        Self {
            buf: buf.into_iter(),
            last_location: Location::UNKNOWN,
        }
    }
}

impl Events for ReplayEvents {
    fn next(&mut self) -> Result<Option<Ev>, Error> {
        let ev = self.buf.next();
        if let Some(ev) = &ev {
            self.last_location = ev.location();
        }
        Ok(ev)
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}

fn start_event(e: &BytesStart<'_>, location: Location) -> Result<Ev, Error> {
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::syntax(format!("invalid attribute: {err}"), location))?;
        let value = attr.unescape_value().map_err(|err| {
            Error::syntax(format!("invalid attribute value: {err}"), location)
        })?;
        attributes.push(Attribute {
            name: decode_name(attr.key.as_ref()),
            value: value.into_owned(),
        });
    }
    Ok(Ev::Start {
        name: decode_name(e.name().as_ref()),
        attributes,
        location,
    })
}

fn decode_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn trim_xml_whitespace(s: &str) -> &str {
    s.trim_matches(is_xml_whitespace)
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Text that only separates elements, such as indentation between `<entry>` tags.
pub(crate) fn is_blank(text: &str) -> bool {
    text.chars().all(is_xml_whitespace)
}
