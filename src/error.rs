//! Violations found while walking a document, and their location.
use std::fmt;

use crate::budget::BudgetBreach;
use crate::conversions::ConversionError;
use crate::location::Location;

/// A grammar, conversion or resource violation.
///
/// Structural root violations, XML syntax errors and budget breaches are fatal: they
/// abort the parse regardless of the continue-on-error setting (see [`Error::is_fatal`]).
/// Everything else is skipped when continue-on-error is enabled.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The document ended before a `<map>` start tag was found.
    MissingRoot { location: Location },
    /// A `<map>` tag exists but is not the single outermost element.
    MisplacedRoot { location: Location },
    /// An attribute that the element does not recognize.
    UnknownAttribute {
        element: String,
        name: String,
        location: Location,
    },
    /// A `type` or `collection` attribute whose value names no known kind.
    InvalidKind {
        attribute: &'static str,
        value: String,
        location: Location,
    },
    /// A child element that is not allowed at this position.
    UnknownTag {
        parent: String,
        name: String,
        location: Location,
    },
    /// Non-whitespace text where only elements are allowed.
    UnexpectedText { element: String, location: Location },
    /// An entry that provides neither a well-formed attribute form nor tag form.
    MalformedEntry {
        reason: &'static str,
        location: Location,
    },
    /// The key token failed its conversion.
    KeyConversion {
        cause: ConversionError,
        location: Location,
    },
    /// The value token failed its conversion.
    ValueConversion {
        cause: ConversionError,
        location: Location,
    },
    /// The input is not well-formed XML.
    Syntax { msg: String, location: Location },
    /// Unexpected end of input inside an open element.
    Eof { location: Location },
    /// A resource budget limit was exceeded.
    Budget {
        breach: BudgetBreach,
        location: Location,
    },
}

impl Error {
    pub(crate) fn eof(location: Location) -> Self {
        Error::Eof { location }
    }

    pub(crate) fn syntax<S: Into<String>>(msg: S, location: Location) -> Self {
        Error::Syntax {
            msg: msg.into(),
            location,
        }
    }

    pub(crate) fn budget(breach: BudgetBreach, location: Location) -> Self {
        Error::Budget { breach, location }
    }

    /// Fatal violations abort the parse even when continue-on-error is set.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingRoot { .. }
                | Error::MisplacedRoot { .. }
                | Error::Syntax { .. }
                | Error::Eof { .. }
                | Error::Budget { .. }
        )
    }

    /// Conversion violations, as opposed to grammar and resource ones.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            Error::KeyConversion { .. } | Error::ValueConversion { .. }
        )
    }

    /// Where the violation was found, if known.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::MissingRoot { location }
            | Error::MisplacedRoot { location }
            | Error::UnknownAttribute { location, .. }
            | Error::InvalidKind { location, .. }
            | Error::UnknownTag { location, .. }
            | Error::UnexpectedText { location, .. }
            | Error::MalformedEntry { location, .. }
            | Error::KeyConversion { location, .. }
            | Error::ValueConversion { location, .. }
            | Error::Syntax { location, .. }
            | Error::Eof { location }
            | Error::Budget { location, .. } => {
                if location.is_known() {
                    Some(*location)
                } else {
                    None
                }
            }
        }
    }

    /// The message without location suffix.
    pub(crate) fn message(&self) -> String {
        match self {
            Error::MissingRoot { .. } => "no <map> root element found".to_owned(),
            Error::MisplacedRoot { .. } => {
                "<map> must be the single outermost element of the document".to_owned()
            }
            Error::UnknownAttribute { element, name, .. } => {
                format!("unknown attribute `{name}` on <{element}>")
            }
            Error::InvalidKind {
                attribute, value, ..
            } => format!("invalid `{attribute}` value `{value}`"),
            Error::UnknownTag { parent, name, .. } => {
                format!("unknown element <{name}> inside <{parent}>")
            }
            Error::UnexpectedText { element, .. } => {
                format!("unexpected text inside <{element}>")
            }
            Error::MalformedEntry { reason, .. } => format!("malformed entry: {reason}"),
            Error::KeyConversion { cause, .. } => format!("key conversion failed: {cause}"),
            Error::ValueConversion { cause, .. } => format!("value conversion failed: {cause}"),
            Error::Syntax { msg, .. } => format!("XML syntax error: {msg}"),
            Error::Eof { .. } => "unexpected end of input".to_owned(),
            Error::Budget { breach, .. } => format!("XML budget breached: {breach:?}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_with_location(f, &self.message(), self.location())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::KeyConversion { cause, .. } | Error::ValueConversion { cause, .. } => {
                Some(cause)
            }
            _ => None,
        }
    }
}

fn fmt_with_location(
    f: &mut fmt::Formatter<'_>,
    msg: &str,
    location: Option<Location>,
) -> fmt::Result {
    match location {
        Some(location) => write!(
            f,
            "{msg} at line {}, column {}",
            location.line(),
            location.column()
        ),
        None => write!(f, "{msg}"),
    }
}
