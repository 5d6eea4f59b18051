//! Token conversions: pure `&str -> Result<T, ConversionError>` functions applied to
//! every key and value token read from the document.
//!
//! A conversion must be total: it reports failure through [`ConversionError`] and never
//! panics. The built-ins below cover common scalar targets; any closure with the right
//! signature can be wrapped with [`conversion`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Shared, thread-safe conversion function.
pub type Conversion<T> = Arc<dyn Fn(&str) -> Result<T, ConversionError> + Send + Sync>;

/// Why a token could not be converted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionError {
    /// The token is not a numeral of the target type.
    NumberFormat {
        token: String,
        target: &'static str,
    },
    /// The token is outside the set of values the conversion accepts.
    InvalidArgument { token: String, message: String },
    /// Free-form failure reported by a caller-supplied conversion.
    Custom(String),
}

impl ConversionError {
    /// Construct a free-form error, for use in caller-supplied conversions.
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        ConversionError::Custom(msg.into())
    }

    pub(crate) fn number_format(token: &str, target: &'static str) -> Self {
        ConversionError::NumberFormat {
            token: token.to_owned(),
            target,
        }
    }

    /// The offending token, when the conversion recorded it.
    pub fn token(&self) -> Option<&str> {
        match self {
            ConversionError::NumberFormat { token, .. }
            | ConversionError::InvalidArgument { token, .. } => Some(token),
            ConversionError::Custom(_) => None,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::NumberFormat { token, target } => {
                write!(f, "invalid {target}: `{token}`")
            }
            ConversionError::InvalidArgument { token, message } => {
                write!(f, "{message}: `{token}`")
            }
            ConversionError::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Wrap a closure as a [`Conversion`].
///
/// ```rust
/// use xml_multimap::conversions::{conversion, ConversionError};
///
/// let upper = conversion(|token| {
///     if token.is_empty() {
///         Err(ConversionError::custom("empty token"))
///     } else {
///         Ok(token.to_uppercase())
///     }
/// });
/// assert_eq!(upper("abc").unwrap(), "ABC");
/// ```
pub fn conversion<T, F>(f: F) -> Conversion<T>
where
    F: Fn(&str) -> Result<T, ConversionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identity conversion. Always succeeds, including for the empty token.
pub fn string_conversion() -> Conversion<String> {
    conversion(|token| Ok(token.to_owned()))
}

/// Conversion through the standard [`FromStr`] grammar of `T`.
///
/// Failures are reported as [`ConversionError::NumberFormat`] naming `T`, which is the
/// right shape for numeric targets; wrap a custom closure for anything else.
pub fn from_str_conversion<T>() -> Conversion<T>
where
    T: FromStr + 'static,
{
    let target = std::any::type_name::<T>();
    conversion(move |token| {
        token
            .parse::<T>()
            .map_err(|_| ConversionError::number_format(token, target))
    })
}

/// 32-bit signed integer conversion.
pub fn integer_conversion() -> Conversion<i32> {
    conversion(|token| {
        token
            .parse::<i32>()
            .map_err(|_| ConversionError::number_format(token, "integer"))
    })
}

/// 16-bit signed integer conversion.
pub fn short_conversion() -> Conversion<i16> {
    conversion(|token| {
        token
            .parse::<i16>()
            .map_err(|_| ConversionError::number_format(token, "short"))
    })
}

/// Double-precision float conversion.
pub fn double_conversion() -> Conversion<TotalF64> {
    conversion(|token| {
        token
            .parse::<f64>()
            .map(TotalF64)
            .map_err(|_| ConversionError::number_format(token, "double"))
    })
}

/// Single-precision float conversion.
pub fn float_conversion() -> Conversion<TotalF32> {
    conversion(|token| {
        token
            .parse::<f32>()
            .map(TotalF32)
            .map_err(|_| ConversionError::number_format(token, "float"))
    })
}

/// Boolean conversion: accepts `true` and `false` in any letter case, nothing else.
pub fn boolean_conversion() -> Conversion<bool> {
    conversion(|token| {
        if token.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if token.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConversionError::InvalidArgument {
                token: token.to_owned(),
                message: "cannot parse to boolean".to_owned(),
            })
        }
    })
}

macro_rules! total_float {
    ($name:ident, $float:ty) => {
        /// Float with total equality, ordering and hashing (IEEE 754 `totalOrder`).
        ///
        /// Two values are equal iff their bit patterns are equal, so `NaN == NaN` and
        /// `-0.0 != 0.0`. This lets floats serve as multimap keys under every map kind
        /// and as values under the set collection kinds.
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name(pub $float);

        impl $name {
            pub fn get(self) -> $float {
                self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.to_bits() == other.0.to_bits()
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.to_bits().hash(state);
            }
        }

        impl From<$float> for $name {
            fn from(value: $float) -> Self {
                $name(value)
            }
        }

        impl From<$name> for $float {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<$float> for $name {
            fn eq(&self, other: &$float) -> bool {
                *self == $name(*other)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.0.serialize(serializer)
            }
        }
    };
}

total_float!(TotalF64, f64);
total_float!(TotalF32, f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_an_empty_string() {
        assert_eq!(string_conversion()("").unwrap(), "");
    }

    #[test]
    fn integer_rejects_trailing_garbage() {
        let err = integer_conversion()("42a").unwrap_err();
        assert_eq!(err, ConversionError::number_format("42a", "integer"));
        assert_eq!(err.token(), Some("42a"));
    }

    #[test]
    fn integer_accepts_signs() {
        let conv = integer_conversion();
        assert_eq!(conv("+7").unwrap(), 7);
        assert_eq!(conv("-7").unwrap(), -7);
    }

    #[test]
    fn short_overflow_is_a_number_format_error() {
        assert!(matches!(
            short_conversion()("40000"),
            Err(ConversionError::NumberFormat { target: "short", .. })
        ));
    }

    #[test]
    fn boolean_is_case_insensitive_and_strict() {
        let conv = boolean_conversion();
        assert!(conv("TRUE").unwrap());
        assert!(!conv("False").unwrap());
        assert!(matches!(conv("yes"), Err(ConversionError::InvalidArgument { .. })));
    }

    #[test]
    fn total_floats_compare_by_bits() {
        assert_eq!(TotalF64(f64::NAN), TotalF64(f64::NAN));
        assert_ne!(TotalF64(0.0), TotalF64(-0.0));
        assert!(TotalF32(1.5) < TotalF32(2.0));
        assert_eq!(TotalF64(42.42), 42.42);
    }

    #[test]
    fn from_str_conversion_names_the_target() {
        let err = from_str_conversion::<u8>()("300").unwrap_err();
        assert_eq!(err.to_string(), "invalid u8: `300`");
    }
}
