//! Concrete values carried by behavior entries.

use alloc::string::String;
use core::fmt;

/// A scalar or column value.
///
/// Object identifiers and IP addresses travel as dotted text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Signed integer.
    Integer(i64),
    /// Unsigned integer above `i64::MAX`.
    Unsigned(u64),
    /// Text, dotted OID or dotted IPv4 address.
    Text(String),
}

impl Value {
    /// Build a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Build a normalized number, saturating outside the `i64::MIN..=u64::MAX` window.
    #[must_use]
    pub fn from_i128(v: i128) -> Self {
        if let Ok(s) = i64::try_from(v) {
            Self::Integer(s)
        } else if v > 0 {
            Self::Unsigned(u64::try_from(v).unwrap_or(u64::MAX))
        } else {
            Self::Integer(i64::MIN)
        }
    }

    /// Numeric view, if this is a number.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Integer(v) => Some(i128::from(*v)),
            Self::Unsigned(v) => Some(i128::from(*v)),
            Self::Text(_) => None,
        }
    }

    /// Text view, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Self::Unsigned(v), Self::Integer)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
