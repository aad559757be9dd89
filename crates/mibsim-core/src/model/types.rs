//! Type system types for the canonical registry.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

/// ASN.1 / SMI primitive types seeded into every registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    /// Unconstrained ASN.1 INTEGER.
    Integer,
    /// Signed 32-bit integer (-2147483648..2147483647).
    Integer32,
    /// Unsigned 32-bit integer (0..4294967295).
    Unsigned32,
    /// 32-bit counter, monotonically increasing, wraps.
    Counter32,
    /// 64-bit counter.
    Counter64,
    /// 32-bit gauge, can increase or decrease.
    Gauge32,
    /// Time in hundredths of a second.
    TimeTicks,
    /// IPv4 address as 4 octets.
    IpAddress,
    /// OCTET STRING.
    OctetString,
    /// OBJECT IDENTIFIER.
    ObjectIdentifier,
    /// BITS (bit string with named bits).
    Bits,
    /// Arbitrary ASN.1 data.
    Opaque,
}

impl Primitive {
    /// Get the canonical class name of this primitive.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Integer32 => "Integer32",
            Self::Unsigned32 => "Unsigned32",
            Self::Counter32 => "Counter32",
            Self::Counter64 => "Counter64",
            Self::Gauge32 => "Gauge32",
            Self::TimeTicks => "TimeTicks",
            Self::IpAddress => "IpAddress",
            Self::OctetString => "OctetString",
            Self::ObjectIdentifier => "ObjectIdentifier",
            Self::Bits => "Bits",
            Self::Opaque => "Opaque",
        }
    }

    /// Look up a primitive by class name (case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().find(|p| p.name() == name)
    }

    /// The value representation this primitive serves.
    #[must_use]
    pub const fn kind(self) -> BaseKind {
        match self {
            Self::Integer | Self::Integer32 => BaseKind::Integer,
            Self::Unsigned32 | Self::Counter32 | Self::Counter64 | Self::Gauge32 | Self::TimeTicks => {
                BaseKind::Unsigned
            }
            Self::IpAddress => BaseKind::Address,
            Self::OctetString | Self::Bits | Self::Opaque => BaseKind::Text,
            Self::ObjectIdentifier => BaseKind::ObjectIdentifier,
        }
    }

    /// Iterate over all primitives, in name order.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Bits,
            Self::Counter32,
            Self::Counter64,
            Self::Gauge32,
            Self::Integer,
            Self::Integer32,
            Self::IpAddress,
            Self::ObjectIdentifier,
            Self::OctetString,
            Self::Opaque,
            Self::TimeTicks,
            Self::Unsigned32,
        ]
        .into_iter()
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value representation family of a base type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BaseKind {
    /// Signed integers.
    Integer,
    /// Non-negative integers (counters, gauges, ticks).
    Unsigned,
    /// Octet strings.
    Text,
    /// IPv4 address literal.
    Address,
    /// Dotted object identifier.
    ObjectIdentifier,
}

impl BaseKind {
    /// Check if the representation is numeric.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Unsigned)
    }

    /// Get a string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Unsigned => "unsigned",
            Self::Text => "text",
            Self::Address => "address",
            Self::ObjectIdentifier => "object-identifier",
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level of an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Access {
    /// Can only be read.
    #[default]
    ReadOnly,
    /// Can be read and written.
    ReadWrite,
    /// Can be read, written, or used to create rows.
    ReadCreate,
    /// Not accessible via SNMP.
    NotAccessible,
    /// Accessible only for notifications.
    AccessibleForNotify,
    /// Write-only (deprecated but seen in wild).
    WriteOnly,
}

impl Access {
    /// Get a string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "read-only",
            Self::ReadWrite => "read-write",
            Self::ReadCreate => "read-create",
            Self::NotAccessible => "not-accessible",
            Self::AccessibleForNotify => "accessible-for-notify",
            Self::WriteOnly => "write-only",
        }
    }

    /// Parse an SMI access keyword.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read-only" => Some(Self::ReadOnly),
            "read-write" => Some(Self::ReadWrite),
            "read-create" => Some(Self::ReadCreate),
            "not-accessible" => Some(Self::NotAccessible),
            "accessible-for-notify" => Some(Self::AccessibleForNotify),
            "write-only" => Some(Self::WriteOnly),
            _ => None,
        }
    }

    /// Check if the object is accessible for GET operations.
    #[must_use]
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite | Self::ReadCreate)
    }

    /// Check if the object accepts SET operations.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::ReadWrite | Self::ReadCreate | Self::WriteOnly)
    }
}

/// A range bound value that can be signed or unsigned.
///
/// Always normalized: values representable as `i64` are `Signed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RangeBound {
    /// Signed value.
    Signed(i64),
    /// Unsigned value above `i64::MAX` (Counter64 ranges).
    Unsigned(u64),
}

impl RangeBound {
    /// Build a normalized bound, saturating outside the `i64::MIN..=u64::MAX` window.
    #[must_use]
    pub fn from_i128(v: i128) -> Self {
        if let Ok(s) = i64::try_from(v) {
            Self::Signed(s)
        } else if v > 0 {
            Self::Unsigned(u64::try_from(v).unwrap_or(u64::MAX))
        } else {
            Self::Signed(i64::MIN)
        }
    }

    /// Get the value as i128 for comparison purposes.
    #[must_use]
    pub fn as_i128(self) -> i128 {
        match self {
            Self::Signed(v) => i128::from(v),
            Self::Unsigned(v) => i128::from(v),
        }
    }
}

impl From<i64> for RangeBound {
    fn from(v: i64) -> Self {
        Self::Signed(v)
    }
}

impl PartialOrd for RangeBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RangeBound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_i128().cmp(&other.as_i128())
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
        }
    }
}

/// One `min..max` pair inside a size union.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeRange {
    /// Lower bound in octets.
    pub min: u32,
    /// Upper bound in octets.
    pub max: u32,
}

/// Effective size constraint of an octet-string type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum SizeSpec {
    /// Exact set of allowed lengths, sorted and deduplicated.
    Set {
        /// Allowed lengths.
        allowed: Vec<u32>,
    },
    /// Contiguous length range.
    Range {
        /// Minimum length.
        min: u32,
        /// Maximum length.
        max: u32,
    },
    /// Ranges that could not be intersected.
    Union {
        /// The ranges as encountered.
        ranges: Vec<SizeRange>,
    },
}

impl SizeSpec {
    /// Check whether a length in octets satisfies this size.
    ///
    /// A union is checked against any of its ranges.
    #[must_use]
    pub fn admits(&self, len: usize) -> bool {
        let Ok(len) = u32::try_from(len) else {
            return false;
        };
        match self {
            Self::Set { allowed } => allowed.contains(&len),
            Self::Range { min, max } => (*min..=*max).contains(&len),
            Self::Union { ranges } => ranges.iter().any(|r| (r.min..=r.max).contains(&len)),
        }
    }

    /// Smallest length this size admits.
    #[must_use]
    pub fn min_len(&self) -> u32 {
        match self {
            Self::Set { allowed } => allowed.iter().copied().min().unwrap_or(0),
            Self::Range { min, .. } => *min,
            Self::Union { ranges } => ranges.iter().map(|r| r.min).min().unwrap_or(0),
        }
    }
}

/// A structured subtype constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum ConstraintSpec {
    /// Inclusive numeric value range.
    #[cfg_attr(feature = "serde", serde(rename = "ValueRangeConstraint"))]
    ValueRange {
        /// Lower bound.
        min: RangeBound,
        /// Upper bound.
        max: RangeBound,
    },
    /// Inclusive length range in octets.
    #[cfg_attr(feature = "serde", serde(rename = "ValueSizeConstraint"))]
    ValueSize {
        /// Minimum length.
        min: u32,
        /// Maximum length.
        max: u32,
    },
    /// Enumerated legal values, or just their count once enum labels carry them.
    #[cfg_attr(feature = "serde", serde(rename = "SingleValueConstraint"))]
    SingleValue {
        /// Legal values.
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        values: Option<Vec<i64>>,
        /// Number of legal values (compact form).
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        count: Option<usize>,
    },
}

impl ConstraintSpec {
    /// Create a signed value range constraint.
    #[must_use]
    pub fn range(min: i64, max: i64) -> Self {
        Self::ValueRange {
            min: RangeBound::Signed(min),
            max: RangeBound::Signed(max),
        }
    }

    /// Create a value range constraint from wide bounds.
    #[must_use]
    pub fn range_wide(min: i128, max: i128) -> Self {
        Self::ValueRange {
            min: RangeBound::from_i128(min),
            max: RangeBound::from_i128(max),
        }
    }

    /// Create a size constraint.
    #[must_use]
    pub fn size(min: u32, max: u32) -> Self {
        Self::ValueSize { min, max }
    }

    /// Create a single-value constraint listing its values.
    #[must_use]
    pub fn single(values: Vec<i64>) -> Self {
        Self::SingleValue {
            values: Some(values),
            count: None,
        }
    }

    /// The `(min, max)` pair of a value range, as i128.
    #[must_use]
    pub fn value_range(&self) -> Option<(i128, i128)> {
        match self {
            Self::ValueRange { min, max } => Some((min.as_i128(), max.as_i128())),
            _ => None,
        }
    }

    /// Listed legal values of a single-value constraint.
    #[must_use]
    pub fn single_values(&self) -> Option<&[i64]> {
        match self {
            Self::SingleValue {
                values: Some(values),
                ..
            } => Some(values.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueRange { min, max } => write!(f, "ValueRangeConstraint({min}, {max})"),
            Self::ValueSize { min, max } => write!(f, "ValueSizeConstraint({min}, {max})"),
            Self::SingleValue { values: Some(values), .. } => {
                f.write_str("SingleValueConstraint(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Self::SingleValue { count, .. } => {
                write!(f, "SingleValueConstraint(#{})", count.unwrap_or(0))
            }
        }
    }
}

/// A named enumeration value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumMember {
    /// Numeric value.
    pub value: i64,
    /// Label.
    pub name: String,
}

impl EnumMember {
    /// Create a new enumeration member.
    #[must_use]
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            value,
            name: name.into(),
        }
    }
}

/// Canonical registry entry for one syntax class name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeEntry {
    /// Immediate underlying primitive; `None` when this entry is a primitive.
    pub base_type: Option<String>,
    /// DISPLAY-HINT text.
    pub display_hint: Option<String>,
    /// Effective size.
    pub size: Option<SizeSpec>,
    /// Canonical constraints.
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<ConstraintSpec>,
    /// Raw constraint text, kept only while it matches `constraints`.
    pub constraints_repr: Option<String>,
    /// Enumeration labels sorted by value.
    pub enums: Option<Vec<EnumMember>>,
    /// `module::symbol` provenance.
    #[cfg_attr(feature = "serde", serde(default))]
    pub used_by: Vec<String>,
}

impl TypeEntry {
    /// Look up the value of an enumeration label.
    #[must_use]
    pub fn enum_value(&self, label: &str) -> Option<i64> {
        self.enums
            .as_ref()?
            .iter()
            .find(|m| m.name == label)
            .map(|m| m.value)
    }

    /// Legal values listed by a single-value constraint, if any.
    #[must_use]
    pub fn single_values(&self) -> Option<&[i64]> {
        self.constraints
            .iter()
            .find_map(ConstraintSpec::single_values)
            .filter(|v| !v.is_empty())
    }

    /// Shape metadata without provenance or diagnostic text.
    #[must_use]
    pub fn summary(&self) -> TypeSummary {
        TypeSummary {
            base_type: self.base_type.clone(),
            display_hint: self.display_hint.clone(),
            size: self.size.clone(),
            constraints: self.constraints.clone(),
            enums: self.enums.clone(),
        }
    }
}

/// TypeEntry-shaped summary embedded in behavior entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeSummary {
    /// Immediate underlying primitive.
    pub base_type: Option<String>,
    /// DISPLAY-HINT text.
    pub display_hint: Option<String>,
    /// Effective size.
    pub size: Option<SizeSpec>,
    /// Canonical constraints.
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<ConstraintSpec>,
    /// Enumeration labels.
    pub enums: Option<Vec<EnumMember>>,
}
