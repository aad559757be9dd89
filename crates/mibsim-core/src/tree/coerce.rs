//! Value coercion and instance identifier encoding.

use crate::model::{BaseKind, Oid, Primitive, TypeEntry, Value};
use crate::registry::primitive_constraints;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A value that cannot be assigned to a type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoerceError {
    /// Wrong representation for the base type.
    #[error("expected {expected} value, got {value:?}")]
    KindMismatch {
        /// Base representation.
        expected: BaseKind,
        /// Offending value.
        value: String,
    },
    /// Number is not one of the named values.
    #[error("{value} is not an enumerated value")]
    NotEnumerated {
        /// Offending value.
        value: i128,
    },
    /// Number is not in the single-value list.
    #[error("{value} is not an allowed value")]
    NotAllowed {
        /// Offending value.
        value: i128,
    },
    /// Number is outside every allowed range.
    #[error("{value} is out of range")]
    OutOfRange {
        /// Offending value.
        value: i128,
    },
    /// Length does not satisfy the size constraint.
    #[error("length {len} violates the size constraint")]
    BadSize {
        /// Length in octets.
        len: usize,
    },
    /// Not a dotted IPv4 address.
    #[error("invalid IPv4 address {0:?}")]
    InvalidAddress(String),
    /// Not a dotted object identifier.
    #[error("invalid object identifier {0:?}")]
    InvalidOid(String),
}

/// Check a value against a base representation and the type's shape.
///
/// Numeric text and enumeration labels are accepted for numeric types and
/// normalized to numbers. Size is only checked for types without a display
/// hint, since hinted types are written in their rendered form.
///
/// # Errors
///
/// Returns a [`CoerceError`] naming the first violated rule.
pub fn coerce(value: &Value, base: Primitive, entry: Option<&TypeEntry>) -> Result<Value, CoerceError> {
    match base.kind() {
        BaseKind::Integer | BaseKind::Unsigned => coerce_number(value, base, entry),
        BaseKind::Text => {
            let text = expect_text(value, BaseKind::Text)?;
            if let Some(entry) = entry.filter(|e| e.display_hint.is_none()) {
                if let Some(size) = &entry.size {
                    if !size.admits(text.len()) {
                        return Err(CoerceError::BadSize { len: text.len() });
                    }
                }
            }
            Ok(value.clone())
        }
        BaseKind::Address => {
            let text = expect_text(value, BaseKind::Address)?;
            parse_ipv4(text)?;
            Ok(value.clone())
        }
        BaseKind::ObjectIdentifier => {
            let text = expect_text(value, BaseKind::ObjectIdentifier)?;
            parse_oid(text)?;
            Ok(value.clone())
        }
    }
}

fn expect_text(value: &Value, expected: BaseKind) -> Result<&str, CoerceError> {
    value.as_text().ok_or_else(|| CoerceError::KindMismatch {
        expected,
        value: value.to_string(),
    })
}

fn coerce_number(value: &Value, base: Primitive, entry: Option<&TypeEntry>) -> Result<Value, CoerceError> {
    let n = match value {
        Value::Text(label) => entry
            .and_then(|e| e.enum_value(label))
            .map(i128::from)
            .or_else(|| label.trim().parse::<i128>().ok()),
        other => other.as_i128(),
    }
    .ok_or_else(|| CoerceError::KindMismatch {
        expected: base.kind(),
        value: value.to_string(),
    })?;

    if let Some((min, max)) = primitive_constraints(base)
        .iter()
        .find_map(|c| c.value_range())
    {
        if n < min || n > max {
            return Err(CoerceError::OutOfRange { value: n });
        }
    }

    if let Some(entry) = entry {
        if let Some(enums) = entry.enums.as_ref().filter(|e| !e.is_empty()) {
            if !enums.iter().any(|m| i128::from(m.value) == n) {
                return Err(CoerceError::NotEnumerated { value: n });
            }
        }
        if let Some(values) = entry.single_values() {
            if !values.iter().any(|v| i128::from(*v) == n) {
                return Err(CoerceError::NotAllowed { value: n });
            }
        }
        let ranges: Vec<(i128, i128)> = entry
            .constraints
            .iter()
            .filter_map(|c| c.value_range())
            .collect();
        if !ranges.is_empty() && !ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&n)) {
            return Err(CoerceError::OutOfRange { value: n });
        }
    }

    Ok(Value::from_i128(n))
}

fn parse_ipv4(text: &str) -> Result<[u8; 4], CoerceError> {
    let invalid = || CoerceError::InvalidAddress(text.into());
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in &mut octets {
        *octet = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(octets)
}

fn parse_oid(text: &str) -> Result<Oid, CoerceError> {
    Oid::from_dotted(text)
        .filter(|oid| !oid.is_empty())
        .ok_or_else(|| CoerceError::InvalidOid(text.into()))
}

/// Encode an index value as instance identifier arcs.
///
/// Integers are one arc, addresses four, text and object identifiers are
/// length-prefixed.
///
/// # Errors
///
/// Returns a [`CoerceError`] when the value cannot be represented.
pub fn encode_instance(value: &Value, base: Primitive) -> Result<Vec<u32>, CoerceError> {
    match base.kind() {
        BaseKind::Integer | BaseKind::Unsigned => {
            let n = value.as_i128().ok_or_else(|| CoerceError::KindMismatch {
                expected: base.kind(),
                value: value.to_string(),
            })?;
            let arc = u32::try_from(n).map_err(|_| CoerceError::OutOfRange { value: n })?;
            Ok(alloc::vec![arc])
        }
        BaseKind::Address => {
            let octets = parse_ipv4(expect_text(value, BaseKind::Address)?)?;
            Ok(octets.iter().map(|o| u32::from(*o)).collect())
        }
        BaseKind::Text => {
            let bytes = expect_text(value, BaseKind::Text)?.as_bytes();
            let mut arcs = Vec::with_capacity(bytes.len() + 1);
            arcs.push(length_arc(bytes.len())?);
            arcs.extend(bytes.iter().map(|b| u32::from(*b)));
            Ok(arcs)
        }
        BaseKind::ObjectIdentifier => {
            let oid = parse_oid(expect_text(value, BaseKind::ObjectIdentifier)?)?;
            let mut arcs = Vec::with_capacity(oid.len() + 1);
            arcs.push(length_arc(oid.len())?);
            arcs.extend_from_slice(oid.arcs());
            Ok(arcs)
        }
    }
}

fn length_arc(len: usize) -> Result<u32, CoerceError> {
    u32::try_from(len).map_err(|_| CoerceError::BadSize { len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintSpec, EnumMember, SizeSpec};
    use alloc::vec;

    #[test]
    fn test_numeric_text_and_labels() {
        let entry = TypeEntry {
            enums: Some(vec![EnumMember::new("up", 1), EnumMember::new("down", 2)]),
            ..TypeEntry::default()
        };
        assert_eq!(
            coerce(&Value::text("down"), Primitive::Integer32, Some(&entry)),
            Ok(Value::Integer(2))
        );
        assert_eq!(coerce(&Value::text(" 7 "), Primitive::Gauge32, None), Ok(Value::Integer(7)));
        assert_eq!(
            coerce(&Value::Integer(3), Primitive::Integer32, Some(&entry)),
            Err(CoerceError::NotEnumerated { value: 3 })
        );
    }

    #[test]
    fn test_numeric_ranges() {
        assert_eq!(
            coerce(&Value::Integer(-1), Primitive::Counter32, None),
            Err(CoerceError::OutOfRange { value: -1 })
        );
        assert_eq!(
            coerce(&Value::Unsigned(u64::MAX), Primitive::Counter64, None),
            Ok(Value::Unsigned(u64::MAX))
        );
        let entry = TypeEntry {
            constraints: vec![ConstraintSpec::range(1, 10)],
            ..TypeEntry::default()
        };
        assert!(coerce(&Value::Integer(0), Primitive::Integer32, Some(&entry)).is_err());
        assert!(coerce(&Value::Integer(10), Primitive::Integer32, Some(&entry)).is_ok());
        assert!(matches!(
            coerce(&Value::text("abc"), Primitive::Integer32, None),
            Err(CoerceError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_single_value_list() {
        let entry = TypeEntry {
            constraints: vec![ConstraintSpec::single(vec![1, 2, 4])],
            ..TypeEntry::default()
        };
        assert_eq!(
            coerce(&Value::Integer(0), Primitive::Integer32, Some(&entry)),
            Err(CoerceError::NotAllowed { value: 0 })
        );
        assert_eq!(
            coerce(&Value::text("4"), Primitive::Integer32, Some(&entry)),
            Ok(Value::Integer(4))
        );
    }

    #[test]
    fn test_text_size_only_without_hint() {
        let fixed = TypeEntry {
            size: Some(SizeSpec::Set { allowed: vec![6] }),
            ..TypeEntry::default()
        };
        assert_eq!(
            coerce(&Value::text(""), Primitive::OctetString, Some(&fixed)),
            Err(CoerceError::BadSize { len: 0 })
        );
        let hinted = TypeEntry {
            display_hint: Some("1x:".into()),
            ..fixed
        };
        assert!(coerce(&Value::text(""), Primitive::OctetString, Some(&hinted)).is_ok());
        assert!(coerce(&Value::Integer(1), Primitive::OctetString, None).is_err());
    }

    #[test]
    fn test_address_and_oid() {
        assert!(coerce(&Value::text("10.0.0.1"), Primitive::IpAddress, None).is_ok());
        assert!(coerce(&Value::text("10.0.0"), Primitive::IpAddress, None).is_err());
        assert!(coerce(&Value::text("10.0.0.256"), Primitive::IpAddress, None).is_err());
        assert!(coerce(&Value::text("1.3.6.1"), Primitive::ObjectIdentifier, None).is_ok());
        assert!(coerce(&Value::text(""), Primitive::ObjectIdentifier, None).is_err());
    }

    #[test]
    fn test_encode_instance() {
        assert_eq!(encode_instance(&Value::Integer(1), Primitive::Integer32), Ok(vec![1]));
        assert_eq!(
            encode_instance(&Value::text("127.0.0.1"), Primitive::IpAddress),
            Ok(vec![127, 0, 0, 1])
        );
        assert_eq!(
            encode_instance(&Value::text("ab"), Primitive::OctetString),
            Ok(vec![2, 97, 98])
        );
        assert_eq!(
            encode_instance(&Value::text("0.0"), Primitive::ObjectIdentifier),
            Ok(vec![2, 0, 0])
        );
        assert!(encode_instance(&Value::Integer(-1), Primitive::Integer32).is_err());
    }
}
