//! Canonical entries for the ASN.1 / SMI primitives.

use super::constraints::{canonicalize, extract};
use crate::model::{ConstraintSpec, Primitive, TypeEntry};
use alloc::vec;
use alloc::vec::Vec;

/// Constraint expression of a primitive's default instance.
#[must_use]
pub fn primitive_constraints(p: Primitive) -> Vec<ConstraintSpec> {
    match p {
        Primitive::Integer | Primitive::ObjectIdentifier | Primitive::Opaque => Vec::new(),
        Primitive::Integer32 => vec![ConstraintSpec::range(
            i64::from(i32::MIN),
            i64::from(i32::MAX),
        )],
        Primitive::Counter32 | Primitive::Gauge32 | Primitive::Unsigned32 | Primitive::TimeTicks => {
            vec![ConstraintSpec::range(0, i64::from(u32::MAX))]
        }
        Primitive::Counter64 => vec![ConstraintSpec::range_wide(0, i128::from(u64::MAX))],
        Primitive::IpAddress => vec![ConstraintSpec::size(4, 4)],
        Primitive::OctetString | Primitive::Bits => vec![ConstraintSpec::size(0, 65535)],
    }
}

/// Seed entry for a primitive. Diagnostic text is always dropped.
#[must_use]
pub fn seed_entry(p: Primitive) -> TypeEntry {
    let canon = canonicalize(extract(&primitive_constraints(p)), None, true);
    TypeEntry {
        base_type: None,
        display_hint: None,
        size: canon.size,
        constraints: canon.constraints,
        constraints_repr: None,
        enums: None,
        used_by: Vec::new(),
    }
}
