//! Constraint extraction and canonicalization.
//!
//! A raw constraint expression is a flat list of size ranges, value ranges
//! and single-value sets as the compiler saw them, inherited restatements
//! included. Extraction turns it into an effective [`SizeSpec`] plus a
//! deduplicated constraint list; the canonical passes then strip whatever
//! the rest of the entry already says.

use crate::model::{ConstraintSpec, EnumMember, SizeRange, SizeSpec};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Result of reading one constraint expression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Extracted {
    pub size: Option<SizeSpec>,
    pub constraints: Vec<ConstraintSpec>,
    pub repr: Option<String>,
}

/// Render a constraint expression as diagnostic text.
pub(crate) fn render_repr(raw: &[ConstraintSpec]) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let parts: Vec<String> = raw.iter().map(ToString::to_string).collect();
    Some(parts.join(" & "))
}

/// Read sizes, ranges and single values out of a raw expression.
///
/// Output order is sizes, then ranges, then single values, each in
/// expression order, with exact duplicates removed.
pub(crate) fn extract(raw: &[ConstraintSpec]) -> Extracted {
    let sizes = raw
        .iter()
        .filter(|c| matches!(c, ConstraintSpec::ValueSize { .. }));
    let ranges = raw
        .iter()
        .filter(|c| matches!(c, ConstraintSpec::ValueRange { .. }));
    let singles = raw
        .iter()
        .filter(|c| matches!(c, ConstraintSpec::SingleValue { .. }));

    let mut constraints: Vec<ConstraintSpec> = Vec::new();
    for c in sizes.chain(ranges).chain(singles) {
        if !constraints.contains(c) {
            constraints.push(c.clone());
        }
    }

    let size_ranges: Vec<SizeRange> = raw
        .iter()
        .filter_map(|c| match c {
            ConstraintSpec::ValueSize { min, max } => Some(SizeRange {
                min: *min,
                max: *max,
            }),
            _ => None,
        })
        .collect();

    let size = effective_size(&size_ranges);
    let repr = if constraints.is_empty() {
        None
    } else {
        render_repr(raw)
    };

    Extracted {
        size,
        constraints,
        repr,
    }
}

/// Exact lengths win; otherwise intersect every range.
fn effective_size(ranges: &[SizeRange]) -> Option<SizeSpec> {
    if ranges.is_empty() {
        return None;
    }

    let mut exact: Vec<u32> = ranges
        .iter()
        .filter(|r| r.min == r.max)
        .map(|r| r.min)
        .collect();
    if !exact.is_empty() {
        exact.sort_unstable();
        exact.dedup();
        return Some(SizeSpec::Set { allowed: exact });
    }

    let min = ranges.iter().map(|r| r.min).max().unwrap_or(0);
    let max = ranges.iter().map(|r| r.max).min().unwrap_or(0);
    if min <= max {
        Some(SizeSpec::Range { min, max })
    } else {
        Some(SizeSpec::Union {
            ranges: ranges.to_vec(),
        })
    }
}

/// Passes (a) and (b): compact single values under enums, then drop size
/// constraints that restate something other than the effective size.
///
/// The diagnostic text survives only when `drop_repr` is false and neither
/// pass changed anything.
pub(crate) fn canonicalize(
    extracted: Extracted,
    enums: Option<&[EnumMember]>,
    drop_repr: bool,
) -> Extracted {
    let Extracted {
        size,
        constraints: raw,
        repr,
    } = extracted;

    let constraints = compact_single_values(&raw, enums);
    let constraints = filter_by_size(size.as_ref(), constraints);

    let repr = if drop_repr || constraints != raw {
        None
    } else {
        repr
    };

    Extracted {
        size,
        constraints,
        repr,
    }
}

fn compact_single_values(
    constraints: &[ConstraintSpec],
    enums: Option<&[EnumMember]>,
) -> Vec<ConstraintSpec> {
    if enums.map_or(true, <[EnumMember]>::is_empty) {
        return constraints.to_vec();
    }
    constraints
        .iter()
        .map(|c| match c {
            ConstraintSpec::SingleValue { values, count } => ConstraintSpec::SingleValue {
                values: None,
                count: values.as_ref().map(Vec::len).or(*count),
            },
            other => other.clone(),
        })
        .collect()
}

fn filter_by_size(size: Option<&SizeSpec>, constraints: Vec<ConstraintSpec>) -> Vec<ConstraintSpec> {
    let keep = |min: u32, max: u32| -> bool {
        match size {
            Some(SizeSpec::Range { min: s_min, max: s_max }) => min == *s_min && max == *s_max,
            Some(SizeSpec::Set { allowed }) => min == max && allowed.contains(&min),
            Some(SizeSpec::Union { .. }) | None => true,
        }
    };
    constraints
        .into_iter()
        .filter(|c| match c {
            ConstraintSpec::ValueSize { min, max } => keep(*min, *max),
            _ => true,
        })
        .collect()
}

fn value_ranges(constraints: &[ConstraintSpec]) -> Vec<(i128, i128)> {
    constraints
        .iter()
        .filter_map(ConstraintSpec::value_range)
        .collect()
}

/// Pass (c): drop a range restated from the base when a tighter one exists.
pub(crate) fn drop_redundant_base_range(
    constraints: Vec<ConstraintSpec>,
    base: &[ConstraintSpec],
) -> Vec<ConstraintSpec> {
    let base_ranges = value_ranges(base);
    if base_ranges.is_empty() {
        return constraints;
    }
    let own = value_ranges(&constraints);
    constraints
        .into_iter()
        .filter(|c| {
            let Some(rng) = c.value_range() else {
                return true;
            };
            let tighter_exists = own
                .iter()
                .any(|other| *other != rng && other.0 >= rng.0 && other.1 <= rng.1);
            !(base_ranges.contains(&rng) && tighter_exists)
        })
        .collect()
}

/// Pass (d): drop every range that contains another distinct range.
///
/// The constraints intersect, so the contained range is the effective one.
pub(crate) fn drop_dominated_ranges(constraints: Vec<ConstraintSpec>) -> Vec<ConstraintSpec> {
    let ranges = value_ranges(&constraints);
    if ranges.len() < 2 {
        return constraints;
    }
    let dominated: Vec<(i128, i128)> = ranges
        .iter()
        .filter(|a| {
            ranges
                .iter()
                .any(|b| a != &b && a.0 <= b.0 && a.1 >= b.1)
        })
        .copied()
        .collect();
    if dominated.is_empty() {
        return constraints;
    }
    constraints
        .into_iter()
        .filter(|c| c.value_range().map_or(true, |r| !dominated.contains(&r)))
        .collect()
}

/// Pass (e): with enums or a single-value set, base ranges are noise.
pub(crate) fn drop_base_range_for_enums(
    constraints: Vec<ConstraintSpec>,
    enums: Option<&[EnumMember]>,
    base: &[ConstraintSpec],
) -> Vec<ConstraintSpec> {
    let has_enums = enums.is_some_and(|e| !e.is_empty());
    let has_single = constraints
        .iter()
        .any(|c| matches!(c, ConstraintSpec::SingleValue { .. }));
    if !has_enums && !has_single {
        return constraints;
    }
    let base_ranges = value_ranges(base);
    if base_ranges.is_empty() {
        return constraints;
    }
    constraints
        .into_iter()
        .filter(|c| c.value_range().map_or(true, |r| !base_ranges.contains(&r)))
        .collect()
}
