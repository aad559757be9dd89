//! Default value synthesis.
//!
//! Precedence, first match wins:
//!
//! 1. Well-known identity scalars by exact symbol name.
//! 2. The symbol's DEFVAL, with enumeration labels mapped to numbers.
//! 3. For enumerated types: `unknown` or `other`, else the first non-zero
//!    member, else the first member.
//! 4. A zero value for the base representation.

use crate::model::{BaseKind, DynamicFunction, Primitive, TypeEntry, Value};
use alloc::string::String;

/// Sentinel for date-shaped text objects.
pub const DATE_SENTINEL: &str = "2000-01-01,00:00:00.0";

/// Fixed values for identity scalars.
const IDENTITY_SCALARS: &[(&str, &str)] = &[
    ("sysDescr", "MIB Simulator Agent - Demo System"),
    ("sysObjectID", "1.3.6.1.4.1.99999"),
    ("sysContact", "Admin <admin@example.com>"),
    ("sysName", "mibsim-agent"),
    ("sysLocation", "Development Lab"),
];

/// A synthesized default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Synthesized {
    /// The initial value.
    pub value: Value,
    /// Live value strategy, for identity scalars that have one.
    pub dynamic: Option<DynamicFunction>,
    /// Set when the base type was not recognized and a zero was used.
    pub fallback: bool,
}

impl Synthesized {
    fn plain(value: Value) -> Self {
        Self {
            value,
            dynamic: None,
            fallback: false,
        }
    }
}

/// Synthesize a default value for one object.
///
/// `base` is the primitive the value must be assignable to; `None` means
/// the base type was not recognized.
#[must_use]
pub fn synthesize(
    symbol: &str,
    type_name: &str,
    entry: Option<&TypeEntry>,
    base: Option<Primitive>,
    declared: Option<&Value>,
) -> Synthesized {
    if symbol == "sysUpTime" {
        return Synthesized {
            value: Value::Integer(0),
            dynamic: Some(DynamicFunction::Uptime),
            fallback: false,
        };
    }
    if let Some((_, text)) = IDENTITY_SCALARS.iter().find(|(name, _)| *name == symbol) {
        return Synthesized::plain(Value::text(*text));
    }

    let Some(base) = base else {
        return Synthesized {
            value: Value::Integer(0),
            dynamic: None,
            fallback: true,
        };
    };
    let kind = base.kind();

    if let Some(value) = declared.and_then(|d| from_declared(d, kind, entry)) {
        return Synthesized::plain(value);
    }

    if kind.is_numeric() {
        if let Some(value) = enum_default(entry) {
            return Synthesized::plain(Value::Integer(value));
        }
    }

    Synthesized::plain(zero_value(kind, type_name, symbol, entry))
}

fn from_declared(declared: &Value, kind: BaseKind, entry: Option<&TypeEntry>) -> Option<Value> {
    match (declared, kind.is_numeric()) {
        (Value::Integer(_) | Value::Unsigned(_), true) | (Value::Text(_), false) => {
            Some(declared.clone())
        }
        (Value::Text(label), true) => entry
            .and_then(|e| e.enum_value(label))
            .map(Value::Integer)
            .or_else(|| label.trim().parse::<i64>().ok().map(Value::Integer)),
        (Value::Integer(_) | Value::Unsigned(_), false) => None,
    }
}

fn enum_default(entry: Option<&TypeEntry>) -> Option<i64> {
    let enums = entry?.enums.as_ref()?;
    enums
        .iter()
        .find(|m| m.name == "unknown" || m.name == "other")
        .or_else(|| enums.iter().find(|m| m.value != 0))
        .or_else(|| enums.first())
        .map(|m| m.value)
}

fn zero_value(kind: BaseKind, type_name: &str, symbol: &str, entry: Option<&TypeEntry>) -> Value {
    match kind {
        BaseKind::Integer | BaseKind::Unsigned => Value::from_i128(numeric_zero(entry)),
        BaseKind::Text if is_date_shaped(type_name, symbol) => Value::text(DATE_SENTINEL),
        BaseKind::Text => Value::Text(String::new()),
        BaseKind::Address => Value::text("0.0.0.0"),
        BaseKind::ObjectIdentifier => Value::text("0.0"),
    }
}

/// Zero, or the first legal value when zero is excluded.
///
/// A single-value list takes precedence over value ranges.
fn numeric_zero(entry: Option<&TypeEntry>) -> i128 {
    if let Some(values) = entry.and_then(TypeEntry::single_values) {
        if values.contains(&0) {
            return 0;
        }
        return values.first().map_or(0, |v| i128::from(*v));
    }
    let first_range = entry.and_then(|e| e.constraints.iter().find_map(|c| c.value_range()));
    match first_range {
        Some((min, max)) if !(min..=max).contains(&0) => min,
        _ => 0,
    }
}

fn is_date_shaped(type_name: &str, symbol: &str) -> bool {
    if type_name.contains("DateAndTime") {
        return true;
    }
    let lower = symbol.to_ascii_lowercase();
    lower.contains("date") || lower.contains("time")
}
