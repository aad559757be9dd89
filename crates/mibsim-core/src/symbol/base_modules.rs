//! SMI base modules.
//!
//! Imports from these modules never need a compiled file: their types reach
//! the pipeline through the `parent` facts the compiler embeds in every
//! syntax, and their OID roots are already folded into absolute OIDs.

/// SMI base modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseModule {
    /// SNMPv2-SMI (RFC 2578).
    SnmpV2Smi,
    /// SNMPv2-TC (RFC 2579).
    SnmpV2Tc,
    /// SNMPv2-CONF (RFC 2580).
    SnmpV2Conf,
    /// RFC1155-SMI.
    Rfc1155Smi,
    /// RFC1065-SMI.
    Rfc1065Smi,
    /// RFC-1212.
    Rfc1212,
    /// RFC-1215.
    Rfc1215,
    /// RFC1213-MIB (mib-2, `DisplayString`).
    Rfc1213Mib,
}

impl BaseModule {
    /// Get the canonical module name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SnmpV2Smi => "SNMPv2-SMI",
            Self::SnmpV2Tc => "SNMPv2-TC",
            Self::SnmpV2Conf => "SNMPv2-CONF",
            Self::Rfc1155Smi => "RFC1155-SMI",
            Self::Rfc1065Smi => "RFC1065-SMI",
            Self::Rfc1212 => "RFC-1212",
            Self::Rfc1215 => "RFC-1215",
            Self::Rfc1213Mib => "RFC1213-MIB",
        }
    }

    /// Look up a base module by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().find(|m| m.name() == name)
    }

    /// Iterate over all base modules.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::SnmpV2Smi,
            Self::SnmpV2Tc,
            Self::SnmpV2Conf,
            Self::Rfc1155Smi,
            Self::Rfc1065Smi,
            Self::Rfc1212,
            Self::Rfc1215,
            Self::Rfc1213Mib,
        ]
        .into_iter()
    }
}

/// Check if a module name is an SMI base module.
#[must_use]
pub fn is_base_module(name: &str) -> bool {
    BaseModule::from_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_module_names() {
        assert!(is_base_module("SNMPv2-SMI"));
        assert!(is_base_module("RFC1213-MIB"));
        assert!(!is_base_module("IF-MIB"));
        assert!(!is_base_module("snmpv2-smi"));
        for m in BaseModule::all() {
            assert_eq!(BaseModule::from_name(m.name()), Some(m));
        }
    }
}
