//! Generator configuration.

use crate::error::{read_json, Result};
use mibsim_core::model::DynamicFunction;
use mibsim_core::PipelineOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Paths and module selection for a generator run.
///
/// Every field is optional in the JSON form and falls back to
/// [`Config::default`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of compiled `<MODULE>.json` files.
    pub compiled_dir: PathBuf,
    /// Directory of `<MODULE>_behaviour.json` files.
    pub behavior_dir: PathBuf,
    /// Type registry export path.
    pub types_path: PathBuf,
    /// Pipeline cache path; no caching when unset.
    pub cache_path: Option<PathBuf>,
    /// Modules to load, in order.
    pub modules: Vec<String>,
    /// Dynamic function overrides by symbol name.
    pub dynamic: BTreeMap<String, DynamicFunction>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compiled_dir: PathBuf::from("compiled-mibs"),
            behavior_dir: PathBuf::from("mock-behaviour"),
            types_path: PathBuf::from("data/types.json"),
            cache_path: None,
            modules: Vec::new(),
            dynamic: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Pipeline options derived from this config.
    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            dynamic: self.dynamic.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mibsim.json");
        std::fs::write(
            &path,
            r#"{"modules":["IF-MIB"],"dynamic":{"ifInOctets":"counter"}}"#,
        )
        .unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.modules, ["IF-MIB"]);
        assert_eq!(config.behavior_dir, PathBuf::from("mock-behaviour"));
        assert_eq!(
            config.pipeline_options().dynamic.get("ifInOctets"),
            Some(&DynamicFunction::Counter)
        );
    }

    #[test]
    fn test_unknown_dynamic_function_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mibsim.json");
        std::fs::write(&path, r#"{"dynamic":{"sysUpTime":"clock"}}"#).unwrap();
        assert!(Config::from_json_file(&path).is_err());
    }
}
