//! Directory-backed symbol loader.
//!
//! Compiled modules live as `<dir>/<MODULE>.json`. When a file is named
//! differently from the module it declares, the loader falls back to
//! scanning the directory for a matching declared name.

use crate::error::{Error, Result};
use mibsim_core::symbol::{is_base_module, LoadError, ModuleSymbols, SymbolLoader};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Only the declared name, for directory scans.
#[derive(Deserialize)]
struct DeclaredName {
    module: String,
}

/// Loads compiled modules from a directory of JSON files.
#[derive(Debug)]
pub struct DirSymbolLoader {
    dir: PathBuf,
    declared: Option<BTreeMap<String, PathBuf>>,
}

impl DirSymbolLoader {
    /// Create a loader over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            declared: None,
        }
    }

    /// The compiled module directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every compiled file as `(file name, contents)`, for fingerprinting.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be read.
    pub fn compiled_files(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();
        for path in self.json_files()? {
            let contents = fs::read(&path).map_err(|e| Error::io(&path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            files.push((name, contents));
        }
        Ok(files)
    }

    fn json_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Map declared module names to files, built on first use.
    fn declared(&mut self) -> &BTreeMap<String, PathBuf> {
        if self.declared.is_none() {
            let mut map = BTreeMap::new();
            // An unreadable directory leaves the map empty; the caller then
            // reports the module as not found.
            for path in self.json_files().unwrap_or_default() {
                let Ok(bytes) = fs::read(&path) else {
                    continue;
                };
                if let Ok(header) = serde_json::from_slice::<DeclaredName>(&bytes) {
                    map.entry(header.module).or_insert(path);
                }
            }
            self.declared = Some(map);
        }
        self.declared.get_or_insert_with(BTreeMap::new)
    }

    fn locate(&mut self, name: &str) -> Option<PathBuf> {
        let direct = self.dir.join(format!("{name}.json"));
        if direct.is_file() {
            return Some(direct);
        }
        self.declared().get(name).cloned()
    }
}

impl SymbolLoader for DirSymbolLoader {
    fn load_module(&mut self, name: &str) -> Result<ModuleSymbols, LoadError> {
        let path = self.locate(name).ok_or_else(|| LoadError::NotFound {
            module: name.into(),
        })?;
        let malformed = |message: String| LoadError::Malformed {
            module: name.into(),
            message,
        };
        let bytes = fs::read(&path).map_err(|e| malformed(e.to_string()))?;
        let module: ModuleSymbols =
            serde_json::from_slice(&bytes).map_err(|e| malformed(e.to_string()))?;

        let missing: Vec<String> = module
            .imports
            .iter()
            .filter(|import| !is_base_module(import))
            .filter(|import| self.locate(import).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingDependencies {
                module: module.module,
                missing,
            });
        }

        tracing::debug!(module = %module.module, path = %path.display(), "loaded compiled module");
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, json: &str) {
        fs::write(dir.join(file), json).unwrap();
    }

    #[test]
    fn test_load_by_file_name() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "IF-MIB.json",
            r#"{"module":"IF-MIB","imports":["SNMPv2-SMI"],"symbols":{}}"#,
        );

        let mut loader = DirSymbolLoader::new(dir.path());
        let module = loader.load_module("IF-MIB").unwrap();
        assert_eq!(module.module, "IF-MIB");
    }

    #[test]
    fn test_load_by_declared_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "if_mib_v2.json", r#"{"module":"IF-MIB"}"#);

        let mut loader = DirSymbolLoader::new(dir.path());
        assert!(loader.load_module("IF-MIB").is_ok());
        assert_eq!(
            loader.load_module("HOST-RESOURCES-MIB"),
            Err(LoadError::NotFound {
                module: "HOST-RESOURCES-MIB".into()
            })
        );
    }

    #[test]
    fn test_missing_dependencies_listed() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "VENDOR-MIB.json",
            r#"{"module":"VENDOR-MIB","imports":["SNMPv2-TC","IF-MIB","ENTITY-MIB"]}"#,
        );

        let mut loader = DirSymbolLoader::new(dir.path());
        let err = loader.load_module("VENDOR-MIB").unwrap_err();
        assert_eq!(err.missing_dependencies(), ["IF-MIB", "ENTITY-MIB"]);
    }

    #[test]
    fn test_malformed_module() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "BROKEN-MIB.json", r#"{"module":"BROKEN-MIB","symbols":[1]}"#);

        let mut loader = DirSymbolLoader::new(dir.path());
        assert!(matches!(
            loader.load_module("BROKEN-MIB"),
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_compiled_files_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "B-MIB.json", r#"{"module":"B-MIB"}"#);
        write(dir.path(), "A-MIB.json", r#"{"module":"A-MIB"}"#);
        write(dir.path(), "notes.txt", "ignored");

        let files = DirSymbolLoader::new(dir.path()).compiled_files().unwrap();
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["A-MIB.json", "B-MIB.json"]);
    }
}
