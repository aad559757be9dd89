//! Behavior store: per-module JSON files of behavior entries.
//!
//! Each module persists to `<dir>/<MODULE>_behaviour.json`, a JSON object
//! keyed by symbol name. Writes update `current` only and rewrite the whole
//! module file. If that write fails the in-memory entry keeps the new value
//! for the rest of the process and the error is returned to the caller.

use crate::dynamic::LiveValues;
use crate::error::{read_json, write_json, Error, Result};
use mibsim_core::model::{BehaviorEntry, Oid, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Entries of one module by symbol name.
pub type ModuleEntries = BTreeMap<String, BehaviorEntry>;

/// Read a behavior file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn read_behavior_file(path: &Path) -> Result<ModuleEntries> {
    read_json(path)
}

/// Write a behavior file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_behavior_file(path: &Path, entries: &ModuleEntries) -> Result<()> {
    write_json(path, entries)
}

/// In-memory behavior entries with file persistence and live values.
#[derive(Debug)]
pub struct BehaviorStore {
    dir: PathBuf,
    modules: BTreeMap<String, ModuleEntries>,
    by_oid: BTreeMap<Oid, (String, String)>,
    live: LiveValues,
}

impl BehaviorStore {
    /// Create an empty store persisting under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            modules: BTreeMap::new(),
            by_oid: BTreeMap::new(),
            live: LiveValues::new(),
        }
    }

    /// Behavior file path of a module.
    #[must_use]
    pub fn module_path(&self, module: &str) -> PathBuf {
        self.dir.join(format!("{module}_behaviour.json"))
    }

    /// Check if a module has a behavior file on disk.
    #[must_use]
    pub fn has_file(&self, module: &str) -> bool {
        self.module_path(module).is_file()
    }

    /// Load a module from its behavior file, replacing any entries in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load_module(&mut self, module: &str) -> Result<()> {
        let entries = read_behavior_file(&self.module_path(module))?;
        self.insert_module(module, entries);
        Ok(())
    }

    /// Add or replace a module's entries without touching disk.
    pub fn insert_module(&mut self, module: &str, entries: ModuleEntries) {
        self.by_oid.retain(|_, (m, _)| m != module);
        for (symbol, entry) in &entries {
            self.by_oid
                .insert(entry.oid.clone(), (module.to_owned(), symbol.clone()));
        }
        self.modules.insert(module.to_owned(), entries);
    }

    /// Persist a module to its behavior file.
    ///
    /// # Errors
    ///
    /// Returns an error if the module is unknown or the file cannot be written.
    pub fn save_module(&self, module: &str) -> Result<()> {
        let entries = self
            .modules
            .get(module)
            .ok_or_else(|| Error::UnknownModule(module.to_owned()))?;
        write_behavior_file(&self.module_path(module), entries)
    }

    /// Module names in order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Entries of one module.
    #[must_use]
    pub fn entries(&self, module: &str) -> Option<&ModuleEntries> {
        self.modules.get(module)
    }

    /// Find an entry by OID.
    ///
    /// A scalar instance OID (`oid.0`) finds its scalar.
    #[must_use]
    pub fn get(&self, oid: &Oid) -> Option<&BehaviorEntry> {
        let (module, symbol) = self.locate(oid)?;
        self.modules.get(module)?.get(symbol)
    }

    /// Set an entry's current value and persist its module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOid`] if no entry matches, or an IO error if
    /// the module file cannot be written. In the latter case the new value
    /// is still held in memory.
    pub fn set_current(&mut self, oid: &Oid, value: Value) -> Result<()> {
        let module = self.update(oid, |entry| entry.set_current(value))?;
        self.persist(&module)
    }

    /// Clear an entry's current value and persist its module.
    ///
    /// # Errors
    ///
    /// Same as [`BehaviorStore::set_current`].
    pub fn reset(&mut self, oid: &Oid) -> Result<()> {
        let module = self.update(oid, BehaviorEntry::reset)?;
        self.persist(&module)
    }

    /// The value to serve for an OID.
    ///
    /// Dynamic entries are evaluated now. Others return `current`, falling
    /// back to `initial`.
    #[must_use]
    pub fn read(&self, oid: &Oid) -> Option<Value> {
        let entry = self.get(oid)?;
        match entry.dynamic_function {
            Some(function) => Some(self.live.evaluate(function)),
            None => entry.stored_value().cloned(),
        }
    }

    /// Live value state shared with the serving engine.
    #[must_use]
    pub fn live(&self) -> &LiveValues {
        &self.live
    }

    fn locate(&self, oid: &Oid) -> Option<(&String, &String)> {
        let key = if self.by_oid.contains_key(oid) {
            oid.clone()
        } else {
            oid.strip_instance_suffix()?
        };
        self.by_oid.get(&key).map(|(m, s)| (m, s))
    }

    fn update(&mut self, oid: &Oid, apply: impl FnOnce(&mut BehaviorEntry)) -> Result<String> {
        let unknown = || Error::UnknownOid(oid.to_dotted());
        let (module, symbol) = self
            .locate(oid)
            .map(|(m, s)| (m.clone(), s.clone()))
            .ok_or_else(unknown)?;
        let entry = self
            .modules
            .get_mut(&module)
            .and_then(|entries| entries.get_mut(&symbol))
            .ok_or_else(unknown)?;
        apply(entry);
        Ok(module)
    }

    fn persist(&self, module: &str) -> Result<()> {
        self.save_module(module).map_err(|error| {
            tracing::warn!(module, %error, "behavior file not written; change kept in memory only");
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mibsim_core::model::{Access, DynamicFunction};
    use tempfile::TempDir;

    fn entries() -> ModuleEntries {
        let name = BehaviorEntry::new(
            Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 5]),
            "DisplayString",
            Access::ReadWrite,
            Some(Value::text("mibsim-agent")),
        );
        let mut uptime = BehaviorEntry::new(
            Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 3]),
            "TimeTicks",
            Access::ReadOnly,
            Some(Value::Integer(0)),
        );
        uptime.dynamic_function = Some(DynamicFunction::Uptime);
        [("sysName".to_owned(), name), ("sysUpTime".to_owned(), uptime)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_get_strips_scalar_instance() {
        let mut store = BehaviorStore::new("unused");
        store.insert_module("SNMPv2-MIB", entries());

        let oid = Oid::from_dotted("1.3.6.1.2.1.1.5.0").unwrap();
        assert_eq!(store.get(&oid).unwrap().type_name, "DisplayString");
        assert!(store.get(&Oid::from_dotted("1.3.6.1.2.1.1.5.1").unwrap()).is_none());
    }

    #[test]
    fn test_set_current_persists_and_reset_restores() {
        let dir = TempDir::new().unwrap();
        let oid = Oid::from_dotted("1.3.6.1.2.1.1.5.0").unwrap();

        let mut store = BehaviorStore::new(dir.path());
        store.insert_module("SNMPv2-MIB", entries());
        store.set_current(&oid, Value::text("renamed")).unwrap();

        let mut reloaded = BehaviorStore::new(dir.path());
        reloaded.load_module("SNMPv2-MIB").unwrap();
        let entry = reloaded.get(&oid).unwrap();
        assert_eq!(entry.current, Some(Value::text("renamed")));
        assert_eq!(entry.initial, Some(Value::text("mibsim-agent")));

        reloaded.reset(&oid).unwrap();
        assert_eq!(reloaded.read(&oid), Some(Value::text("mibsim-agent")));
    }

    #[test]
    fn test_unknown_oid() {
        let mut store = BehaviorStore::new("unused");
        store.insert_module("SNMPv2-MIB", entries());
        let oid = Oid::from_dotted("1.3.6.1.4.1.0").unwrap();
        assert!(matches!(
            store.set_current(&oid, Value::Integer(1)),
            Err(Error::UnknownOid(_))
        ));
    }

    #[test]
    fn test_unwritable_store_keeps_value_in_memory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();
        let oid = Oid::from_dotted("1.3.6.1.2.1.1.5.0").unwrap();

        let mut store = BehaviorStore::new(&blocker);
        store.insert_module("SNMPv2-MIB", entries());
        assert!(store.set_current(&oid, Value::text("volatile")).is_err());
        assert_eq!(store.read(&oid), Some(Value::text("volatile")));
    }

    #[test]
    fn test_dynamic_read_ignores_stored_value() {
        let mut store = BehaviorStore::new("unused");
        store.insert_module("SNMPv2-MIB", entries());
        let oid = Oid::from_dotted("1.3.6.1.2.1.1.3.0").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let Some(Value::Integer(ticks)) = store.read(&oid) else {
            panic!("uptime should be numeric");
        };
        assert!(ticks >= 1);
    }
}
