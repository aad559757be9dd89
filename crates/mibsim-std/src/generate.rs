//! Generator: load → pipeline → persist → register.
//!
//! The type registry is exported on every run. Behavior files are written
//! only for modules that do not have one yet; an existing file is loaded
//! as-is so values written in earlier runs survive a restart.

use crate::cache::{compute_fingerprint, is_cache_valid, load_cache_verified, save_cache};
use crate::config::Config;
use crate::error::{write_json, Error, Result};
use crate::loader::DirSymbolLoader;
use crate::store::BehaviorStore;
use mibsim_core::engine::{register_all, EngineFailure, ProtocolEngine};
use mibsim_core::symbol::{LoadFailure, SymbolTree};
use mibsim_core::{Pipeline, PipelineOutput, Tracer};
use std::path::Path;

/// Everything a generator run produced.
#[derive(Debug)]
pub struct Generated {
    /// Registry and object trees.
    pub output: PipelineOutput,
    /// Behavior store holding every built module.
    pub store: BehaviorStore,
    /// Modules that could not be loaded.
    pub load_failures: Vec<LoadFailure>,
    /// Modules whose behavior file was written by this run.
    pub written: Vec<String>,
    /// Modules whose existing behavior file was kept.
    pub reused: Vec<String>,
    /// Whether the pipeline output came from the cache.
    pub from_cache: bool,
}

impl Generated {
    /// Hand every module to a protocol engine.
    ///
    /// Returns the modules the engine refused; the others stay registered.
    pub fn register<E: ProtocolEngine>(&self, engine: &mut E) -> Vec<EngineFailure<E::Error>> {
        let failures = register_all(engine, self.output.modules.values());
        for failure in &failures {
            tracing::warn!(module = %failure.module, "engine refused module");
        }
        failures
    }
}

/// Drives one generator run from a [`Config`].
#[derive(Clone, Debug)]
pub struct Generator {
    config: Config,
}

impl Generator {
    /// Create a generator.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the generator.
    ///
    /// Module load failures are reported in [`Generated::load_failures`]
    /// and do not stop the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the type registry or a behavior file cannot be
    /// written, or an existing behavior file cannot be read.
    pub fn run<T: Tracer>(&self, tracer: &mut T) -> Result<Generated> {
        let config = &self.config;
        let mut loader = DirSymbolLoader::new(&config.compiled_dir);
        let tree = SymbolTree::load(&mut loader, &config.modules, tracer);

        let (output, from_cache) = self.pipeline_output(&loader, &tree, tracer)?;

        write_json(&config.types_path, &output.registry)?;
        tracing::info!(
            path = %config.types_path.display(),
            types = output.registry.len(),
            "type registry exported"
        );

        let mut store = BehaviorStore::new(&config.behavior_dir);
        let mut written = Vec::new();
        let mut reused = Vec::new();
        for (module, build) in &output.modules {
            if store.has_file(module) {
                store.load_module(module)?;
                reused.push(module.clone());
            } else {
                store.insert_module(module, build.entries.clone());
                store.save_module(module)?;
                written.push(module.clone());
            }
        }
        tracing::info!(
            written = written.len(),
            reused = reused.len(),
            "behavior files ready"
        );

        Ok(Generated {
            output,
            store,
            load_failures: tree.failures().to_vec(),
            written,
            reused,
            from_cache,
        })
    }

    fn pipeline_output<T: Tracer>(
        &self,
        loader: &DirSymbolLoader,
        tree: &SymbolTree,
        tracer: &mut T,
    ) -> Result<(PipelineOutput, bool)> {
        let pipeline = Pipeline::new(self.config.pipeline_options());
        let Some(cache_path) = &self.config.cache_path else {
            return Ok((pipeline.run(tree, tracer), false));
        };

        let fingerprint = self.fingerprint(loader)?;
        if is_cache_valid(cache_path, &fingerprint) {
            match load_cache_verified(cache_path, &fingerprint) {
                Ok(output) => {
                    tracing::info!(path = %cache_path.display(), "pipeline output loaded from cache");
                    return Ok((output, true));
                }
                Err(error) => {
                    tracing::warn!(path = %cache_path.display(), %error, "cache unusable, rebuilding");
                }
            }
        }

        let output = pipeline.run(tree, tracer);
        save_cache(&output, cache_path, Some(fingerprint)).map_err(Error::from)?;
        Ok((output, false))
    }

    /// Fingerprint of everything the pipeline output depends on.
    fn fingerprint(&self, loader: &DirSymbolLoader) -> Result<[u8; 32]> {
        let files = loader.compiled_files()?;
        let settings = serde_json::to_vec(&(&self.config.modules, &self.config.dynamic))
            .map_err(|e| Error::json(Path::new("<config>"), e))?;

        let mut inputs: Vec<(&str, &[u8])> = files
            .iter()
            .map(|(name, contents)| (name.as_str(), contents.as_slice()))
            .collect();
        // Not a valid file name, so it cannot collide with a compiled file.
        inputs.push(("\0settings", &settings));
        Ok(compute_fingerprint(&inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mibsim_core::NoopTracer;
    use tempfile::TempDir;

    fn config(root: &Path) -> Config {
        std::fs::create_dir_all(root.join("compiled")).unwrap();
        std::fs::write(
            root.join("compiled/SNMPv2-MIB.json"),
            r#"{
                "module": "SNMPv2-MIB",
                "imports": ["SNMPv2-SMI", "SNMPv2-TC"],
                "symbols": {
                    "sysName": {
                        "kind": "scalar",
                        "oid": [1, 3, 6, 1, 2, 1, 1, 5],
                        "syntax": {"type_name": "DisplayString", "parent": "OctetString"},
                        "access": "read-write"
                    }
                }
            }"#,
        )
        .unwrap();
        Config {
            compiled_dir: root.join("compiled"),
            behavior_dir: root.join("behaviour"),
            types_path: root.join("data/types.json"),
            cache_path: Some(root.join("cache/pipeline.msim")),
            modules: vec!["SNMPv2-MIB".into()],
            ..Config::default()
        }
    }

    #[test]
    fn test_second_run_uses_cache_and_existing_files() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::new(config(dir.path()));

        let first = generator.run(&mut NoopTracer).unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.written, ["SNMPv2-MIB"]);

        let second = generator.run(&mut NoopTracer).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.reused, ["SNMPv2-MIB"]);
        assert_eq!(first.output, second.output);
    }

    #[test]
    fn test_settings_change_invalidates_cache() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path());
        Generator::new(config.clone()).run(&mut NoopTracer).unwrap();

        config
            .dynamic
            .insert("sysName".into(), mibsim_core::model::DynamicFunction::Counter);
        let rerun = Generator::new(config).run(&mut NoopTracer).unwrap();
        assert!(!rerun.from_cache);
    }
}
