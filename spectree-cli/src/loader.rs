//! Building and caching the specification tree
//!
//! A tree is built once per distinct (source, build options) pair and shared as an
//! `Arc` for the rest of the process.

use crate::config::SpectreeConfig;
use crate::error::{CliError, CliResult};
use crate::exit_codes::EXIT_ERROR;
use spectree::{builtin, BuildOptions, ConflictPolicy, RawCommand, SpecTree};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TreeKey {
    spec: Option<PathBuf>,
    conflicts: ConflictPolicy,
    help_projection: bool,
}

fn cache() -> &'static Mutex<HashMap<TreeKey, Arc<SpecTree>>> {
    static TREES: OnceLock<Mutex<HashMap<TreeKey, Arc<SpecTree>>>> = OnceLock::new();
    TREES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Read the raw specification named by the configuration.
pub fn load_raw(spec: Option<&Path>) -> CliResult<RawCommand> {
    match spec {
        Some(path) => Ok(RawCommand::load(path)?),
        None => Ok(builtin::exo()?),
    }
}

/// Build a tree without consulting the cache.
pub fn build_tree(spec: Option<&Path>, options: &BuildOptions) -> CliResult<SpecTree> {
    let raw = load_raw(spec)?;
    Ok(SpecTree::build_with(&raw, options)?)
}

/// The tree for `config`, built on first use.
pub fn load_tree(config: &SpectreeConfig) -> CliResult<Arc<SpecTree>> {
    let key = TreeKey {
        spec: config.spec.clone(),
        conflicts: config.conflicts,
        help_projection: config.help_projection,
    };

    let mut trees = cache()
        .lock()
        .map_err(|_| CliError::new("Specification cache is poisoned", EXIT_ERROR))?;
    if let Some(tree) = trees.get(&key) {
        return Ok(Arc::clone(tree));
    }

    let tree = Arc::new(build_tree(config.spec.as_deref(), &config.build_options())?);
    trees.insert(key, Arc::clone(&tree));
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_tree_is_cached() {
        let config = SpectreeConfig::default();
        let first = load_tree(&config).unwrap();
        let second = load_tree(&config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!first.conflicts().is_empty());
    }

    #[test]
    fn test_strict_bundled_tree_fails() {
        let config = SpectreeConfig {
            conflicts: ConflictPolicy::Strict,
            ..Default::default()
        };
        let err = load_tree(&config).unwrap_err();
        assert_eq!(err.exit_code, EXIT_ERROR);
        assert!(err.full_chain().contains("specification conflict"));
    }

    #[test]
    fn test_spec_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tool.yaml");
        std::fs::write(&path, "name: tool\nsubcommands:\n  - name: [run, r]\n").unwrap();

        let config = SpectreeConfig {
            spec: Some(path),
            ..Default::default()
        };
        let tree = load_tree(&config).unwrap();
        assert!(tree.find(&["r"]).is_some());
        assert!(tree.find(&["help", "run"]).is_some());
    }
}
