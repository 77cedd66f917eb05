//! Layered configuration using Figment
//!
//! Sources are merged in precedence order, later sources overriding earlier ones:
//! 1. Default values
//! 2. `~/.spectree/spectree.{toml,yaml,yml,json}`
//! 3. `./.spectree/spectree.{toml,yaml,yml,json}`
//! 4. `SPECTREE_*` environment variables
//!
//! Command line flags are applied on top by the caller.

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use spectree::{BuildOptions, ConflictPolicy};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Name of the configuration directory in the home and working directories
pub const CONFIG_DIR_NAME: &str = ".spectree";

/// File stem of configuration files inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_STEM: &str = "spectree";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "SPECTREE_";

/// Errors raised while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be parsed or holds a value of the wrong type
    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
}

/// Result type alias using ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Effective settings of the completion backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectreeConfig {
    /// Specification file; the bundled exo specification when unset
    pub spec: Option<PathBuf>,
    /// How colliding aliases are handled when the tree is built
    pub conflicts: ConflictPolicy,
    /// Derive a `help` command mirroring the tree
    pub help_projection: bool,
    /// Strip descriptions from rendered candidates
    pub no_descriptions: bool,
}

impl Default for SpectreeConfig {
    fn default() -> Self {
        Self {
            spec: None,
            // The bundled data declares colliding sibling aliases
            conflicts: ConflictPolicy::FirstWins,
            help_projection: true,
            no_descriptions: false,
        }
    }
}

impl SpectreeConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::default()
            .with_conflict_policy(self.conflicts)
            .with_help_projection(self.help_projection)
    }
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    const EXTENSIONS: [(&'static str, ConfigFormat); 4] = [
        ("toml", ConfigFormat::Toml),
        ("yaml", ConfigFormat::Yaml),
        ("yml", ConfigFormat::Yaml),
        ("json", ConfigFormat::Json),
    ];
}

/// Configuration provider using figment
///
/// No caching is performed; configuration is read fresh for every invocation.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    global_dir: Option<PathBuf>,
    project_dir: Option<PathBuf>,
}

impl ConfigProvider {
    /// Provider searching `~/.spectree/` and `./.spectree/`
    pub fn new() -> Self {
        Self {
            global_dir: dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME)),
            project_dir: std::env::current_dir()
                .ok()
                .map(|cwd| cwd.join(CONFIG_DIR_NAME)),
        }
    }

    /// Provider searching explicit directories
    pub fn with_dirs(global_dir: Option<PathBuf>, project_dir: Option<PathBuf>) -> Self {
        Self {
            global_dir,
            project_dir,
        }
    }

    /// Load the effective configuration from every source
    pub fn load(&self) -> ConfigResult<SpectreeConfig> {
        let config: SpectreeConfig = self.build_figment().extract().map_err(Box::new)?;
        debug!("Loaded configuration from {} files", self.discover().len());
        Ok(config)
    }

    fn build_figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(SpectreeConfig::default()));

        for (path, format) in self.discover() {
            trace!("Loading config file: {} ({:?})", path.display(), format);
            figment = match format {
                ConfigFormat::Toml => figment.merge(Toml::file(path)),
                ConfigFormat::Yaml => figment.merge(Yaml::file(path)),
                ConfigFormat::Json => figment.merge(Json::file(path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Existing configuration files, lowest precedence first
    fn discover(&self) -> Vec<(PathBuf, ConfigFormat)> {
        [self.global_dir.as_deref(), self.project_dir.as_deref()]
            .into_iter()
            .flatten()
            .flat_map(Self::files_in)
            .collect()
    }

    fn files_in(dir: &Path) -> Vec<(PathBuf, ConfigFormat)> {
        ConfigFormat::EXTENSIONS
            .iter()
            .map(|(ext, format)| (dir.join(format!("{CONFIG_FILE_STEM}.{ext}")), *format))
            .filter(|(path, _)| path.is_file())
            .collect()
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}
