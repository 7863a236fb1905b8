//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/xampack/xampack.toml`
//! 3. Local config: `<project_dir>/.xampack.toml`
//! 4. Environment variables: `XAMPACK_*` prefix (`__` separates nesting)
//!
//! Environment values are kept as strings; list settings take a
//! comma-separated value, e.g. `XAMPACK_TOOL__EXECUTABLES=a.exe,b`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_path, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT, DEFAULT_VERSION};

/// Packaging tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    /// Explicit tool executable; skips discovery when set
    pub path: Option<PathBuf>,
    /// Directory searched recursively for the executable
    pub search_dir: PathBuf,
    /// Executable file names to look for
    #[serde(deserialize_with = "comma_list")]
    pub executables: Vec<String>,
    /// Maximum seconds to wait for the tool
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_dir: PathBuf::from("tools"),
            executables: vec![
                "xamarin-component.exe".into(),
                "xamarin-component".into(),
            ],
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ToolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Package version defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VersionConfig {
    /// Version for local builds
    pub fallback: String,
    /// Environment variables carrying the CI build version, first non-empty wins
    #[serde(deserialize_with = "comma_list")]
    pub ci_variables: Vec<String>,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_VERSION.into(),
            ci_variables: vec!["APPVEYOR_BUILD_VERSION".into()],
        }
    }
}

/// Unified configuration for xampack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Tool working directory (default: cwd)
    pub working_dir: Option<PathBuf>,
    /// Directory receiving package files, relative to the working directory
    pub output_dir: PathBuf,
    /// Packaging tool settings
    pub tool: ToolConfig,
    /// Version settings
    pub version: VersionConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_dir: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            tool: ToolConfig::default(),
            version: VersionConfig::default(),
        }
    }
}

/// Get the XDG config directory for xampack.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "xampack").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("xampack.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".xampack.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    ///
    /// Arrays in a higher layer replace the lower layer's arrays.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(
            global_config_path().as_deref(),
            project_dir.map(local_config_path).as_deref(),
        )
    }

    /// Load settings from explicit file locations (missing files are skipped).
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Self::defaults_builder()?;

        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("XAMPACK")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        settings.expand_paths();
        Ok(settings)
    }

    fn defaults_builder() -> Result<ConfigBuilder<DefaultState>, ApplicationError> {
        let defaults = Settings::default();
        Config::builder()
            .set_default(
                "output_dir",
                defaults.output_dir.to_string_lossy().to_string(),
            )
            .map_err(config_err)?
            .set_default(
                "tool.search_dir",
                defaults.tool.search_dir.to_string_lossy().to_string(),
            )
            .map_err(config_err)?
            .set_default("tool.executables", defaults.tool.executables.clone())
            .map_err(config_err)?
            .set_default("tool.timeout_secs", defaults.tool.timeout_secs as i64)
            .map_err(config_err)?
            .set_default("version.fallback", defaults.version.fallback.clone())
            .map_err(config_err)?
            .set_default("version.ci_variables", defaults.version.ci_variables.clone())
            .map_err(config_err)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.working_dir = self.working_dir.as_deref().map(expand_path);
        self.output_dir = expand_path(&self.output_dir);
        self.tool.path = self.tool.path.as_deref().map(expand_path);
        self.tool.search_dir = expand_path(&self.tool.search_dir);
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# xampack configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/xampack/xampack.toml
#   Local:  <project_dir>/.xampack.toml
#   Env:    XAMPACK_* environment variables, e.g. XAMPACK_TOOL__TIMEOUT_SECS=600

# Working directory of the packaging tool (default: current directory)
# working_dir = "."

# Directory receiving .xam files
# output_dir = "xpkg"

[tool]
# Explicit path to xamarin-component; skips discovery
# path = "tools/xamarin-component/xamarin-component.exe"

# Directory searched recursively for the executable
# search_dir = "tools"

# Executable names to look for (PATH is searched if none is found in search_dir)
# executables = ["xamarin-component.exe", "xamarin-component"]

# Seconds to wait before the tool is killed
# timeout_secs = 300

[version]
# Version used outside CI
# fallback = "0.1.0.0"

# Environment variables holding the CI build version
# ci_variables = ["APPVEYOR_BUILD_VERSION"]
"#
        .to_string()
    }
}

/// Accept a list either as an array or as one comma-separated string
/// (environment variables arrive as plain strings).
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum List {
        Items(Vec<String>),
        Joined(String),
    }

    Ok(match List::deserialize(deserializer)? {
        List::Items(items) => items,
        List::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
