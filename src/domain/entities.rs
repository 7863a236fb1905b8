//! Domain entities: core data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::error::{DomainError, DomainResult};

/// Extension of the files produced by the packaging tool.
pub const PACKAGE_EXTENSION: &str = "xam";

/// Version used for local builds outside CI.
pub const DEFAULT_VERSION: &str = "0.1.0.0";

/// Directory receiving produced packages, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "xpkg";

/// Maximum wait for a single tool invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Tool operation. The `Display` form is the verb the tool expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Build a package (`create`).
    Create,
    /// Check an existing package (`validate`).
    Validate,
}

impl Operation {
    /// Name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create => "pack",
            Operation::Validate => "validate",
        }
    }

    /// Verb passed as the first token to the tool.
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Validate => "validate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Library shipped for one target platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// Platform identifier, e.g. "ios", "android", "mobile"
    pub platform: String,
    /// Path to the library assembly
    pub path: PathBuf,
}

impl Library {
    pub fn new(platform: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            platform: platform.into(),
            path: path.into(),
        }
    }
}

/// Sample project shipped with the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Display name of the sample
    pub name: String,
    /// Path to the sample's solution file
    pub solution: PathBuf,
}

impl Sample {
    pub fn new(name: impl Into<String>, solution: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            solution: solution.into(),
        }
    }
}

/// Everything needed for one invocation of the packaging tool.
///
/// Built fresh per operation from defaults plus caller overrides. Holders get
/// their own copy; overrides consume a record and return a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageParameters {
    /// Packaging tool executable
    pub tool_path: PathBuf,
    /// Working directory of the tool process
    pub working_dir: PathBuf,
    /// Maximum wait for the tool to exit
    pub timeout: Duration,
    /// Package identifier; required when the tool runs
    pub package_name: Option<String>,
    /// Package version
    pub version: String,
    /// Directory holding the package file
    pub output_path: PathBuf,
    pub project_name: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub website: Option<String>,
    pub details: Option<String>,
    pub license: Option<String>,
    pub getting_started: Option<String>,
    pub icons: Vec<PathBuf>,
    pub libraries: Vec<Library>,
    pub samples: Vec<Sample>,
}

impl Default for PackageParameters {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from("xamarin-component"),
            working_dir: PathBuf::from("."),
            timeout: DEFAULT_TIMEOUT,
            package_name: None,
            version: DEFAULT_VERSION.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR),
            project_name: None,
            summary: None,
            publisher: None,
            website: None,
            details: None,
            license: None,
            getting_started: None,
            icons: Vec::new(),
            libraries: Vec::new(),
            samples: Vec::new(),
        }
    }
}

impl PackageParameters {
    /// Apply an override function, returning the modified copy.
    pub fn with_overrides<F>(self, overrides: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        overrides(self)
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_path = path.into();
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icons.push(path.into());
        self
    }

    pub fn with_library(mut self, platform: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.libraries.push(Library::new(platform, path));
        self
    }

    pub fn with_sample(mut self, name: impl Into<String>, solution: impl Into<PathBuf>) -> Self {
        self.samples.push(Sample::new(name, solution));
        self
    }

    /// Package file name: `<package_name>-<version>.xam`.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the package name or version is missing or empty.
    pub fn file_name(&self) -> DomainResult<String> {
        let name = self
            .package_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DomainError::missing("package_name"))?;
        if self.version.is_empty() {
            return Err(DomainError::missing("version"));
        }
        Ok(format!("{}-{}.{}", name, self.version, PACKAGE_EXTENSION))
    }

    /// Full path of the package file inside `output_path`.
    pub fn output_file(&self) -> DomainResult<PathBuf> {
        Ok(self.output_path.join(self.file_name()?))
    }
}

/// Expand environment variables and tilde in a path string.
///
/// Handles `~`, `$VAR`, and `${VAR}` syntax. Unknown variables leave the
/// input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Expand environment variables and tilde in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(expand_env_vars(path.to_string_lossy().as_ref()))
}
