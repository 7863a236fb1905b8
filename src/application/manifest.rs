//! Package manifest: per-package metadata kept in a TOML file
//!
//! ```toml
//! name = "Acme"
//! project_name = "Acme Widgets"
//! summary = "Widgets for mobile apps"
//! icons = ["icons/acme_128x128.png", "icons/acme_512x512.png"]
//!
//! [[libraries]]
//! platform = "ios"
//! path = "bin/ios/Acme.dll"
//!
//! [[samples]]
//! name = "Acme iOS Sample"
//! solution = "samples/Acme.iOS.sln"
//! ```
//!
//! Only fields present in the file override the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Library, PackageParameters, Sample};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestLibrary {
    pub platform: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestSample {
    pub name: String,
    pub solution: PathBuf,
}

/// Package metadata loaded from a manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageManifest {
    /// Package identifier
    pub name: Option<String>,
    pub version: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub project_name: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub website: Option<String>,
    pub details: Option<String>,
    pub license: Option<String>,
    pub getting_started: Option<String>,
    pub icons: Option<Vec<PathBuf>>,
    pub libraries: Option<Vec<ManifestLibrary>>,
    pub samples: Option<Vec<ManifestSample>>,
}

impl PackageManifest {
    /// Load a manifest from a TOML file.
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        debug!("load manifest: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
            message: format!("read {}: {}", path.display(), e),
        })?;
        Self::parse(&content).map_err(|e| match e {
            ApplicationError::Config { message } => ApplicationError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Parse manifest TOML.
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::Config {
            message: format!("parse manifest: {e}"),
        })
    }

    /// Override `params` with every field set in this manifest.
    ///
    /// Sequences replace the defaults' sequences as a whole.
    pub fn apply(&self, mut params: PackageParameters) -> PackageParameters {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set_opt(&mut params.package_name, &self.name);
        set(&mut params.version, &self.version);
        set(&mut params.output_path, &self.output_dir);
        set_opt(&mut params.project_name, &self.project_name);
        set_opt(&mut params.summary, &self.summary);
        set_opt(&mut params.publisher, &self.publisher);
        set_opt(&mut params.website, &self.website);
        set_opt(&mut params.details, &self.details);
        set_opt(&mut params.license, &self.license);
        set_opt(&mut params.getting_started, &self.getting_started);
        set(&mut params.icons, &self.icons);

        if let Some(libraries) = &self.libraries {
            params.libraries = libraries
                .iter()
                .map(|l| Library::new(l.platform.clone(), l.path.clone()))
                .collect();
        }
        if let Some(samples) = &self.samples {
            params.samples = samples
                .iter()
                .map(|s| Sample::new(s.name.clone(), s.solution.clone()))
                .collect();
        }

        params
    }
}
