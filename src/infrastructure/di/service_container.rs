//! Service container for dependency injection
//!
//! Wires up the packaging service with its dependencies.

use std::sync::Arc;

use crate::application::services::PackagingService;
use crate::config::Settings;
use crate::infrastructure::traits::{
    BuildEnvironment, DirectoryToolLocator, EnvBuildEnvironment, FileSystem, ProcessRunner,
    RealFileSystem, RealProcessRunner, ToolLocator,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Process runner abstraction
    pub runner: Arc<dyn ProcessRunner>,

    /// Tool discovery
    pub locator: Arc<dyn ToolLocator>,

    /// CI build information
    pub build_env: Arc<dyn BuildEnvironment>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let locator = DirectoryToolLocator::new(
            settings.tool.search_dir.clone(),
            settings.tool.executables.clone(),
        );
        let build_env = EnvBuildEnvironment::new(settings.version.ci_variables.clone());
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealProcessRunner::default()),
            Arc::new(locator),
            Arc::new(build_env),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
        locator: Arc<dyn ToolLocator>,
        build_env: Arc<dyn BuildEnvironment>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            runner,
            locator,
            build_env,
        }
    }

    /// Packaging service sharing this container's dependencies.
    pub fn packaging_service(&self) -> PackagingService {
        PackagingService::new(
            self.fs.clone(),
            self.runner.clone(),
            self.locator.clone(),
            self.build_env.clone(),
            self.settings.clone(),
        )
    }
}
