//! Packaging service: pack and validate component packages
//!
//! Each operation builds its parameters from defaults plus caller overrides,
//! serializes them into the tool's argument string and runs the tool once.
//! Exit code 0 is success; anything else (including a timeout) fails the
//! operation. Failed runs are never retried.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, ToolExit};
use crate::config::Settings;
use crate::domain::{build_command_line, Operation, PackageParameters};
use crate::infrastructure::traits::{
    BuildEnvironment, FileSystem, ProcessOutcome, ProcessRunner, ToolLocator,
};

/// Runs the packaging tool.
pub struct PackagingService {
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ProcessRunner>,
    locator: Arc<dyn ToolLocator>,
    build_env: Arc<dyn BuildEnvironment>,
    settings: Arc<Settings>,
}

impl PackagingService {
    /// Create a new packaging service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
        locator: Arc<dyn ToolLocator>,
        build_env: Arc<dyn BuildEnvironment>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            fs,
            runner,
            locator,
            build_env,
            settings,
        }
    }

    /// Default parameters for this environment.
    ///
    /// - tool: configured path, else discovered, else `<search_dir>/<first executable>`
    /// - working dir: configured, else current directory
    /// - version: CI build version, else the configured fallback
    pub fn defaults(&self) -> PackageParameters {
        let tool_path = self
            .settings
            .tool
            .path
            .clone()
            .or_else(|| self.locator.locate())
            .unwrap_or_else(|| self.undiscovered_tool_path());

        let working_dir = self
            .settings
            .working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let version = self
            .build_env
            .build_version()
            .unwrap_or_else(|| self.settings.version.fallback.clone());

        PackageParameters {
            tool_path,
            working_dir,
            timeout: self.settings.tool.timeout(),
            version,
            output_path: self.settings.output_dir.clone(),
            ..PackageParameters::default()
        }
    }

    fn undiscovered_tool_path(&self) -> PathBuf {
        let name = self
            .settings
            .tool
            .executables
            .first()
            .map(String::as_str)
            .unwrap_or("xamarin-component");
        debug!("packaging tool not discovered, assuming {}", name);
        self.settings.tool.search_dir.join(name)
    }

    /// Build a package (`create`).
    pub fn pack<F>(&self, overrides: F) -> ApplicationResult<()>
    where
        F: FnOnce(PackageParameters) -> PackageParameters,
    {
        let params = self.defaults().with_overrides(overrides);
        self.run(Operation::Create, &params)
    }

    /// Validate an existing package (`validate`).
    pub fn validate<F>(&self, overrides: F) -> ApplicationResult<()>
    where
        F: FnOnce(PackageParameters) -> PackageParameters,
    {
        let params = self.defaults().with_overrides(overrides);
        self.run(Operation::Validate, &params)
    }

    /// Tool path and argument string for `operation`, without running anything.
    pub fn command_line<F>(
        &self,
        operation: Operation,
        overrides: F,
    ) -> ApplicationResult<(PathBuf, String)>
    where
        F: FnOnce(PackageParameters) -> PackageParameters,
    {
        let params = self.defaults().with_overrides(overrides);
        let args = build_command_line(&params, operation)?;
        Ok((params.tool_path, args))
    }

    /// Run `operation` with fully resolved parameters.
    ///
    /// # Errors
    /// - `Domain(InvalidConfiguration)` if the package file name cannot be derived
    /// - `OperationFailed` if the tool cannot be started
    /// - `PackagingToolFailure` on non-zero exit, signal or timeout
    pub fn run(&self, operation: Operation, params: &PackageParameters) -> ApplicationResult<()> {
        let file_name = params.file_name()?;
        info!(operation = operation.name(), file = %file_name, "start");

        let args = build_command_line(params, operation)?;
        debug!("{} {}", params.tool_path.display(), args);

        if operation == Operation::Create {
            let out_dir = params.working_dir.join(&params.output_path);
            if !self.fs.exists(&out_dir) {
                self.fs
                    .create_dir_all(&out_dir)
                    .with_path_context("create output dir", &out_dir)?;
            }
        }

        let outcome = self
            .runner
            .run(&params.tool_path, &params.working_dir, &args, params.timeout)
            .with_path_context("run packaging tool", &params.tool_path)?;

        let exit = match outcome {
            ProcessOutcome::Exited(0) => {
                info!(operation = operation.name(), file = %file_name, "end");
                return Ok(());
            }
            ProcessOutcome::Exited(code) => ToolExit::Code(code),
            ProcessOutcome::TimedOut => ToolExit::TimedOut,
            ProcessOutcome::Terminated => ToolExit::Terminated,
        };

        debug!("{} failed: {}", operation.name(), exit);
        Err(ApplicationError::PackagingToolFailure { operation, exit })
    }
}
