//! Command dispatch: maps parsed arguments onto services

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::PackageManifest;
use crate::cli::args::{Cli, Commands, ConfigCommands, PackageArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Operation, PackageParameters};
use crate::infrastructure::di::ServiceContainer;

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().map_err(|e| CliError::io("current directory", e))?;
    let project_dir = match &cli.project_dir {
        Some(dir) => absolute(&cwd, dir),
        None => cwd.clone(),
    };

    match &cli.command {
        Some(Commands::Pack(args)) => {
            run_package(&cwd, &project_dir, Operation::Create, args)
        }
        Some(Commands::Validate(args)) => {
            run_package(&cwd, &project_dir, Operation::Validate, args)
        }
        Some(Commands::Config { command }) => run_config(&project_dir, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `xampack --help`".into(),
        )),
    }
}

/// Resolve `path` against `base` unless it is already absolute.
fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// A `--tool` value with a directory part is relative to the caller's cwd;
/// a bare name is left for `PATH` lookup.
fn resolve_tool(cwd: &Path, tool: &Path) -> PathBuf {
    if tool.components().count() > 1 {
        absolute(cwd, tool)
    } else {
        tool.to_path_buf()
    }
}

#[instrument(skip(cwd, args))]
fn run_package(
    cwd: &Path,
    project_dir: &Path,
    operation: Operation,
    args: &PackageArgs,
) -> CliResult<()> {
    if args.timeout == Some(0) {
        return Err(CliError::InvalidArgs("--timeout must be at least 1".into()));
    }

    let mut settings = Settings::load(Some(project_dir))?;
    if settings.working_dir.is_none() {
        settings.working_dir = Some(project_dir.to_path_buf());
    }
    settings.tool.search_dir = project_dir.join(&settings.tool.search_dir);
    let container = ServiceContainer::new(settings);
    let service = container.packaging_service();

    let manifest = match &args.manifest {
        Some(path) => Some(PackageManifest::load(&project_dir.join(path))?),
        None => None,
    };
    let overrides = |params: PackageParameters| apply_args(params, manifest.as_ref(), args, cwd);

    if args.dry_run {
        let (tool, line) = service.command_line(operation, overrides)?;
        output::info(&format!("{} {}", tool.display(), line));
        return Ok(());
    }

    match operation {
        Operation::Create => service.pack(overrides)?,
        Operation::Validate => service.validate(overrides)?,
    }
    output::success(&format!("{} succeeded", operation.name()));
    Ok(())
}

/// Manifest first, then explicit flags.
fn apply_args(
    params: PackageParameters,
    manifest: Option<&PackageManifest>,
    args: &PackageArgs,
    cwd: &Path,
) -> PackageParameters {
    let mut params = match manifest {
        Some(m) => m.apply(params),
        None => params,
    };
    if let Some(name) = &args.package_name {
        params = params.with_package_name(name.clone());
    }
    if let Some(version) = &args.package_version {
        params = params.with_version(version.clone());
    }
    if let Some(dir) = &args.output_dir {
        params = params.with_output_path(dir.clone());
    }
    if let Some(tool) = &args.tool {
        params = params.with_tool_path(resolve_tool(cwd, tool));
    }
    if let Some(secs) = args.timeout {
        params = params.with_timeout(Duration::from_secs(secs));
    }
    debug!("effective parameters: {:?}", params);
    params
}

#[instrument]
fn run_config(project_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let global = global_config_path().unwrap_or_else(|| PathBuf::from("<none>"));
            let local = local_config_path(project_dir);
            output::header("Config files");
            output::detail(&format!("global: {}{}", global.display(), marker(&global)));
            output::detail(&format!("local:  {}{}", local.display(), marker(&local)));
        }
    }
    Ok(())
}

fn marker(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (missing)"
    }
}
