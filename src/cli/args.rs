//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Build and validate component packages with the xamarin-component tool
#[derive(Parser, Debug)]
#[command(name = "xampack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .xam package
    Pack(PackageArgs),

    /// Validate an existing .xam package
    Validate(PackageArgs),

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by pack and validate.
#[derive(Args, Debug, Default, Clone)]
pub struct PackageArgs {
    /// Package manifest (TOML)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,

    /// Package identifier (overrides manifest)
    #[arg(short = 'n', long)]
    pub package_name: Option<String>,

    /// Package version (default: CI build version or 0.1.0.0)
    #[arg(long = "package-version", env = "XAMPACK_PACKAGE_VERSION")]
    pub package_version: Option<String>,

    /// Directory holding the .xam file
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Packaging tool executable
    #[arg(long, value_hint = ValueHint::ExecutablePath)]
    pub tool: Option<PathBuf>,

    /// Seconds to wait for the tool
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the tool command line instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
