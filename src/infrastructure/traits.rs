//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// How a tool process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Process exited with this code.
    Exited(i32),
    /// Process was ended by a signal, no exit code available.
    Terminated,
    /// Process did not exit within the timeout and was killed.
    TimedOut,
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// External process runner abstraction.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` in `working_dir` with a single argument string.
    ///
    /// Blocks until the process exits or `timeout` elapses. Returns `Err`
    /// only if the process could not be started or waited on.
    fn run(
        &self,
        program: &Path,
        working_dir: &Path,
        args: &str,
        timeout: Duration,
    ) -> io::Result<ProcessOutcome>;
}

/// Locates the packaging tool executable.
pub trait ToolLocator: Send + Sync {
    /// Return the first matching executable, if any.
    fn locate(&self) -> Option<PathBuf>;
}

/// Information supplied by a CI build pipeline.
pub trait BuildEnvironment: Send + Sync {
    /// Build version when running in CI, `None` for local runs.
    fn build_version(&self) -> Option<String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Real process runner: spawns the tool and polls it until exit or deadline.
#[derive(Debug, Clone)]
pub struct RealProcessRunner {
    poll_interval: Duration,
}

impl Default for RealProcessRunner {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl RealProcessRunner {
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    fn command(program: &Path, working_dir: &Path, args: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.raw_arg(args);
        }
        #[cfg(not(windows))]
        {
            cmd.args(split_command_line(args));
        }

        cmd
    }

    fn wait(&self, child: &mut Child, timeout: Duration) -> io::Result<ProcessOutcome> {
        // No deadline when the timeout does not fit into an Instant
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let expired = deadline.is_some_and(|d| Instant::now() >= d);
            if let Some(status) = child.try_wait()? {
                return Ok(outcome(status));
            }
            if expired {
                warn!("process {} timed out after {:?}", child.id(), timeout);
                let _ = child.kill();
                child.wait()?;
                return Ok(ProcessOutcome::TimedOut);
            }
            let pause = deadline
                .map(|d| d.saturating_duration_since(Instant::now()))
                .map_or(self.poll_interval, |left| left.min(self.poll_interval));
            thread::sleep(pause);
        }
    }
}

fn outcome(status: ExitStatus) -> ProcessOutcome {
    match status.code() {
        Some(code) => ProcessOutcome::Exited(code),
        None => ProcessOutcome::Terminated,
    }
}

impl ProcessRunner for RealProcessRunner {
    fn run(
        &self,
        program: &Path,
        working_dir: &Path,
        args: &str,
        timeout: Duration,
    ) -> io::Result<ProcessOutcome> {
        let mut child = Self::command(program, working_dir, args).spawn()?;
        debug!("spawned pid={} program={}", child.id(), program.display());
        let outcome = self.wait(&mut child, timeout)?;
        debug!("pid={} outcome={:?}", child.id(), outcome);
        Ok(outcome)
    }
}

/// Split an argument string into argv the way the packaging tool reads it.
///
/// Whitespace outside double quotes separates tokens; quotes group and are
/// removed, so `--library="a b":"c"` becomes `--library=a b:c`. Quotes are
/// never escaped.
pub fn split_command_line(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in args.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

/// Searches a tool directory recursively, then `PATH`.
#[derive(Debug, Clone)]
pub struct DirectoryToolLocator {
    search_dir: PathBuf,
    executables: Vec<String>,
}

impl DirectoryToolLocator {
    pub fn new(search_dir: impl Into<PathBuf>, executables: Vec<String>) -> Self {
        Self {
            search_dir: search_dir.into(),
            executables,
        }
    }

    fn search_tree(&self) -> Option<PathBuf> {
        WalkDir::new(&self.search_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .find(|e| {
                e.file_name()
                    .to_str()
                    .map(|n| self.executables.iter().any(|x| x == n))
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
    }
}

impl ToolLocator for DirectoryToolLocator {
    fn locate(&self) -> Option<PathBuf> {
        if let Some(found) = self.search_tree() {
            debug!("locate: found {} in tool dir", found.display());
            return Some(found);
        }
        let found = self.executables.iter().find_map(|x| which::which(x).ok());
        debug!("locate: PATH lookup result={:?}", found);
        found
    }
}

/// Reads the CI build version from environment variables.
#[derive(Debug, Clone)]
pub struct EnvBuildEnvironment {
    variables: Vec<String>,
}

impl EnvBuildEnvironment {
    pub fn new(variables: Vec<String>) -> Self {
        Self { variables }
    }
}

impl BuildEnvironment for EnvBuildEnvironment {
    fn build_version(&self) -> Option<String> {
        self.variables
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.trim().is_empty())
    }
}
