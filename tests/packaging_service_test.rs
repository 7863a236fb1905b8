//! Tests for PackagingService with stubbed process runner

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use xampack::application::services::PackagingService;
use xampack::application::{ApplicationError, ToolExit};
use xampack::config::{Settings, ToolConfig};
use xampack::domain::{DomainError, Operation};
use xampack::infrastructure::traits::{
    BuildEnvironment, FileSystem, ProcessOutcome, ProcessRunner, ToolLocator,
};
use xampack::util::testing::init_test_setup;

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    program: PathBuf,
    working_dir: PathBuf,
    args: String,
    timeout: Duration,
}

/// Runner stub returning a fixed outcome and recording calls
struct StubRunner {
    outcome: io::Result<ProcessOutcome>,
    calls: Mutex<Vec<Invocation>>,
}

impl StubRunner {
    fn returning(outcome: ProcessOutcome) -> Self {
        Self {
            outcome: Ok(outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_to_spawn() -> Self {
        Self {
            outcome: Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessRunner for StubRunner {
    fn run(
        &self,
        program: &Path,
        working_dir: &Path,
        args: &str,
        timeout: Duration,
    ) -> io::Result<ProcessOutcome> {
        self.calls.lock().unwrap().push(Invocation {
            program: program.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
            args: args.to_string(),
            timeout,
        });
        match &self.outcome {
            Ok(outcome) => Ok(*outcome),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        }
    }
}

/// Filesystem recording created directories
#[derive(Default)]
struct RecordingFs {
    created: Mutex<Vec<PathBuf>>,
}

impl FileSystem for RecordingFs {
    fn exists(&self, _path: &Path) -> bool {
        false
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.created.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

struct FixedLocator(Option<PathBuf>);

impl ToolLocator for FixedLocator {
    fn locate(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

struct FixedBuildEnv(Option<String>);

impl BuildEnvironment for FixedBuildEnv {
    fn build_version(&self) -> Option<String> {
        self.0.clone()
    }
}

fn test_settings() -> Settings {
    Settings {
        working_dir: Some(PathBuf::from("/work")),
        ..Settings::default()
    }
}

struct Fixture {
    service: PackagingService,
    runner: Arc<StubRunner>,
    fs: Arc<RecordingFs>,
}

fn fixture(runner: StubRunner, settings: Settings, ci_version: Option<&str>) -> Fixture {
    init_test_setup();
    let runner = Arc::new(runner);
    let fs = Arc::new(RecordingFs::default());
    let service = PackagingService::new(
        fs.clone(),
        runner.clone(),
        Arc::new(FixedLocator(Some(PathBuf::from("tools/xamarin-component.exe")))),
        Arc::new(FixedBuildEnv(ci_version.map(String::from))),
        Arc::new(settings),
    );
    Fixture { service, runner, fs }
}

// ============================================================
// defaults() tests
// ============================================================

#[test]
fn given_local_run_when_defaults_then_uses_placeholder_version() {
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(0)), test_settings(), None);

    let params = f.service.defaults();

    assert_eq!(params.version, "0.1.0.0");
    assert_eq!(params.timeout, Duration::from_secs(300));
    assert_eq!(params.output_path, PathBuf::from("xpkg"));
    assert_eq!(params.working_dir, PathBuf::from("/work"));
    assert_eq!(params.tool_path, PathBuf::from("tools/xamarin-component.exe"));
    assert!(params.package_name.is_none());
    assert!(params.icons.is_empty());
}

#[test]
fn given_ci_run_when_defaults_then_uses_build_version() {
    let f = fixture(
        StubRunner::returning(ProcessOutcome::Exited(0)),
        test_settings(),
        Some("1.4.0.27"),
    );

    assert_eq!(f.service.defaults().version, "1.4.0.27");
}

#[test]
fn given_configured_tool_path_when_defaults_then_skips_discovery() {
    let settings = Settings {
        tool: ToolConfig {
            path: Some(PathBuf::from("/opt/xamarin-component")),
            timeout_secs: 30,
            ..ToolConfig::default()
        },
        ..test_settings()
    };
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(0)), settings, None);

    let params = f.service.defaults();

    assert_eq!(params.tool_path, PathBuf::from("/opt/xamarin-component"));
    assert_eq!(params.timeout, Duration::from_secs(30));
}

// ============================================================
// pack() / validate() tests
// ============================================================

#[test]
fn given_exit_zero_when_pack_then_succeeds_and_invokes_tool_once() {
    // Arrange
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(0)), test_settings(), None);

    // Act
    let result = f.service.pack(|p| {
        p.with_package_name("Acme")
            .with_version("2.0.0")
            .with_output_path("./out")
            .with_icon("a.png")
    });

    // Assert
    assert!(result.is_ok(), "{result:?}");
    let calls = f.runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, PathBuf::from("tools/xamarin-component.exe"));
    assert_eq!(calls[0].working_dir, PathBuf::from("/work"));
    assert_eq!(calls[0].timeout, Duration::from_secs(300));
    assert_eq!(
        calls[0].args,
        r#"create "./out/Acme-2.0.0.xam" --icon="a.png""#
    );
}

#[test]
fn given_pack_when_run_then_creates_output_dir_under_working_dir() {
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(0)), test_settings(), None);

    f.service.pack(|p| p.with_package_name("Acme")).unwrap();

    let created = f.fs.created.lock().unwrap().clone();
    assert_eq!(created, vec![PathBuf::from("/work").join("xpkg")]);
}

#[test]
fn given_validate_when_run_then_does_not_create_output_dir() {
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(0)), test_settings(), None);

    f.service.validate(|p| p.with_package_name("Acme")).unwrap();

    assert!(f.fs.created.lock().unwrap().is_empty());
    assert_eq!(
        f.runner.calls()[0].args,
        r#"validate "xpkg/Acme-0.1.0.0.xam""#
    );
}

#[test]
fn given_exit_17_when_pack_then_packaging_tool_failure_carries_17() {
    // Arrange
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(17)), test_settings(), None);

    // Act
    let err = f.service.pack(|p| p.with_package_name("Acme")).unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ApplicationError::PackagingToolFailure {
            operation: Operation::Create,
            exit: ToolExit::Code(17),
        }
    ));
    assert_eq!(err.exit_code(), Some(17));
    assert_eq!(f.runner.calls().len(), 1, "failures are not retried");
}

#[test]
fn given_exit_17_when_validate_then_packaging_tool_failure_names_validate() {
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(17)), test_settings(), None);

    let err = f.service.validate(|p| p.with_package_name("Acme")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::PackagingToolFailure {
            operation: Operation::Validate,
            exit: ToolExit::Code(17),
        }
    ));
    assert_eq!(err.to_string(), "validate failed: packaging tool exit code 17");
}

#[test]
fn given_timeout_when_pack_then_packaging_tool_failure_timed_out() {
    let f = fixture(StubRunner::returning(ProcessOutcome::TimedOut), test_settings(), None);

    let err = f.service.pack(|p| p.with_package_name("Acme")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::PackagingToolFailure {
            exit: ToolExit::TimedOut,
            ..
        }
    ));
    assert_eq!(err.exit_code(), None);
}

#[test]
fn given_signal_when_pack_then_packaging_tool_failure_terminated() {
    let f = fixture(StubRunner::returning(ProcessOutcome::Terminated), test_settings(), None);

    let err = f.service.pack(|p| p.with_package_name("Acme")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::PackagingToolFailure {
            exit: ToolExit::Terminated,
            ..
        }
    ));
}

#[test]
fn given_missing_package_name_when_pack_then_invalid_configuration_without_running() {
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(0)), test_settings(), None);

    let err = f.service.pack(|p| p).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidConfiguration { .. })
    ));
    assert!(f.runner.calls().is_empty());
}

#[test]
fn given_unstartable_tool_when_pack_then_operation_failed() {
    let f = fixture(StubRunner::failing_to_spawn(), test_settings(), None);

    let err = f.service.pack(|p| p.with_package_name("Acme")).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("run packaging tool"));
}

#[test]
fn given_overrides_when_command_line_then_returns_without_running() {
    let f = fixture(StubRunner::returning(ProcessOutcome::Exited(0)), test_settings(), None);

    let (tool, args) = f
        .service
        .command_line(Operation::Create, |p| {
            p.with_package_name("Acme").with_tool_path("/bin/xc")
        })
        .unwrap();

    assert_eq!(tool, PathBuf::from("/bin/xc"));
    assert_eq!(args, r#"create "xpkg/Acme-0.1.0.0.xam""#);
    assert!(f.runner.calls().is_empty());
}

/// Log sink collecting formatted events
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn given_undiscovered_tool_and_tool_override_when_pack_then_no_warning_logged() {
    // Arrange
    let runner = Arc::new(StubRunner::returning(ProcessOutcome::Exited(0)));
    let service = PackagingService::new(
        Arc::new(RecordingFs::default()),
        runner.clone(),
        Arc::new(FixedLocator(None)),
        Arc::new(FixedBuildEnv(None)),
        Arc::new(test_settings()),
    );
    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(log.clone())
        .with_max_level(Level::WARN)
        .finish();

    // Act
    let result = tracing::subscriber::with_default(subscriber, || {
        service.pack(|p| {
            p.with_package_name("Acme")
                .with_tool_path("/opt/xamarin-component")
        })
    });

    // Assert
    assert!(result.is_ok());
    assert_eq!(runner.calls()[0].program, PathBuf::from("/opt/xamarin-component"));
    assert!(log.contents().is_empty(), "unexpected log: {}", log.contents());
}
