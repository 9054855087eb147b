//! Application lifecycle controller.

use std::any::Any;
use std::io::IsTerminal;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::cli::{self, AppOptions};
use crate::config::AppConfig;
use crate::error::{FAILURE, Result, SUCCESS, SoloistError};
use crate::lock::LockManager;
use crate::logging;
use crate::name::derive_app_name;

use super::signals::SignalWatcher;
use super::teardown::{SignalState, StopReason, Teardown};

/// What a console application does once the scaffold has it ready.
///
/// The lifecycle reference gives `run` access to the parsed options, the
/// resolved configuration, and the cooperative
/// [`shutdown_requested`](Lifecycle::shutdown_requested) flag. Long loops
/// should poll that flag and return when it flips.
pub trait ConsoleApp {
    /// The application's entire purpose. An error here is logged as fatal
    /// and mapped to a failing exit status; returning is what triggers
    /// teardown.
    fn run(&mut self, lifecycle: &Lifecycle) -> anyhow::Result<()>;
}

/// Phases a lifecycle moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Constructing,
    Ready,
    Running,
    Terminating,
    Terminated,
}

/// Outcome of the construction phase.
pub enum Started {
    /// Construction completed; the application may run.
    Ready(Lifecycle),
    /// `-h`/`--help` was given. Carries the usage text; no lock, logger,
    /// or handler was set up.
    Help(String),
}

/// Controller for one console application process.
///
/// Construction ([`start`](Lifecycle::start)) parses the command line,
/// resolves configuration, enforces the console requirement, takes the
/// single-instance lock, starts logging, and installs signal handlers.
/// Execution ([`execute`](Lifecycle::execute)) runs the application inside
/// a panic boundary and drives the exactly-once teardown, whatever the
/// exit path: a normal return, a fatal error, or a termination signal
/// handled on the watcher thread.
pub struct Lifecycle {
    name: String,
    invocation: String,
    options: AppOptions,
    config: AppConfig,
    teardown: Teardown,
    signal_state: Arc<SignalState>,
    watcher: Option<SignalWatcher>,
    state: LifecycleState,
}

impl Lifecycle {
    /// Runs the construction phase on the given command line, `argv[0]`
    /// included.
    ///
    /// `identity` is the application's compound name; see
    /// [`derive_app_name`] for how it becomes the canonical name that
    /// drives the default config, lock, and log file names.
    pub fn start(identity: &str, argv: Vec<String>) -> Result<Started> {
        let name = derive_app_name(identity);
        let invocation = argv.first().cloned().unwrap_or_else(|| name.clone());
        let options = cli::parse(argv.get(1..).unwrap_or_default())?;
        if options.help {
            return Ok(Started::Help(cli::usage(&invocation)));
        }
        let config = resolve_config(&options, &name)?;
        console_check(config.console_only, in_console())?;

        // The lock comes before any other setup; if construction fails
        // later, dropping the manager releases it again.
        let mut lock = LockManager::new();
        if config.one_instance_only {
            let lock_path = config.lock_file_path(&name)?;
            lock.lock(&lock_path)?;
        }

        let log_guard = logging::init(&config.log_file_path(&name)?)?;
        let signal_state = Arc::new(SignalState::default());
        let teardown = Teardown::new(name.clone(), lock, log_guard, Arc::clone(&signal_state));
        let watcher = match SignalWatcher::install(teardown.clone()) {
            Ok(watcher) => Some(watcher),
            Err(error) => {
                warn!(error = %error, "signal handlers unavailable, continuing without them");
                None
            }
        };

        info!("Starting {name}");
        Ok(Started::Ready(Self {
            name,
            invocation,
            options,
            config,
            teardown,
            signal_state,
            watcher,
            state: LifecycleState::Ready,
        }))
    }

    /// Runs the application and drives the teardown, returning the
    /// process exit code.
    ///
    /// `run` executes inside a panic boundary, so a crashing application
    /// still releases its lock and writes its stop entry. The code is
    /// [`SUCCESS`] only for a clean return with no signal observed.
    pub fn execute(mut self, app: &mut dyn ConsoleApp) -> i32 {
        self.state = LifecycleState::Running;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| app.run(&self)));
        self.state = LifecycleState::Terminating;
        let (code, reason) = match outcome {
            Ok(Ok(())) => {
                // The watcher exits the process on delivery; seeing the
                // flag here means the application chose to return instead.
                let code = if self.shutdown_requested() {
                    FAILURE
                } else {
                    SUCCESS
                };
                (code, StopReason::Completed)
            }
            Ok(Err(err)) => {
                error!("Fatal error: {err:#}");
                (FAILURE, StopReason::Fatal)
            }
            Err(payload) => {
                error!("Fatal error: {}", panic_message(payload.as_ref()));
                (FAILURE, StopReason::Fatal)
            }
        };
        self.teardown.run(reason);
        self.state = LifecycleState::Terminated;
        code
    }

    /// Canonical application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The program name as invoked.
    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    /// Parsed command line.
    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    /// Resolved configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether a termination signal has been observed.
    pub fn shutdown_requested(&self) -> bool {
        self.signal_state.requested()
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> LifecycleState {
        if self.teardown.completed() {
            LifecycleState::Terminated
        } else {
            self.state
        }
    }

    #[cfg(test)]
    pub(crate) fn signal_state(&self) -> Arc<SignalState> {
        Arc::clone(&self.signal_state)
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        // Covers a ready lifecycle abandoned without execute; after a
        // normal execute both calls are no-ops.
        self.teardown.run(StopReason::Completed);
        if let Some(mut watcher) = self.watcher.take() {
            watcher.close();
        }
    }
}

/// Resolves which config file to read.
///
/// An explicit `--config` that does not exist is a hard error; the
/// default `<name>.ini` in the current directory is read when present and
/// silently skipped otherwise.
fn resolve_config(options: &AppOptions, name: &str) -> Result<AppConfig> {
    match &options.config {
        Some(path) => {
            if !path.exists() {
                return Err(SoloistError::ConfigNotFound { path: path.clone() });
            }
            AppConfig::load(path)
        }
        None => {
            let default = PathBuf::from(format!("{name}.ini"));
            if default.exists() {
                AppConfig::load(&default)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

/// Whether the process is attached to a console on any standard stream.
fn in_console() -> bool {
    std::io::stdin().is_terminal()
        || std::io::stdout().is_terminal()
        || std::io::stderr().is_terminal()
}

/// The console-only decision, separated from the probe so both outcomes
/// are reachable in tests.
fn console_check(console_only: bool, attached: bool) -> Result<()> {
    if console_only && !attached {
        return Err(SoloistError::Environment(
            "This application must be run from a console".to_string(),
        ));
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_console_check_matrix() {
        assert!(console_check(true, true).is_ok());
        assert!(console_check(false, true).is_ok());
        assert!(console_check(false, false).is_ok());
        let err = console_check(true, false).unwrap_err();
        assert!(matches!(err, SoloistError::Environment(_)));
    }

    #[test]
    fn test_resolve_config_explicit_missing_is_hard_error() {
        let options = AppOptions {
            config: Some(PathBuf::from("/no/such/config.ini")),
            ..AppOptions::default()
        };
        let err = resolve_config(&options, "my-app").unwrap_err();
        assert!(matches!(err, SoloistError::ConfigNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_resolve_config_discovers_default_in_cwd() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("my-app.ini"),
            "oneInstanceOnly = false\nmarker = found\n",
        )
        .unwrap();
        let _guard = DirGuard::new(dir.path());

        let config = resolve_config(&AppOptions::default(), "my-app").unwrap();

        assert!(!config.one_instance_only);
        assert_eq!(config.get("marker"), Some(&serde_json::json!("found")));
    }

    #[test]
    #[serial]
    fn test_resolve_config_missing_default_falls_back() {
        let dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(dir.path());

        let config = resolve_config(&AppOptions::default(), "my-app").unwrap();

        assert!(config.one_instance_only);
        assert!(config.console_only);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static panic");
        assert_eq!(panic_message(payload.as_ref()), "static panic");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned panic"));
        assert_eq!(panic_message(payload.as_ref()), "owned panic");

        let payload: Box<dyn Any + Send> = Box::new(17_u8);
        assert_eq!(panic_message(payload.as_ref()), "panic with a non-string payload");
    }
}
