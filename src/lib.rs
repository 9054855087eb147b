//! Soloist: single-instance scaffold for console applications.
//!
//! An application implements [`ConsoleApp`] and hands itself to [`run`];
//! the scaffold takes care of everything around it: command line parsing
//! with pass-through for application options, configuration files in ini,
//! JSON, or YAML, a PID lock file that refuses a second live instance,
//! dual logging to stdout and a log file, termination signals, and a
//! teardown that runs exactly once on every exit path. Unix only: the
//! liveness probe and the signal handling have no Windows counterpart
//! here.
//!
//! ```no_run
//! use soloist::{ConsoleApp, Lifecycle};
//!
//! struct Greeter;
//!
//! impl ConsoleApp for Greeter {
//!     fn run(&mut self, lifecycle: &Lifecycle) -> anyhow::Result<()> {
//!         println!("Hello from {}", lifecycle.name());
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     soloist::run("MyConsoleApp", Greeter)
//! }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod name;

#[cfg(test)]
mod test_support;

pub use app::{ConsoleApp, Lifecycle, LifecycleState, Started};
pub use cli::AppOptions;
pub use config::AppConfig;
pub use error::{FAILURE, Result, SUCCESS, SoloistError};
pub use lock::LockManager;
pub use name::derive_app_name;

use std::process::ExitCode;

/// Runs a console application over the process command line.
///
/// This is the whole `main` of a scaffolded application. `identity` is
/// the application's compound name, for example `MyConsoleApp`; see
/// [`derive_app_name`] for how it shapes the default file names.
pub fn run<A: ConsoleApp>(identity: &str, mut app: A) -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    ExitCode::from(run_with_args(identity, argv, &mut app) as u8)
}

/// [`run`] over an explicit command line, `argv[0]` included.
///
/// Help prints the usage text to stdout and succeeds. A command line the
/// scaffold cannot parse prints the error and the usage text to stderr.
/// Any other construction failure prints the error alone. Otherwise the
/// application runs and its outcome decides the code.
pub fn run_with_args(identity: &str, argv: Vec<String>, app: &mut dyn ConsoleApp) -> i32 {
    let invocation = argv
        .first()
        .cloned()
        .unwrap_or_else(|| derive_app_name(identity));
    match Lifecycle::start(identity, argv) {
        Ok(Started::Ready(lifecycle)) => lifecycle.execute(app),
        Ok(Started::Help(usage)) => {
            print!("{usage}");
            SUCCESS
        }
        Err(err @ SoloistError::Argument(_)) => {
            eprintln!("Error: {err}");
            eprint!("{}", cli::usage(&invocation));
            err.exit_code()
        }
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}
