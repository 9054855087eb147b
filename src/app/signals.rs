//! Signal-driven shutdown.

use std::io;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::iterator::backend::Handle;
use tracing::warn;

use crate::error::FAILURE;

use super::teardown::{StopReason, Teardown};

/// Signals that stop a scaffolded application.
const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGHUP, SIGQUIT];

/// Watcher thread that drives teardown when a termination signal arrives.
///
/// On delivery the thread records the signal for the cooperative
/// `shutdown_requested` flag, announces it, runs the shared teardown, and
/// ends the process with the failure status. A lifecycle that terminates
/// normally closes the watcher instead, which unblocks and joins the
/// thread.
pub(crate) struct SignalWatcher {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatcher {
    /// Installs the handlers and spawns the watcher thread.
    pub(crate) fn install(teardown: Teardown) -> io::Result<Self> {
        let mut signals = Signals::new(TERMINATION_SIGNALS)?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name("soloist-signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    teardown.signal_state().record(signal);
                    warn!("Caught signal {signal}, terminating");
                    teardown.run(StopReason::Signal(signal));
                    std::process::exit(FAILURE);
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// Stops watching and joins the thread.
    pub(crate) fn close(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SignalWatcher {
    fn drop(&mut self) {
        self.close();
    }
}
