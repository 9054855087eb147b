//! The shutdown sequence shared by every exit path.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, Once};

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::lock::LockManager;

/// Why the application is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReason {
    /// `run()` returned.
    Completed,
    /// A termination signal arrived.
    Signal(i32),
    /// `run()` failed or panicked.
    Fatal,
}

/// Signal bookkeeping shared between the watcher thread and the lifecycle.
#[derive(Debug, Default)]
pub(crate) struct SignalState {
    requested: AtomicBool,
    last_signal: AtomicI32,
}

impl SignalState {
    pub(crate) fn record(&self, signal: i32) {
        self.last_signal.store(signal, Ordering::SeqCst);
        self.requested.store(true, Ordering::SeqCst);
    }

    pub(crate) fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub(crate) fn last_signal(&self) -> Option<i32> {
        if self.requested() {
            Some(self.last_signal.load(Ordering::SeqCst))
        } else {
            None
        }
    }
}

struct TeardownInner {
    app_name: String,
    lock: Mutex<LockManager>,
    log_guard: Mutex<Option<WorkerGuard>>,
    signal_state: Arc<SignalState>,
    once: Once,
}

/// Handle to the termination sequence.
///
/// Cheap to clone; the lifecycle, the signal watcher thread, and the drop
/// path all hold one. However many of them race to trigger it, the
/// sequence runs exactly once: release the lock, write the stop entry,
/// flush the log file. Callers that lose the race wait for the winner,
/// so a returned `run` always means the cleanup is done. A signal
/// observed along the way is surfaced first so it is never silently
/// lost.
#[derive(Clone)]
pub(crate) struct Teardown {
    inner: Arc<TeardownInner>,
}

impl Teardown {
    pub(crate) fn new(
        app_name: String,
        lock: LockManager,
        log_guard: Option<WorkerGuard>,
        signal_state: Arc<SignalState>,
    ) -> Self {
        Self {
            inner: Arc::new(TeardownInner {
                app_name,
                lock: Mutex::new(lock),
                log_guard: Mutex::new(log_guard),
                signal_state,
                once: Once::new(),
            }),
        }
    }

    /// Runs the termination sequence. One caller executes it; concurrent
    /// callers block until that execution has finished, and later calls
    /// return immediately.
    pub(crate) fn run(&self, reason: StopReason) {
        self.inner.once.call_once(|| {
            // A signal that arrived without driving this teardown itself is
            // logged here; the watcher announces the ones it acts on.
            match self.inner.signal_state.last_signal() {
                Some(signal) if !matches!(reason, StopReason::Signal(_)) => {
                    warn!("Caught signal {signal}, terminating");
                }
                _ => {}
            }
            {
                let mut lock = self
                    .inner
                    .lock
                    .lock()
                    .unwrap_or_else(|poison| poison.into_inner());
                if let Err(error) = lock.unlock() {
                    warn!(error = %error, "failed to release lock during teardown");
                }
            }
            info!("Stopping {}", self.inner.app_name);
            // Dropping the guard flushes the file sink; nothing may log to it
            // past this point.
            let guard = self
                .inner
                .log_guard
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .take();
            drop(guard);
        });
    }

    pub(crate) fn completed(&self) -> bool {
        self.inner.once.is_completed()
    }

    pub(crate) fn signal_state(&self) -> &Arc<SignalState> {
        &self.inner.signal_state
    }
}
