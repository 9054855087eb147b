//! Process liveness probe.

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Returns whether a process with the given PID is currently alive.
///
/// Probes with signal 0, which performs the permission check without
/// delivering anything. `EPERM` means the process exists but belongs to
/// another user, which still counts as alive. Ambiguous errnos also count
/// as alive so a held lock is never stolen on a strange answer.
pub(super) fn process_alive(pid: u32) -> bool {
    // PID 0 would probe our own process group, and values beyond i32 are
    // not valid PIDs on any supported platform.
    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };
    if pid == 0 {
        return false;
    }
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(Errno::ESRCH) | Err(Errno::ECHILD) => false,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_process_is_alive() {
        assert!(process_alive(std::process::id()));
    }

    #[test]
    fn test_pid_zero_is_not_alive() {
        assert!(!process_alive(0));
    }

    #[test]
    fn test_pid_beyond_i32_is_not_alive() {
        assert!(!process_alive(u32::MAX));
    }

    #[test]
    fn test_unused_pid_is_not_alive() {
        // Far above pid_max on any Linux configuration.
        assert!(!process_alive(i32::MAX as u32));
    }
}
