//! Locking subsystem for soloist.
//!
//! Mutual exclusion between independent processes through a shared PID
//! file. The file contains nothing but the decimal PID of the holder:
//!
//! - `lock(path)` refuses the path while the recorded process is alive,
//!   and silently reclaims it when the holder is dead or the content is
//!   not a PID at all.
//! - `unlock()` deletes the file only while it still records this
//!   process's PID, so a lock reclaimed by someone else is never destroyed
//!   from under them.
//!
//! Liveness is probed with signal 0, which works for processes owned by
//! other users as well (`EPERM` still proves existence).

mod liveness;
mod manager;


pub use manager::LockManager;
