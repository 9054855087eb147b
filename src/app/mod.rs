//! The application scaffold: lifecycle control, termination signals, and
//! the exactly-once teardown they share.
//!
//! [`Lifecycle::start`] performs the construction phase and hands back a
//! ready controller (or the usage text when help was requested);
//! [`Lifecycle::execute`] runs a [`ConsoleApp`] to completion. Teardown is
//! reachable from three places: the normal end of `execute`, the signal
//! watcher thread, and the controller's `Drop`. [`teardown::Teardown`]
//! guarantees it runs once no matter which gets there first.

mod lifecycle;
mod signals;
mod teardown;


pub use lifecycle::{ConsoleApp, Lifecycle, LifecycleState, Started};
