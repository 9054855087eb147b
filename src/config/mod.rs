//! Configuration model for soloist.
//!
//! Defines the [`AppConfig`] struct behind the `--config` option and the
//! `<name>.ini` default. Three formats are accepted (ini, json, yaml),
//! all flattened into the same model: a handful of keys the scaffold
//! interprets itself, plus an untouched pass-through map for whatever the
//! application wants to keep in the same file.

mod model;
mod operations;


pub use model::AppConfig;
