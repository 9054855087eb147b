//! AppConfig struct definition, defaults, and path resolution.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SoloistError};

/// Configuration for a console application.
///
/// External spellings are camelCase (`oneInstanceOnly`, `lockDir`, ...).
/// Keys the scaffold does not recognize are carried in `extra` untouched
/// and readable through [`AppConfig::get`], so an application can keep its
/// own settings in the same file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Refuse to start while another live instance holds the lock file.
    pub one_instance_only: bool,

    /// Refuse to start when the process is not attached to a console.
    pub console_only: bool,

    /// Explicit lock file path; takes precedence over `lock_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,

    /// Directory to place the default `<name>.lock` file in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_dir: Option<PathBuf>,

    /// Explicit log file path; takes precedence over `log_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Directory to place the default `<name>.log` file in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Application-defined keys, passed through unmodified.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            one_instance_only: true,
            console_only: true,
            lock_file: None,
            lock_dir: None,
            log_file: None,
            log_dir: None,
            extra: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Looks up an application-defined key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Resolves the lock file path for the given application name.
    ///
    /// An explicit `lockFile` wins; otherwise `<name>.lock` is placed in
    /// `lockDir` or, when that is unset, the system temp directory.
    pub fn lock_file_path(&self, app_name: &str) -> Result<PathBuf> {
        match &self.lock_file {
            Some(path) => Ok(path.clone()),
            None => scratch_file(self.lock_dir.as_deref(), &format!("{app_name}.lock")),
        }
    }

    /// Resolves the log file path for the given application name.
    ///
    /// An explicit `logFile` wins; otherwise `<name>.log` is placed in
    /// `logDir` or, when that is unset, the system temp directory.
    pub fn log_file_path(&self, app_name: &str) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => scratch_file(self.log_dir.as_deref(), &format!("{app_name}.log")),
        }
    }
}

/// Builds `<dir>/<file_name>`, defaulting the directory to the system temp
/// dir. A configured directory must already exist and is canonicalized so
/// relative overrides behave predictably.
fn scratch_file(dir: Option<&Path>, file_name: &str) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(SoloistError::DirectoryNotFound {
                    path: dir.to_path_buf(),
                });
            }
            dir.canonicalize()
                .map_err(|_| SoloistError::DirectoryNotFound {
                    path: dir.to_path_buf(),
                })?
        }
        None => env::temp_dir(),
    };
    Ok(dir.join(file_name))
}
