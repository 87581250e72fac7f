//! Centralized path resolution for scorehub
//!
//! All file and directory paths are resolved through this module. The service
//! keeps everything under its working directory:
//!
//! ```text
//! ./
//! ├── data/
//! │   └── config.toml
//! └── logs/
//!     └── scorehub_*.log
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Directory holding the configuration file
pub fn data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Directory holding log files
pub fn logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Default configuration file location
pub fn config_file() -> PathBuf {
    data_dir().join("config.toml")
}

/// Create all required directories
///
/// Must run before logger initialization (the logger needs the logs
/// directory to create its file).
pub fn ensure_all_directories() -> Result<()> {
    std::fs::create_dir_all(data_dir())
        .with_context(|| format!("Failed to create {}", data_dir().display()))?;
    std::fs::create_dir_all(logs_dir())
        .with_context(|| format!("Failed to create {}", logs_dir().display()))?;
    Ok(())
}
