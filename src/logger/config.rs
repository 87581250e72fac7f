/// Logger configuration - filtering rules derived from command-line arguments
///
/// The configuration is initialized once at startup from CMD_ARGS and kept in
/// a global cell so the hot logging path only takes a read lock.
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;

/// Runtime logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level threshold (messages above it are filtered out)
    pub min_level: LogLevel,

    /// Tags with --debug-<module> enabled
    pub debug_tags: HashSet<String>,

    /// Global --verbose flag
    pub verbose: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose: false,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Initialize logger configuration from command-line arguments
///
/// Recognized flags:
/// - `--debug-<module>` enables Debug level for that tag
/// - `--debug-all` enables Debug level for every tag
/// - `--verbose` enables Verbose level globally
/// - `--quiet` raises the threshold to Warning
pub fn init_from_args() {
    let mut config = LoggerConfig::default();

    for tag in LogTag::all() {
        if arguments::has_arg(&format!("--debug-{}", tag.to_debug_key())) {
            config.debug_tags.insert(tag.to_debug_key().to_string());
        }
    }

    if arguments::has_arg("--debug-all") {
        for tag in LogTag::all() {
            config.debug_tags.insert(tag.to_debug_key().to_string());
        }
    }

    if arguments::has_arg("--verbose") {
        config.verbose = true;
        config.min_level = LogLevel::Verbose;
    } else if !config.debug_tags.is_empty() {
        config.min_level = LogLevel::Debug;
    }

    if arguments::has_arg("--quiet") {
        config.min_level = LogLevel::Warning;
    }

    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Get a snapshot of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

/// Check whether Debug level is enabled for a tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG
        .read()
        .map(|c| c.debug_tags.contains(tag.to_debug_key()))
        .unwrap_or(false)
}
