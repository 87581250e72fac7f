/// Configuration utilities - loading, reloading, and access helpers
///
/// - Loading configuration from disk (TOML, defaults when absent)
/// - Hot-reloading and runtime mutation
/// - Thread-safe access helpers
use once_cell::sync::OnceCell;
use std::sync::RwLock;

use super::schemas::Config;
use crate::paths;

/// Global configuration instance
///
/// Single source of truth for all configuration values. Access it through
/// the helper functions below.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Load configuration from the default path and initialize the global CONFIG
///
/// Should be called once at startup. If the config file doesn't exist, the
/// schema defaults are used.
pub fn load_config() -> Result<(), String> {
    let path = paths::config_file();
    load_config_from_path(&path.to_string_lossy())
}

/// Load configuration from a specific file path
pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let config = if std::path::Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

        toml::from_str::<Config>(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))?
    } else {
        Config::default()
    };

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(())
}

/// Reload configuration from a specific file path
///
/// Allows hot-reloading configuration changes without a restart. The
/// configuration is atomically replaced, so reads stay consistent.
pub fn reload_config_from_path(path: &str) -> Result<(), String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

    let new_config = toml::from_str::<Config>(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))?;

    if let Some(config_lock) = CONFIG.get() {
        let mut config = config_lock
            .write()
            .map_err(|e| format!("Failed to acquire config write lock: {}", e))?;
        *config = new_config;
        Ok(())
    } else {
        Err("Config not initialized. Call load_config() first.".to_string())
    }
}

/// Execute a function with read access to the configuration
///
/// This is the recommended way to read configuration values.
///
/// # Example
/// ```no_run
/// use scorehub::config::with_config;
///
/// let top = with_config(|cfg| cfg.leaderboard.top_count);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    let config_lock = CONFIG
        .get()
        .expect("Config not initialized. Call load_config() first.");

    let config = config_lock
        .read()
        .expect("Failed to acquire config read lock");

    f(&config)
}

/// Execute a function with write access to the configuration
///
/// Runtime mutation helper; changes take effect for all reads issued after
/// the call returns. Use save_config() to persist them.
pub fn update_config<F>(f: F)
where
    F: FnOnce(&mut Config),
{
    let config_lock = CONFIG
        .get()
        .expect("Config not initialized. Call load_config() first.");

    let mut config = config_lock
        .write()
        .expect("Failed to acquire config write lock");

    f(&mut config);
}

/// Get a clone of the entire configuration
///
/// Useful when config values must be held across await points.
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

/// Save the current configuration to disk
pub fn save_config(path: Option<&str>) -> Result<(), String> {
    let default_path = paths::config_file();
    let path = path
        .map(|p| p.to_string())
        .unwrap_or_else(|| default_path.to_string_lossy().to_string());

    let config_str = with_config(|cfg| {
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))
    })?;

    std::fs::write(&path, config_str)
        .map_err(|e| format!("Failed to write config file '{}': {}", path, e))?;

    Ok(())
}

/// Initialize the global CONFIG with defaults when no file has been loaded
///
/// Safe to call more than once; later calls are no-ops. Used by tests and
/// by code paths that may run before main() finishes startup.
pub fn ensure_loaded() {
    let _ = CONFIG.set(RwLock::new(Config::default()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.server.port, 3000);
        assert_eq!(parsed.rate_limit.window_ms, 1000);
        assert_eq!(parsed.rate_limit.max_weight, 10);
        assert_eq!(parsed.leaderboard.top_count, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rate_limit]\nwindow_ms = 250\n").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Config = toml::from_str(&contents).unwrap();

        assert_eq!(parsed.rate_limit.window_ms, 250);
        // Untouched sections keep schema defaults
        assert_eq!(parsed.rate_limit.max_weight, 10);
        assert_eq!(parsed.server.host, "127.0.0.1");
    }
}
