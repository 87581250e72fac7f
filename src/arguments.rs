/// Centralized argument handling for scorehub
///
/// Consolidates command-line argument parsing and debug flag checking:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Debug flag checking functions for the subsystems
/// - Unified argument parsing utilities
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
///
/// Thread-safe singleton that stores arguments for access throughout the
/// application.
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
///
/// Used by tests to override the default env::args() collection.
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => {
            // Fallback to env::args if mutex is poisoned
            env::args().collect()
        }
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
///
/// Returns None if the flag is not found or has no value.
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

/// Check if webserver debug mode is enabled
pub fn is_debug_webserver_enabled() -> bool {
    has_arg("--debug-webserver")
}

/// Check if broadcast hub debug mode is enabled
pub fn is_debug_hub_enabled() -> bool {
    has_arg("--debug-hub")
}

/// Check if rate limiter debug mode is enabled
pub fn is_debug_limiter_enabled() -> bool {
    has_arg("--debug-limiter")
}

/// Check if score store debug mode is enabled
pub fn is_debug_store_enabled() -> bool {
    has_arg("--debug-store")
}

// =============================================================================
// COMMON ARGUMENT PATTERNS
// =============================================================================

pub mod patterns {
    use super::has_arg;

    /// Check if help was requested
    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }
}

/// Print usage information
pub fn print_help() {
    println!("scorehub - real-time competitive leaderboard service");
    println!();
    println!("USAGE:");
    println!("    scorehub [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help              Print this help message");
    println!("    --config <PATH>         Config file path (default: data/config.toml)");
    println!("    --quiet                 Only show warnings and errors");
    println!("    --verbose               Show verbose trace output");
    println!("    --debug-all             Enable debug output for every module");
    println!("    --debug-<module>        Enable debug output for one module");
    println!();
    println!("DEBUG MODULES:");
    println!("    system, config, store, limiter, hub, coordinator, webserver");
}
