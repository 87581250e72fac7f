/// Configuration system for scorehub
///
/// - `macros`: the config_struct! macro (struct + defaults + serde in one place)
/// - `schemas`: all configuration sections defined with the macro
/// - `utils`: global CONFIG cell, loading, hot-reload and access helpers

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::*;
pub use utils::{
    ensure_loaded, get_config_clone, load_config, load_config_from_path, reload_config_from_path,
    save_config, update_config, with_config,
};
