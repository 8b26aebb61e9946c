//! Process-level engine configuration.

use std::env;
use std::str::FromStr;

use log::warn;

use crate::search::TimeConfig;

/// Search thread stack size (32 MB)
pub const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Default iteration cap when `go` names no depth
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Identity strings and search defaults for one engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Reported on the `name` line of the `uci` reply
    pub name: String,
    /// Reported on the `author` line of the `uci` reply
    pub author: String,
    pub time: TimeConfig,
    pub max_depth: u32,
    pub search_stack_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            name: "toy-chess".to_string(),
            author: "hiro18181".to_string(),
            time: TimeConfig::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            search_stack_size: SEARCH_STACK_SIZE,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `TOY_CHESS_MOVE_OVERHEAD` (ms) and `TOY_CHESS_MAX_DEPTH`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = EngineConfig::default();
        if let Some(overhead) = env_value("TOY_CHESS_MOVE_OVERHEAD") {
            config.time.move_overhead_ms = overhead;
        }
        if let Some(depth) = env_value::<u32>("TOY_CHESS_MAX_DEPTH") {
            config.max_depth = depth.max(1);
        }
        config
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}
