//! Optional TOML configuration file, merged over [`ServerConfig::default`].
//!
//! Every field is optional so an empty or partial file is valid; CLI flags
//! (handled in `main`) take precedence over whatever this produces.

use std::time::Duration;

use serde::Deserialize;
use waypoint_core::{KeyTable, ServerConfig};

use crate::error::ServerError;

/// On-disk shape of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Terminator bytes, given as an array (e.g. `[7, 8]`).
    terminator: Option<Vec<u8>>,
    /// Ordered key table.
    keys: Option<KeyTable>,
    /// Per-read inactivity bound, in milliseconds.
    timeout_ms: Option<u64>,
    /// Recharge-wait bound, in milliseconds.
    timeout_recharging_ms: Option<u64>,
    /// Forward-move budget.
    max_steps: Option<u32>,
    /// Cap on failed moves.
    max_obstacle_hits: Option<u32>,
}

impl FileConfig {
    /// Load and parse a TOML file at `path`.
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ServerError::ConfigRead { path: path.to_string(), source })?;
        toml::from_str(&text)
            .map_err(|source| ServerError::ConfigParse { path: path.to_string(), source })
    }

    /// Merge this file's present fields over `base`, returning the result.
    #[must_use]
    pub fn merge_over(self, mut base: ServerConfig) -> ServerConfig {
        if let Some(terminator) = self.terminator {
            base.terminator = terminator;
        }
        if let Some(keys) = self.keys {
            base.keys = keys;
        }
        if let Some(ms) = self.timeout_ms {
            base.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.timeout_recharging_ms {
            base.timeout_recharging = Duration::from_millis(ms);
        }
        if let Some(max_steps) = self.max_steps {
            base.max_steps = max_steps;
        }
        if let Some(max_obstacle_hits) = self.max_obstacle_hits {
            base.max_obstacle_hits = max_obstacle_hits;
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_leaves_defaults_untouched() {
        let file = FileConfig::default();
        let merged = file.merge_over(ServerConfig::default());
        assert_eq!(merged.timeout, ServerConfig::default().timeout);
    }

    #[test]
    fn partial_file_overrides_only_present_fields() {
        let file = FileConfig { max_steps: Some(42), ..FileConfig::default() };
        let merged = file.merge_over(ServerConfig::default());
        assert_eq!(merged.max_steps, 42);
        assert_eq!(merged.max_obstacle_hits, ServerConfig::default().max_obstacle_hits);
    }
}
