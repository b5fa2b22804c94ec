//! Persisted bot state
//!
//! A single small JSON file holds the mention watermark so a restart does
//! not re-answer old mentions. Loading never fails: a missing, unreadable,
//! or malformed file degrades to the empty state with a warning.

use magpie_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// State persisted across restarts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotState {
    /// Identifier of the most recently answered mention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_mention_id: Option<String>,
}

impl BotState {
    /// Load state from `path`, degrading to the default on any problem
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read state file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!("State file {} is malformed: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save state to `path`
    ///
    /// Failures are returned for the caller to log; a failed save must
    /// never stop the loop.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
