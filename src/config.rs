//! Trainer settings, read from ~/.puzzle_trainer/settings.json.

use crate::core::constants::{
    AUTO_REPLY_DELAY_TICKS, PRE_MOVE_DELAY_TICKS, SETTINGS_FILENAME, TICK_INTERVAL_MS,
};
use crate::solve::SolveTiming;
use crate::utils::persistence;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub pre_move_delay_ticks: u32,
    pub auto_reply_delay_ticks: u32,
    pub tick_interval_ms: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            pre_move_delay_ticks: PRE_MOVE_DELAY_TICKS,
            auto_reply_delay_ticks: AUTO_REPLY_DELAY_TICKS,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

impl TrainerConfig {
    /// Settings file contents, or defaults if it is missing or malformed.
    pub fn load() -> Self {
        persistence::load_json_or_default(SETTINGS_FILENAME)
    }

    pub fn timing(&self) -> SolveTiming {
        SolveTiming {
            pre_move_delay_ticks: self.pre_move_delay_ticks,
            auto_reply_delay_ticks: self.auto_reply_delay_ticks,
        }
    }

    /// Zero is treated as the default interval.
    pub fn tick_interval(&self) -> Duration {
        let ms = if self.tick_interval_ms == 0 {
            TICK_INTERVAL_MS
        } else {
            self.tick_interval_ms
        };
        Duration::from_millis(ms)
    }
}
