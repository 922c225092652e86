// Tick and timing
pub const TICK_INTERVAL_MS: u64 = 100;
pub const TICKS_PER_SECOND: u32 = (1000 / TICK_INTERVAL_MS) as u32;

// Deferred actions
/// Delay before the pre-move lands, also used to pace full-solution playback.
pub const PRE_MOVE_DELAY_TICKS: u32 = 10; // 1s
/// Delay before the automated side answers a correct move.
pub const AUTO_REPLY_DELAY_TICKS: u32 = 5; // 0.5s

// Persistence
pub const DATA_DIR_NAME: &str = ".puzzle_trainer";
pub const SETTINGS_FILENAME: &str = "settings.json";
pub const PROGRESS_FILENAME: &str = "progress.json";
