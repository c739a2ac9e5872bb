//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration required to bootstrap the arena and the text frontend.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub map_path: PathBuf,
    /// Optional TOML file overriding [`game_core::ArenaConfig`] defaults.
    pub arena_config_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub render_interval: Duration,
    /// How long the last frame stays on screen after the game ends.
    pub final_frame_hold: Duration,
    pub session_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from(Self::DEFAULT_MAP),
            arena_config_path: None,
            seed: None,
            render_interval: Duration::from_millis(100),
            final_frame_hold: Duration::from_secs(5),
            session_id: None,
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_MAP: &'static str = "map.txt";

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_MAP` - Map file to load (default: `map.txt`)
    /// - `ARENA_CONFIG` - TOML file with arena tuning (default: built-in values)
    /// - `ARENA_SEED` - Fixed RNG seed (default: derived from the clock)
    /// - `ARENA_RENDER_INTERVAL_MS` - Redraw period (default: 100)
    /// - `ARENA_FINAL_HOLD_MS` - Time the final frame stays up (default: 5000)
    /// - `GAME_SESSION_ID` - Session identifier for log files (default: auto-generated)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("ARENA_MAP") {
            config.map_path = PathBuf::from(path);
        }
        config.arena_config_path = env::var("ARENA_CONFIG").ok().map(PathBuf::from);
        config.seed = read_env::<u64>("ARENA_SEED");

        if let Some(ms) = read_env::<u64>("ARENA_RENDER_INTERVAL_MS") {
            config.render_interval = Duration::from_millis(ms.max(10));
        }
        if let Some(ms) = read_env::<u64>("ARENA_FINAL_HOLD_MS") {
            config.final_frame_hold = Duration::from_millis(ms);
        }

        config.session_id = env::var("GAME_SESSION_ID").ok();

        config
    }

    /// A positional map argument wins over `ARENA_MAP`.
    pub fn with_map_arg(mut self, arg: Option<String>) -> Self {
        if let Some(path) = arg {
            self.map_path = PathBuf::from(path);
        }
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
