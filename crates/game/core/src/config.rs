use std::time::Duration;

/// Arena configuration constants and tunable parameters.
///
/// Loaded once at startup and shared read-only by every entity task. Timings
/// are stored in milliseconds so the struct stays a plain TOML table; use the
/// accessor methods to get [`Duration`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArenaConfig {
    /// Number of boxes scattered over empty cells when the arena is populated.
    pub box_count: usize,
    /// Treasures the player must hold to win.
    pub treasures_to_win: u32,

    pub box_relocation_interval_ms: u64,
    /// Pause between opening a box and the start of its blink animation.
    pub box_reveal_delay_ms: u64,
    pub blink_cycles: u32,
    pub blink_interval_ms: u64,

    /// Delay from arena start until the monster becomes active.
    pub monster_spawn_delay_ms: u64,
    pub monster_step_interval_ms: u64,
    /// Spawn cells must be strictly farther than this (Manhattan) from the player.
    pub monster_min_spawn_distance: u32,
    pub monster_spawn_attempts: u32,

    pub guide_step_interval_ms: u64,
    pub guide_hint_duration_ms: u64,

    /// Default lease for status messages.
    pub message_duration_ms: u64,
    pub theft_message_duration_ms: u64,
    /// Lease for the message announcing the end of the game.
    pub final_message_duration_ms: u64,

    /// Upper bound on how long `interact` waits for a box to acknowledge.
    pub rendezvous_timeout_ms: u64,

    /// Fixed RNG seed. `None` seeds from the process start time.
    pub seed: Option<u64>,
}

impl ArenaConfig {
    pub const DEFAULT_BOX_COUNT: usize = 10;
    pub const DEFAULT_TREASURES_TO_WIN: u32 = 4;

    pub fn new() -> Self {
        Self {
            box_count: Self::DEFAULT_BOX_COUNT,
            treasures_to_win: Self::DEFAULT_TREASURES_TO_WIN,
            box_relocation_interval_ms: 20_000,
            box_reveal_delay_ms: 500,
            blink_cycles: 10,
            blink_interval_ms: 100,
            monster_spawn_delay_ms: 30_000,
            monster_step_interval_ms: 2_000,
            monster_min_spawn_distance: 10,
            monster_spawn_attempts: 100,
            guide_step_interval_ms: 500,
            guide_hint_duration_ms: 2_000,
            message_duration_ms: 3_000,
            theft_message_duration_ms: 60_000,
            final_message_duration_ms: 30_000,
            rendezvous_timeout_ms: 2_000,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_box_count(mut self, box_count: usize) -> Self {
        self.box_count = box_count;
        self
    }

    pub fn box_relocation_interval(&self) -> Duration {
        Duration::from_millis(self.box_relocation_interval_ms)
    }

    pub fn box_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.box_reveal_delay_ms)
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }

    /// Total time a triggered box keeps its cell before it disappears.
    pub fn disappearance_window(&self) -> Duration {
        self.box_reveal_delay() + self.blink_interval() * self.blink_cycles
    }

    pub fn monster_spawn_delay(&self) -> Duration {
        Duration::from_millis(self.monster_spawn_delay_ms)
    }

    pub fn monster_step_interval(&self) -> Duration {
        Duration::from_millis(self.monster_step_interval_ms)
    }

    pub fn guide_step_interval(&self) -> Duration {
        Duration::from_millis(self.guide_step_interval_ms)
    }

    pub fn guide_hint_duration(&self) -> Duration {
        Duration::from_millis(self.guide_hint_duration_ms)
    }

    pub fn message_duration(&self) -> Duration {
        Duration::from_millis(self.message_duration_ms)
    }

    pub fn theft_message_duration(&self) -> Duration {
        Duration::from_millis(self.theft_message_duration_ms)
    }

    pub fn final_message_duration(&self) -> Duration {
        Duration::from_millis(self.final_message_duration_ms)
    }

    pub fn rendezvous_timeout(&self) -> Duration {
        Duration::from_millis(self.rendezvous_timeout_ms)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
