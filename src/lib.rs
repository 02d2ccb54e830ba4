//! Maze Chase - session controller for an arcade maze-chase game
//!
//! Core modules:
//! - `sim`: Level session (wave timers, scoring, lives), collision resolution,
//!   lifecycle sequencing and the notification bus
//! - `settings`: Data-driven level tuning
//! - `error`: Session error types

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SessionError, SessionResult};
pub use settings::LevelSettings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the demo driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default Scatter/Chase wave durations (seconds)
    pub const DEFAULT_WAVE_TIMES: [f32; 7] = [7.0, 20.0, 7.0, 20.0, 5.0, 20.0, 5.0];
    /// Default frightened duration after an energizer (seconds)
    pub const DEFAULT_FRIGHT_TIME: f32 = 6.0;
    /// Base points for eating a frightened adversary (multiplied by combo)
    pub const GHOST_POINTS: u64 = 200;

    /// Lives at level preparation
    pub const STARTING_LIVES: i32 = 2;
    /// Delay between lifecycle transitions (seconds)
    pub const TRANSITION_DELAY: f32 = 3.0;
    pub const DEFAULT_ADVERSARY_COUNT: usize = 3;

    pub const READY_TEXT: &str = "READY!";
    pub const GAME_OVER_TEXT: &str = "GAME OVER";
}
