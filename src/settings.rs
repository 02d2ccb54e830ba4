//! Level settings
//!
//! Wave timing, scoring and lifecycle tuning. Loaded from JSON so levels can be
//! rebalanced without a rebuild.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SessionError, SessionResult};

/// Level tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    // === Waves ===
    /// Scatter/Chase durations in seconds (even index = Scatter, odd = Chase)
    pub wave_times: Vec<f32>,
    /// Frightened duration after an energizer is eaten
    pub fright_time: f32,

    // === Scoring ===
    /// Points for the first adversary eaten in a frightened window
    pub ghost_points: u64,

    // === Lifecycle ===
    /// Lives granted by `prepare_level`
    pub starting_lives: i32,
    /// Delay before start/restart/game-over transitions fire
    pub transition_delay: f32,
    /// Adversaries spawned per level
    pub adversary_count: usize,
    /// Where the READY!/GAME OVER message is shown
    pub message_position: Vec2,
    /// Direction hint handed to adversaries for re-entering their home
    pub home_hint: Vec2,

    /// RNG seed for spawn selection
    pub seed: u64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            wave_times: DEFAULT_WAVE_TIMES.to_vec(),
            fright_time: DEFAULT_FRIGHT_TIME,

            ghost_points: GHOST_POINTS,

            starting_lives: STARTING_LIVES,
            transition_delay: TRANSITION_DELAY,
            adversary_count: DEFAULT_ADVERSARY_COUNT,
            message_position: Vec2::new(14.0, 15.5),
            home_hint: Vec2::new(1.0, 1.0),

            seed: 0,
        }
    }
}

impl LevelSettings {
    /// Parse settings from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> SessionResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| SessionError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> SessionResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SessionError::InvalidSettings(e.to_string()))
    }

    /// Load settings from a JSON file
    pub fn load(path: &str) -> SessionResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SessionError::SettingsIo {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded level settings from {}", path);
        Ok(settings)
    }

    /// Reject durations that would break the timers
    pub fn validate(&self) -> SessionResult<()> {
        if let Some((i, t)) = self
            .wave_times
            .iter()
            .enumerate()
            .find(|(_, t)| !t.is_finite() || **t < 0.0)
        {
            return Err(SessionError::InvalidSettings(format!(
                "wave_times[{}] = {} must be finite and non-negative",
                i, t
            )));
        }
        if !self.fright_time.is_finite() || self.fright_time < 0.0 {
            return Err(SessionError::InvalidSettings(format!(
                "fright_time = {} must be finite and non-negative",
                self.fright_time
            )));
        }
        if !self.transition_delay.is_finite() || self.transition_delay < 0.0 {
            return Err(SessionError::InvalidSettings(format!(
                "transition_delay = {} must be finite and non-negative",
                self.transition_delay
            )));
        }
        if self.starting_lives < 0 {
            return Err(SessionError::InvalidSettings(format!(
                "starting_lives = {} must not be negative",
                self.starting_lives
            )));
        }
        Ok(())
    }
}
