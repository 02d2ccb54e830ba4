//! Level session state and wave timers
//!
//! Owns score, lives, the active adversary phase and the frightened timer.
//! Everything here is serializable so a session can be snapshotted.

use serde::{Deserialize, Serialize};

use super::events::NotificationBus;

/// Adversary-wide behaviour mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Adversaries head for their corners
    Scatter,
    /// Adversaries pursue the player
    Chase,
    /// Adversaries are vulnerable after an energizer
    Frightened,
}

impl Phase {
    /// Phase announced when the wave index becomes `index`
    pub fn for_wave(index: i32) -> Self {
        if index % 2 == 0 { Phase::Scatter } else { Phase::Chase }
    }
}

/// Lifecycle stage of the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStage {
    /// Session constructed, no level prepared yet
    Idle,
    /// Personas spawned, waiting for the start delay ("READY!")
    Preparing,
    /// Active gameplay
    Active,
    /// Player caught, waiting for restart or game over
    PlayerDied,
    /// Run ended
    GameOver,
}

/// Ordered Scatter/Chase durations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSchedule {
    durations: Vec<f32>,
}

impl WaveSchedule {
    pub fn new(durations: Vec<f32>) -> Self {
        Self { durations }
    }

    /// Duration of wave `index`; infinite once the schedule is exhausted
    pub fn duration(&self, index: i32) -> f32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.durations.get(i))
            .copied()
            .unwrap_or(f32::INFINITY)
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Score, lives and phase timers for the running level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub lives: i32,
    /// Current wave index (-1 before the first Scatter)
    pub phase_index: i32,
    /// Time left in the current wave (infinite after the last one)
    pub phase_time_remaining: f32,
    /// Time left in the frightened window (0 = not frightened)
    pub frightened_time_remaining: f32,
    /// Adversaries eaten in the current frightened window
    pub combo: u32,
    /// Timers and personas only advance while the level is active
    pub level_active: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            lives: 0,
            phase_index: -1,
            phase_time_remaining: 0.0,
            frightened_time_remaining: 0.0,
            combo: 0,
            level_active: false,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened_time_remaining > 0.0
    }

    /// Phase adversaries are currently following
    pub fn current_phase(&self) -> Option<Phase> {
        if self.is_frightened() {
            Some(Phase::Frightened)
        } else if self.phase_index >= 0 {
            Some(Phase::for_wave(self.phase_index))
        } else {
            None
        }
    }

    /// Rewind to before the first wave; the next tick announces Scatter
    pub fn reset_timers(&mut self) {
        self.frightened_time_remaining = 0.0;
        self.phase_index = -1;
        self.phase_time_remaining = 0.0;
    }

    /// Advance timers by `dt` seconds. Returns the phase announced, if any.
    pub fn tick(&mut self, dt: f32, schedule: &WaveSchedule, bus: &mut NotificationBus) -> Option<Phase> {
        let dt = dt.max(0.0);

        if self.is_frightened() {
            self.frightened_time_remaining = (self.frightened_time_remaining - dt).max(0.0);
            if !self.is_frightened() {
                self.combo = 0;
            }
            return None;
        }

        self.combo = 0;
        self.phase_time_remaining -= dt;
        if self.phase_time_remaining > 0.0 {
            return None;
        }

        self.phase_index += 1;
        // Overshoot carries into the next wave, but never below zero
        self.phase_time_remaining =
            (self.phase_time_remaining + schedule.duration(self.phase_index)).max(0.0);
        let phase = Phase::for_wave(self.phase_index);
        bus.emit_phase(phase);
        Some(phase)
    }

    /// Start (or extend) the frightened window. The wave timer is frozen, not reset.
    pub fn enter_frightened(&mut self, duration: f32, bus: &mut NotificationBus) {
        self.frightened_time_remaining = duration.max(0.0);
        bus.emit_phase(Phase::Frightened);
    }

    pub fn add_score(&mut self, points: u64, bus: &mut NotificationBus) {
        self.score += points;
        bus.emit_score(self.score);
    }

    /// Count an eaten adversary and return the points it is worth
    pub fn register_adversary_eaten(&mut self, base_points: u64) -> u64 {
        self.combo += 1;
        base_points * u64::from(self.combo)
    }
}
