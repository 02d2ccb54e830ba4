//! Per-frame session update
//!
//! Advances wave timers and personas while the level is active, then fires
//! any lifecycle actions whose delay has elapsed.

use super::session::Session;
use crate::error::SessionResult;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Kill the player immediately (debug/testing)
    pub forfeit_life: bool,
}

impl Session {
    /// Advance the session by `dt` seconds
    pub fn update(&mut self, dt: f32, input: &TickInput) -> SessionResult<()> {
        let dt = dt.max(0.0);

        if self.state.level_active {
            if input.forfeit_life {
                let player = self.personas.player().cloned();
                self.handle_player_death(player.as_ref())?;
            }
            self.state.tick(dt, &self.waves, &mut self.bus);
            self.personas.update_all(dt);
        }

        let mut due = self.scheduler.advance(dt).into_iter();
        while let Some(action) = due.next() {
            if let Err(e) = self.run_scheduled(action) {
                log::error!("{:?} failed: {}", action, e);
                self.scheduler.requeue(due);
                return Err(e);
            }
        }
        Ok(())
    }
}
