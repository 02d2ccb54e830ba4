//! Collision resolution
//!
//! Turns "the player touched X" into gameplay effects: score, energizer
//! fright, eaten adversaries and player death.

use super::actors::{AdversaryHandle, Collided, FoodItem, PlayerHandle};
use super::maze::{CellType, Maze};
use super::session::Session;
use crate::error::{SessionError, SessionResult};

/// Effect applied by a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Food consumed; `energizer` if it started a frightened window
    FoodEaten { points: u64, energizer: bool },
    /// Frightened adversary eaten at the given combo step
    AdversaryEaten { points: u64, combo: u32 },
    /// The player was caught by an adversary
    PlayerCaught,
    /// Nothing happened (scenery, a dead adversary, or a level that is not active)
    Ignored,
}

impl Session {
    /// Resolve a collision between the controlled actor and `collided`
    pub fn handle_collision(
        &mut self,
        subject: &PlayerHandle,
        collided: &Collided,
    ) -> SessionResult<CollisionOutcome> {
        if let Some(food) = collided.as_food() {
            return self.eat_food(food);
        }
        if let Some(adversary) = collided.as_adversary() {
            return self.meet_adversary(subject, adversary);
        }
        Ok(CollisionOutcome::Ignored)
    }

    fn eat_food(&mut self, food: &FoodItem) -> SessionResult<CollisionOutcome> {
        let maze = self.maze.as_mut().ok_or(SessionError::LevelNotPrepared)?;
        let (x, y) = Maze::cell_at(food.position);
        let energizer = maze.consume(x, y) == CellType::Energizer;

        self.state.add_score(food.points, &mut self.bus);
        if energizer {
            self.state
                .enter_frightened(self.settings.fright_time, &mut self.bus);
        }
        if let (Some(visualizer), Some(maze)) = (self.visualizer.as_mut(), self.maze.as_ref()) {
            visualizer.refresh(maze, food.position);
        }

        log::debug!(
            "Ate food at ({}, {}) for {} points{}",
            x,
            y,
            food.points,
            if energizer { " (energizer)" } else { "" }
        );
        Ok(CollisionOutcome::FoodEaten {
            points: food.points,
            energizer,
        })
    }

    fn meet_adversary(
        &mut self,
        subject: &PlayerHandle,
        adversary: &AdversaryHandle,
    ) -> SessionResult<CollisionOutcome> {
        let (vulnerable, dead, position) = {
            let a = adversary.borrow();
            (a.is_vulnerable(), a.is_dead(), a.position())
        };

        if vulnerable {
            adversary.borrow_mut().die();
            let points = self.state.register_adversary_eaten(self.settings.ghost_points);
            self.state.add_score(points, &mut self.bus);
            self.bus.emit_floating(position, &points.to_string());
            log::debug!("Ate adversary for {} points (combo {})", points, self.state.combo);
            Ok(CollisionOutcome::AdversaryEaten {
                points,
                combo: self.state.combo,
            })
        } else if !dead && self.handle_player_death(Some(subject))? {
            Ok(CollisionOutcome::PlayerCaught)
        } else {
            Ok(CollisionOutcome::Ignored)
        }
    }
}
