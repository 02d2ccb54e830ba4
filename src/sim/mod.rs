//! Session simulation module
//!
//! All gameplay orchestration lives here. This module is single-threaded and
//! deterministic:
//! - Time advances only through `Session::update`
//! - Seeded RNG only
//! - Events are dispatched synchronously, in subscription order
//! - No rendering or platform dependencies

pub mod actors;
pub mod collision;
pub mod events;
pub mod lifecycle;
pub mod maze;
pub mod schedule;
pub mod session;
pub mod state;
pub mod tick;

#[cfg(test)]
pub(crate) mod test_support;

pub use actors::{
    Adversary, AdversaryHandle, Collided, FoodItem, Persona, PersonaFactory, PersonaRegistry,
    PlayerHandle,
};
pub use collision::CollisionOutcome;
pub use events::{Channel, LevelMessage, NotificationBus, SubscriptionId};
pub use maze::{Cell, CellType, Maze, MazeSource, MazeVisualizer, SpawnKind, SpawnPoints, TextMaze};
pub use schedule::{ScheduledAction, Scheduler};
pub use session::Session;
pub use state::{LevelStage, Phase, SessionState, WaveSchedule};
pub use tick::TickInput;
