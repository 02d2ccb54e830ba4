//! The session: single owner of all level state
//!
//! Constructed explicitly and handed its collaborators; nothing here is global.
//! Lifecycle transitions live in `lifecycle.rs`, collision handling in
//! `collision.rs` and the per-frame driver in `tick.rs`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::actors::{PersonaFactory, PersonaRegistry, PlayerHandle};
use super::events::NotificationBus;
use super::maze::{Maze, MazeSource, MazeVisualizer, SpawnPoints};
use super::schedule::Scheduler;
use super::state::{LevelStage, Phase, SessionState, WaveSchedule};
use crate::error::SessionResult;
use crate::settings::LevelSettings;

pub struct Session {
    pub(crate) settings: LevelSettings,
    pub(crate) waves: WaveSchedule,
    pub(crate) state: SessionState,
    pub(crate) stage: LevelStage,
    pub(crate) bus: NotificationBus,
    pub(crate) scheduler: Scheduler,
    pub(crate) maze_source: Box<dyn MazeSource>,
    pub(crate) visualizer: Option<Box<dyn MazeVisualizer>>,
    pub(crate) factory: Box<dyn PersonaFactory>,
    pub(crate) maze: Option<Maze>,
    pub(crate) spawns: SpawnPoints,
    pub(crate) personas: PersonaRegistry,
    pub(crate) rng: Pcg32,
}

impl Session {
    /// Create an idle session. Call `prepare_level` to build the first level.
    pub fn new(
        settings: LevelSettings,
        maze_source: Box<dyn MazeSource>,
        visualizer: Option<Box<dyn MazeVisualizer>>,
        factory: Box<dyn PersonaFactory>,
    ) -> SessionResult<Self> {
        settings.validate()?;
        Ok(Self {
            waves: WaveSchedule::new(settings.wave_times.clone()),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            state: SessionState::new(),
            stage: LevelStage::Idle,
            bus: NotificationBus::new(),
            scheduler: Scheduler::new(),
            maze_source,
            visualizer,
            factory,
            maze: None,
            spawns: SpawnPoints::default(),
            personas: PersonaRegistry::new(),
        })
    }

    pub fn settings(&self) -> &LevelSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stage(&self) -> LevelStage {
        self.stage
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn lives(&self) -> i32 {
        self.state.lives
    }

    pub fn is_level_active(&self) -> bool {
        self.state.level_active
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.state.current_phase()
    }

    /// Seconds left in the frightened window
    pub fn fright_time(&self) -> f32 {
        self.state.frightened_time_remaining
    }

    /// Subscribe UI observers here
    pub fn bus_mut(&mut self) -> &mut NotificationBus {
        &mut self.bus
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn maze(&self) -> Option<&Maze> {
        self.maze.as_ref()
    }

    pub fn spawn_points(&self) -> &SpawnPoints {
        &self.spawns
    }

    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    pub fn player(&self) -> Option<PlayerHandle> {
        self.personas.player().cloned()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Where an eaten adversary at `position` should re-enter its home
    pub fn home_enter_for(&self, position: Vec2) -> SessionResult<Vec2> {
        self.spawns.nearest_home_enter(position)
    }

    /// Random home spawn for an adversary coming back to life, drawn from the
    /// session's seeded RNG
    pub fn adversary_spawn(&mut self) -> SessionResult<Vec2> {
        self.spawns.random_adversary_spawn(&mut self.rng)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.scheduler.cancel_all();
        self.personas.teardown(&mut self.bus);
    }
}
