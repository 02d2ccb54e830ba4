//! Level lifecycle: prepare, start, player death, restart, game over
//!
//! ```text
//! Idle -> Preparing -(delay)-> Active -> PlayerDied -(delay)-> Preparing -> ...
//!                                        PlayerDied -(delay)-> GameOver
//! ```

use std::rc::Rc;

use super::actors::PlayerHandle;
use super::maze::SpawnPoints;
use super::schedule::ScheduledAction;
use super::session::Session;
use super::state::LevelStage;
use crate::consts::{GAME_OVER_TEXT, READY_TEXT};
use crate::error::{SessionError, SessionResult};

impl Session {
    /// Build the maze, spawn personas, reset lives and queue the level start
    pub fn prepare_level(&mut self) -> SessionResult<()> {
        log::info!("Preparing level");
        self.scheduler.cancel_all();
        self.state.level_active = false;

        self.create_map()?;
        self.state.reset_timers();
        self.spawn_personas()?;
        self.state.lives = self.settings.starting_lives;

        self.bus.emit_lives(self.state.lives);
        self.bus
            .emit_message(self.settings.message_position, READY_TEXT);

        self.stage = LevelStage::Preparing;
        self.scheduler
            .schedule(ScheduledAction::StartLevel, self.settings.transition_delay)
    }

    /// Activate the level and clear the banner
    pub fn start_level(&mut self) {
        log::info!("Level started");
        self.state.level_active = true;
        self.stage = LevelStage::Active;
        self.bus.emit_message(self.settings.message_position, "");
    }

    /// Kill the player and queue either a restart or game over.
    ///
    /// Returns whether the death was applied. `None` is ignored, as is a
    /// death while the level is not active or for a player from an earlier
    /// spawn.
    pub fn handle_player_death(&mut self, actor: Option<&PlayerHandle>) -> SessionResult<bool> {
        let Some(actor) = actor else {
            log::trace!("Ignoring death request without an actor");
            return Ok(false);
        };
        if !self.state.level_active {
            log::trace!("Ignoring death request while level inactive ({:?})", self.stage);
            return Ok(false);
        }
        if !self.personas.player().is_some_and(|p| Rc::ptr_eq(p, actor)) {
            log::warn!("Ignoring death request for a despawned player");
            return Ok(false);
        }

        let lives = self.state.lives - 1;
        let next = if lives < 0 {
            ScheduledAction::GameOver
        } else {
            ScheduledAction::RestartLevel
        };
        if self.scheduler.is_pending(next) {
            return Err(SessionError::SchedulingConflict(next));
        }

        actor.borrow_mut().die();
        self.state.level_active = false;
        self.state.lives = lives;
        self.stage = LevelStage::PlayerDied;
        log::info!("Player died, {} lives left", lives);

        if next == ScheduledAction::RestartLevel {
            self.bus.emit_lives(lives);
        }
        self.scheduler.schedule(next, self.settings.transition_delay)?;
        Ok(true)
    }

    /// Respawn personas on the existing maze and queue the level start
    pub fn restart_level(&mut self) -> SessionResult<()> {
        if self.scheduler.is_pending(ScheduledAction::StartLevel) {
            return Err(SessionError::SchedulingConflict(ScheduledAction::StartLevel));
        }
        log::info!("Restarting level");
        self.spawn_personas()?;
        self.state.reset_timers();
        self.bus
            .emit_message(self.settings.message_position, READY_TEXT);

        self.stage = LevelStage::Preparing;
        self.scheduler
            .schedule(ScheduledAction::StartLevel, self.settings.transition_delay)
    }

    /// End the run
    pub fn game_over(&mut self) {
        log::info!("Game over, final score {}", self.state.score);
        self.state.level_active = false;
        self.stage = LevelStage::GameOver;
        self.bus
            .emit_message(self.settings.message_position, GAME_OVER_TEXT);
    }

    pub(crate) fn run_scheduled(&mut self, action: ScheduledAction) -> SessionResult<()> {
        match action {
            ScheduledAction::StartLevel => {
                self.start_level();
                Ok(())
            }
            ScheduledAction::RestartLevel => self.restart_level(),
            ScheduledAction::GameOver => {
                self.game_over();
                Ok(())
            }
        }
    }

    fn create_map(&mut self) -> SessionResult<()> {
        let maze = self.maze_source.get_map();
        if maze.is_empty() {
            return Err(SessionError::InvalidLayout(format!(
                "maze source returned a {}x{} maze",
                maze.size_x(),
                maze.size_y()
            )));
        }
        match self.visualizer.as_mut() {
            Some(visualizer) => {
                visualizer.create_or_refresh(&maze);
                self.spawns = SpawnPoints::extract(&maze);
            }
            None => {
                log::warn!("No maze visualizer; spawn points not extracted");
                self.spawns = SpawnPoints::default();
            }
        }
        self.maze = Some(maze);
        Ok(())
    }

    fn spawn_personas(&mut self) -> SessionResult<()> {
        self.personas.respawn(
            self.factory.as_mut(),
            &self.spawns,
            &mut self.bus,
            &mut self.rng,
            self.settings.adversary_count,
            self.settings.home_hint,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::consts::*;
    use crate::error::SessionError;
    use crate::settings::LevelSettings;
    use glam::Vec2;

    use crate::sim::maze::{Maze, MazeSource, SpawnKind, TextMaze};
    use crate::sim::test_support::{
        CountingVisualizer, RecordingFactory, TestPlayer, TEST_LAYOUT,
    };
    use crate::sim::{
        Collided, FoodItem, LevelMessage, LevelStage, PlayerHandle, ScheduledAction, Session,
        TickInput,
    };

    struct Harness {
        session: Session,
        factory: RecordingFactory,
        lives: Rc<RefCell<Vec<i32>>>,
        messages: Rc<RefCell<Vec<LevelMessage>>>,
    }

    fn harness() -> Harness {
        let factory = RecordingFactory::default();
        let mut session = Session::new(
            LevelSettings::default(),
            Box::new(TextMaze::parse(TEST_LAYOUT).unwrap()),
            Some(Box::new(CountingVisualizer::default())),
            Box::new(factory.clone()),
        )
        .unwrap();

        let lives = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lives);
        session.bus_mut().lives.subscribe(move |l| sink.borrow_mut().push(*l));
        let messages = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&messages);
        session
            .bus_mut()
            .message
            .subscribe(move |m: &LevelMessage| sink.borrow_mut().push(m.clone()));

        Harness {
            session,
            factory,
            lives,
            messages,
        }
    }

    fn wait(session: &mut Session, seconds: f32) {
        let steps = (seconds / SIM_DT).ceil() as u32;
        for _ in 0..steps {
            session.update(SIM_DT, &TickInput::default()).unwrap();
        }
    }

    fn kill_player(session: &mut Session) {
        let player = session.player();
        session.handle_player_death(player.as_ref()).unwrap();
    }

    #[test]
    fn test_prepare_then_start_after_delay() {
        let mut h = harness();
        h.session.prepare_level().unwrap();

        assert_eq!(h.session.stage(), LevelStage::Preparing);
        assert_eq!(h.session.lives(), STARTING_LIVES);
        assert!(!h.session.is_level_active());
        assert_eq!(*h.lives.borrow(), vec![2]);
        assert_eq!(h.messages.borrow()[0].text, READY_TEXT);
        assert_eq!(h.session.personas().adversary_count(), DEFAULT_ADVERSARY_COUNT);

        wait(&mut h.session, 2.9);
        assert!(!h.session.is_level_active());
        wait(&mut h.session, 0.2);
        assert!(h.session.is_level_active());
        assert_eq!(h.session.stage(), LevelStage::Active);
        assert_eq!(h.messages.borrow().last().unwrap().text, "");
    }

    #[test]
    fn test_lives_scenario_ends_in_game_over() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        wait(&mut h.session, 3.1);

        kill_player(&mut h.session);
        assert_eq!(h.session.lives(), 1);
        assert_eq!(*h.lives.borrow(), vec![2, 1]);
        assert!(h.session.scheduler().is_pending(ScheduledAction::RestartLevel));

        wait(&mut h.session, 6.1);
        assert!(h.session.is_level_active());
        kill_player(&mut h.session);
        assert_eq!(h.session.lives(), 0);
        assert_eq!(*h.lives.borrow(), vec![2, 1, 0]);
        assert!(h.session.scheduler().is_pending(ScheduledAction::RestartLevel));

        wait(&mut h.session, 6.1);
        kill_player(&mut h.session);
        assert_eq!(h.session.lives(), -1);
        assert_eq!(*h.lives.borrow(), vec![2, 1, 0], "no lives event on the final death");
        assert!(h.session.scheduler().is_pending(ScheduledAction::GameOver));
        assert!(!h.session.scheduler().is_pending(ScheduledAction::RestartLevel));

        wait(&mut h.session, 3.1);
        assert_eq!(h.session.stage(), LevelStage::GameOver);
        assert_eq!(h.messages.borrow().last().unwrap().text, GAME_OVER_TEXT);

        // Nothing restarts the level after game over
        wait(&mut h.session, 10.0);
        assert_eq!(h.session.stage(), LevelStage::GameOver);
        assert!(!h.session.is_level_active());
        assert_eq!(h.factory.players().len(), 3);
    }

    #[test]
    fn test_each_death_kills_the_actor_once() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        wait(&mut h.session, 3.1);

        let player = h.factory.last_player();
        kill_player(&mut h.session);
        kill_player(&mut h.session);
        assert_eq!(player.borrow().deaths, 1);
        assert_eq!(h.session.lives(), 1, "second request while inactive is ignored");
    }

    #[test]
    fn test_null_actor_is_ignored() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        wait(&mut h.session, 3.1);

        h.session.handle_player_death(None).unwrap();
        assert_eq!(h.session.lives(), 2);
        assert!(h.session.is_level_active());
    }

    #[test]
    fn test_restarts_never_leak_subscriptions() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        let baseline = h.session.bus().phase.subscriber_count();
        assert_eq!(baseline, DEFAULT_ADVERSARY_COUNT);

        for _ in 0..10 {
            h.session.scheduler.cancel_all();
            h.session.restart_level().unwrap();
            assert_eq!(h.session.bus().phase.subscriber_count(), baseline);
        }
        assert_eq!(h.factory.live_adversaries().len(), DEFAULT_ADVERSARY_COUNT);
        assert_eq!(h.factory.adversaries().len(), DEFAULT_ADVERSARY_COUNT * 11);
    }

    #[test]
    fn test_restart_keeps_lives_and_maze() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        wait(&mut h.session, 3.1);
        let food_before = h.session.maze().unwrap().remaining_food();
        h.session.maze.as_mut().unwrap().consume(2, 1);

        kill_player(&mut h.session);
        wait(&mut h.session, 3.1);
        assert_eq!(h.session.stage(), LevelStage::Preparing);
        assert_eq!(h.session.lives(), 1);
        assert_eq!(h.session.maze().unwrap().remaining_food(), food_before - 1);
        assert_eq!(h.session.state().phase_index, -1);
    }

    #[test]
    fn test_prepare_resets_after_game_over() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        h.session.game_over();
        h.session.prepare_level().unwrap();
        assert_eq!(h.session.stage(), LevelStage::Preparing);
        assert_eq!(h.session.lives(), STARTING_LIVES);
        assert_eq!(h.session.scheduler().pending_count(), 1);
    }

    #[test]
    fn test_overlapping_schedule_surfaces_conflict() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        let spawned = h.factory.adversaries().len();
        let messages = h.messages.borrow().len();

        assert_eq!(
            h.session.restart_level(),
            Err(SessionError::SchedulingConflict(ScheduledAction::StartLevel))
        );
        assert_eq!(h.factory.adversaries().len(), spawned);
        assert_eq!(h.factory.live_adversaries().len(), DEFAULT_ADVERSARY_COUNT);
        assert_eq!(h.messages.borrow().len(), messages);
        assert_eq!(h.session.stage(), LevelStage::Preparing);
    }

    #[test]
    fn test_death_conflict_leaves_player_alive() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        wait(&mut h.session, 3.1);
        h.session
            .scheduler
            .schedule(ScheduledAction::RestartLevel, 10.0)
            .unwrap();

        let player = h.session.player();
        assert_eq!(
            h.session.handle_player_death(player.as_ref()),
            Err(SessionError::SchedulingConflict(ScheduledAction::RestartLevel))
        );
        assert_eq!(h.session.lives(), STARTING_LIVES);
        assert_eq!(*h.lives.borrow(), vec![2]);
        assert_eq!(h.factory.last_player().borrow().deaths, 0);
        assert!(h.session.is_level_active());
    }

    #[test]
    fn test_stale_player_handle_is_ignored() {
        let mut h = harness();
        h.session.prepare_level().unwrap();
        wait(&mut h.session, 3.1);

        let first = h.session.player();
        assert_eq!(h.session.handle_player_death(first.as_ref()), Ok(true));
        wait(&mut h.session, 6.1);
        assert!(h.session.is_level_active());

        assert_eq!(h.session.handle_player_death(first.as_ref()), Ok(false));
        assert_eq!(h.session.lives(), 1);
        assert!(h.session.is_level_active());
        assert_eq!(h.factory.players()[0].borrow().deaths, 1);
    }

    #[test]
    fn test_restart_cycles_keep_subscriber_count() {
        let settings = LevelSettings {
            starting_lives: 5,
            ..Default::default()
        };
        let factory = RecordingFactory::default();
        let mut session = Session::new(
            settings,
            Box::new(TextMaze::parse(TEST_LAYOUT).unwrap()),
            Some(Box::new(CountingVisualizer::default())),
            Box::new(factory.clone()),
        )
        .unwrap();
        session.prepare_level().unwrap();
        wait(&mut session, 3.1);

        for cycle in 1..=5 {
            kill_player(&mut session);
            wait(&mut session, 3.1);
            assert_eq!(session.stage(), LevelStage::Preparing, "cycle {cycle}");
            assert_eq!(
                session.bus().phase.subscriber_count(),
                DEFAULT_ADVERSARY_COUNT,
                "cycle {cycle}"
            );
            wait(&mut session, 3.1);
            assert!(session.is_level_active(), "cycle {cycle}");
        }
        assert_eq!(session.lives(), 0);
        assert_eq!(factory.live_adversaries().len(), DEFAULT_ADVERSARY_COUNT);
        assert_eq!(factory.adversaries().len(), DEFAULT_ADVERSARY_COUNT * 6);
    }

    #[test]
    fn test_empty_maze_fails_at_startup() {
        struct EmptySource;
        impl MazeSource for EmptySource {
            fn get_map(&mut self) -> Maze {
                Maze::new(0, 0)
            }
        }

        let mut session = Session::new(
            LevelSettings::default(),
            Box::new(EmptySource),
            Some(Box::new(CountingVisualizer::default())),
            Box::new(RecordingFactory::default()),
        )
        .unwrap();
        assert!(matches!(
            session.prepare_level(),
            Err(SessionError::InvalidLayout(_))
        ));
        assert!(session.maze().is_none());

        let stray: PlayerHandle = Rc::new(RefCell::new(TestPlayer::default()));
        let food = Collided::Food(FoodItem {
            position: Vec2::new(0.5, 0.5),
            points: 10,
        });
        assert_eq!(
            session.handle_collision(&stray, &food),
            Err(SessionError::LevelNotPrepared)
        );
    }

    #[test]
    fn test_missing_visualizer_fails_at_startup() {
        let mut session = Session::new(
            LevelSettings::default(),
            Box::new(TextMaze::parse(TEST_LAYOUT).unwrap()),
            None,
            Box::new(RecordingFactory::default()),
        )
        .unwrap();

        assert_eq!(
            session.prepare_level(),
            Err(SessionError::EmptySpawnSet(SpawnKind::Player))
        );
        assert!(session.spawn_points().is_empty());
        assert!(session.maze().is_some());
        assert_eq!(session.stage(), LevelStage::Idle);
    }

    #[test]
    fn test_layout_without_ghost_home_fails_at_startup() {
        let mut session = Session::new(
            LevelSettings::default(),
            Box::new(TextMaze::parse("#####\n#.P.#\n#####\n").unwrap()),
            Some(Box::new(CountingVisualizer::default())),
            Box::new(RecordingFactory::default()),
        )
        .unwrap();
        assert_eq!(
            session.prepare_level(),
            Err(SessionError::EmptySpawnSet(SpawnKind::Adversary))
        );
    }

    #[test]
    fn test_visualizer_rebuilt_on_prepare_only() {
        let visualizer = CountingVisualizer::default();
        let rebuilds = Rc::clone(&visualizer.rebuilds);
        let mut session = Session::new(
            LevelSettings::default(),
            Box::new(TextMaze::parse(TEST_LAYOUT).unwrap()),
            Some(Box::new(visualizer)),
            Box::new(RecordingFactory::default()),
        )
        .unwrap();

        session.prepare_level().unwrap();
        wait(&mut session, 3.1);
        kill_player(&mut session);
        wait(&mut session, 3.1);
        assert_eq!(*rebuilds.borrow(), 1);
    }
}
