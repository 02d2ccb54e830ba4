//! Recording personas and collaborators shared by the session tests

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::actors::{Adversary, AdversaryHandle, Persona, PersonaFactory, PlayerHandle};
use super::maze::{Maze, MazeVisualizer};
use super::state::Phase;

pub const TEST_LAYOUT: &str = "\
###########
#o...P...o#
#.###H###.#
#.#GGGGG#.#
#.........#
###########
";

#[derive(Debug, Default)]
pub struct TestPlayer {
    pub position: Vec2,
    pub deaths: u32,
    pub updates: u32,
    pub despawned: bool,
}

impl Persona for TestPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn die(&mut self) {
        self.deaths += 1;
    }

    fn on_update(&mut self, _dt: f32) {
        self.updates += 1;
    }

    fn despawn(&mut self) {
        self.despawned = true;
    }
}

#[derive(Debug, Default)]
pub struct TestAdversary {
    pub name: String,
    pub position: Vec2,
    pub spawn: Vec2,
    pub home_hint: Vec2,
    pub has_target: bool,
    pub phases: Vec<Phase>,
    pub dead: bool,
    pub vulnerable: bool,
    pub updates: u32,
    pub despawned: bool,
}

impl Persona for TestAdversary {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn die(&mut self) {
        self.dead = true;
        self.vulnerable = false;
    }

    fn on_update(&mut self, _dt: f32) {
        self.updates += 1;
    }

    fn despawn(&mut self) {
        self.despawned = true;
    }
}

impl Adversary for TestAdversary {
    fn is_dead(&self) -> bool {
        self.dead
    }

    fn is_vulnerable(&self) -> bool {
        self.vulnerable
    }

    fn set_data(&mut self, _target: PlayerHandle, spawn: Vec2, home_hint: Vec2) {
        self.has_target = true;
        self.spawn = spawn;
        self.home_hint = home_hint;
    }

    fn on_phase_change(&mut self, phase: Phase) {
        if phase == Phase::Frightened && !self.dead {
            self.vulnerable = true;
        }
        self.phases.push(phase);
    }
}

type Shared<T> = Rc<RefCell<Vec<Rc<RefCell<T>>>>>;

/// Factory keeping concrete handles to everything it spawned. Clones share
/// the same records, so a test can keep one after boxing the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingFactory {
    players: Shared<TestPlayer>,
    adversaries: Shared<TestAdversary>,
}

impl RecordingFactory {
    pub fn players(&self) -> Vec<Rc<RefCell<TestPlayer>>> {
        self.players.borrow().clone()
    }

    pub fn adversaries(&self) -> Vec<Rc<RefCell<TestAdversary>>> {
        self.adversaries.borrow().clone()
    }

    pub fn last_player(&self) -> Rc<RefCell<TestPlayer>> {
        Rc::clone(self.players.borrow().last().expect("no player spawned"))
    }

    /// Adversaries of the most recent spawn generation
    pub fn live_adversaries(&self) -> Vec<Rc<RefCell<TestAdversary>>> {
        self.adversaries()
            .into_iter()
            .filter(|a| !a.borrow().despawned)
            .collect()
    }
}

impl PersonaFactory for RecordingFactory {
    fn spawn_player(&mut self, position: Vec2) -> PlayerHandle {
        let player = Rc::new(RefCell::new(TestPlayer {
            position,
            ..Default::default()
        }));
        self.players.borrow_mut().push(Rc::clone(&player));
        player
    }

    fn spawn_adversary(&mut self, name: &str, position: Vec2) -> AdversaryHandle {
        let adversary = Rc::new(RefCell::new(TestAdversary {
            name: name.to_string(),
            position,
            ..Default::default()
        }));
        self.adversaries.borrow_mut().push(Rc::clone(&adversary));
        adversary
    }
}

/// Visualizer counting its calls
#[derive(Debug, Default, Clone)]
pub struct CountingVisualizer {
    pub rebuilds: Rc<RefCell<u32>>,
    pub refreshed: Rc<RefCell<Vec<Vec2>>>,
}

impl MazeVisualizer for CountingVisualizer {
    fn create_or_refresh(&mut self, _maze: &Maze) {
        *self.rebuilds.borrow_mut() += 1;
    }

    fn refresh(&mut self, _maze: &Maze, position: Vec2) {
        self.refreshed.borrow_mut().push(position);
    }
}
