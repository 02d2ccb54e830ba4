//! Maze Chase headless demo
//!
//! Runs a scripted session against a built-in maze and logs every event.
//! Usage: `maze-chase [settings.json]` (set `RUST_LOG=debug` for more detail).

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use maze_chase::consts::*;
use maze_chase::sim::{
    Adversary, AdversaryHandle, CellType, Collided, FoodItem, LevelMessage, LevelStage, Maze,
    MazeVisualizer, Persona, PersonaFactory, Phase, PlayerHandle, Session, TextMaze, TickInput,
};
use maze_chase::{LevelSettings, SessionResult};

const DEMO_LAYOUT: &str = "\
############################
#o...........##...........o#
#.####.#####.##.#####.####.#
#..........................#
#.####.##.########.##.####.#
#......##....##....##......#
######.#####.##.#####.######
     #.##....H.....##.#
######.##.###GG###.##.######
      ....#GGGGGG#....
######.##.########.##.######
#............P.............#
#.####.#####.##.#####.####.#
#o..##................##..o#
############################
";

const FOOD_POINTS: u64 = 10;
const ENERGIZER_POINTS: u64 = 50;
/// Seconds between scripted collisions
const SCRIPT_INTERVAL: f32 = 0.4;
/// Every n-th scripted collision is with an adversary
const ADVERSARY_EVERY: u32 = 9;
const MAX_DEMO_SECONDS: f32 = 300.0;
const GHOST_RESPAWN_SECONDS: f32 = 2.0;

struct DemoPlayer {
    position: Vec2,
}

impl Persona for DemoPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn die(&mut self) {
        log::info!("Player caught at {}", self.position);
    }
}

struct DemoGhost {
    name: String,
    position: Vec2,
    spawn: Vec2,
    fright_left: f32,
    dead_for: Option<f32>,
}

impl Persona for DemoGhost {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn die(&mut self) {
        log::info!("{} eaten", self.name);
        self.fright_left = 0.0;
        self.dead_for = Some(0.0);
    }

    fn on_update(&mut self, dt: f32) {
        self.fright_left = (self.fright_left - dt).max(0.0);
        if let Some(t) = self.dead_for.as_mut() {
            *t += dt;
            if *t >= GHOST_RESPAWN_SECONDS {
                self.position = self.spawn;
                self.dead_for = None;
            }
        }
    }

    fn despawn(&mut self) {
        log::debug!("{} despawned", self.name);
    }
}

impl Adversary for DemoGhost {
    fn is_dead(&self) -> bool {
        self.dead_for.is_some()
    }

    fn is_vulnerable(&self) -> bool {
        self.fright_left > 0.0
    }

    fn set_data(&mut self, _target: PlayerHandle, spawn: Vec2, _home_hint: Vec2) {
        self.spawn = spawn;
    }

    fn on_phase_change(&mut self, phase: Phase) {
        // The session does not announce the end of fright; track it locally
        self.fright_left = match phase {
            Phase::Frightened if self.dead_for.is_none() => DEFAULT_FRIGHT_TIME,
            _ => 0.0,
        };
    }
}

struct DemoFactory;

impl PersonaFactory for DemoFactory {
    fn spawn_player(&mut self, position: Vec2) -> PlayerHandle {
        Rc::new(RefCell::new(DemoPlayer { position }))
    }

    fn spawn_adversary(&mut self, name: &str, position: Vec2) -> AdversaryHandle {
        Rc::new(RefCell::new(DemoGhost {
            name: name.to_string(),
            position,
            spawn: position,
            fright_left: 0.0,
            dead_for: None,
        }))
    }
}

struct LogVisualizer;

impl MazeVisualizer for LogVisualizer {
    fn create_or_refresh(&mut self, maze: &Maze) {
        log::info!(
            "Maze {}x{} with {} food",
            maze.size_x(),
            maze.size_y(),
            maze.remaining_food()
        );
    }

    fn refresh(&mut self, maze: &Maze, position: Vec2) {
        log::trace!("Redraw {} ({} food left)", position, maze.remaining_food());
    }
}

fn subscribe_observers(session: &mut Session) {
    let bus = session.bus_mut();
    bus.score.subscribe(|score| log::debug!("Score: {}", score));
    bus.lives.subscribe(|lives| log::info!("Lives: {}", lives));
    bus.message.subscribe(|m: &LevelMessage| {
        if !m.text.is_empty() {
            log::info!("[{}] {}", m.position, m.text);
        }
    });
    bus.floating.subscribe(|m: &LevelMessage| log::info!("+{} at {}", m.text, m.position));
    bus.phase.subscribe(|phase| log::info!("Adversaries -> {:?}", phase));
}

/// Next thing the scripted player runs into
fn next_collision(session: &Session, step: u32) -> Collided {
    if step % ADVERSARY_EVERY == 0 {
        if let Some(adversary) = session.personas().adversaries().next() {
            return Collided::Adversary(Rc::clone(adversary));
        }
    }

    let food = session.maze().and_then(|maze| {
        maze.iter()
            .find(|(_, _, cell)| cell.cell_type.is_edible())
            .map(|(x, y, cell)| FoodItem {
                position: Maze::cell_center(x, y),
                points: if cell.cell_type == CellType::Energizer {
                    ENERGIZER_POINTS
                } else {
                    FOOD_POINTS
                },
            })
    });
    food.map(Collided::Food).unwrap_or(Collided::Scenery)
}

fn run() -> SessionResult<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => LevelSettings::load(&path)?,
        None => LevelSettings::default(),
    };

    let mut session = Session::new(
        settings,
        Box::new(TextMaze::parse(DEMO_LAYOUT)?),
        Some(Box::new(LogVisualizer)),
        Box::new(DemoFactory),
    )?;
    subscribe_observers(&mut session);
    session.prepare_level()?;

    let input = TickInput::default();
    let mut elapsed = 0.0;
    let mut since_script = 0.0;
    let mut step = 0u32;

    while elapsed < MAX_DEMO_SECONDS && session.stage() != LevelStage::GameOver {
        session.update(SIM_DT, &input)?;
        elapsed += SIM_DT;

        if !session.is_level_active() {
            continue;
        }
        since_script += SIM_DT;
        if since_script < SCRIPT_INTERVAL {
            continue;
        }
        since_script = 0.0;
        step += 1;

        let Some(player) = session.player() else {
            continue;
        };
        let collided = next_collision(&session, step);
        let outcome = session.handle_collision(&player, &collided)?;
        log::debug!("Step {}: {:?}", step, outcome);
    }

    log::info!(
        "Demo finished after {:.1}s: stage {:?}, score {}, lives {}",
        elapsed,
        session.stage(),
        session.score(),
        session.lives()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Maze Chase (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
