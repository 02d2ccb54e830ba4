//! Personas: the controlled actor, adversaries and what they collide with
//!
//! Movement and pathfinding live behind the [`Persona`] and [`Adversary`]
//! traits. The session only drives their lifecycle. Handles are shared
//! `Rc<RefCell<..>>` because an adversary is reachable both from the registry
//! and from its phase-change subscription.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::{NotificationBus, SubscriptionId};
use super::maze::SpawnPoints;
use super::state::Phase;
use crate::error::SessionResult;

/// Anything spawned into a level
pub trait Persona {
    fn position(&self) -> Vec2;
    /// Kill the persona (start its death animation / return-home behaviour)
    fn die(&mut self);
    /// Per-frame update while the level is active
    fn on_update(&mut self, _dt: f32) {}
    /// Remove the persona from the world; it is never used again afterwards
    fn despawn(&mut self) {}
}

/// An adversary ("ghost")
pub trait Adversary: Persona {
    fn is_dead(&self) -> bool;
    /// True while frightened and edible
    fn is_vulnerable(&self) -> bool;
    /// Wire up the chase target, home spawn and the direction used to re-enter home
    fn set_data(&mut self, target: PlayerHandle, spawn: Vec2, home_hint: Vec2);
    fn on_phase_change(&mut self, phase: Phase);
}

pub type PlayerHandle = Rc<RefCell<dyn Persona>>;
pub type AdversaryHandle = Rc<RefCell<dyn Adversary>>;

/// Instantiates personas for the level
pub trait PersonaFactory {
    fn spawn_player(&mut self, position: Vec2) -> PlayerHandle;
    fn spawn_adversary(&mut self, name: &str, position: Vec2) -> AdversaryHandle;
}

/// An edible pellet or energizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub position: Vec2,
    pub points: u64,
}

/// What the controlled actor ran into
#[derive(Clone)]
pub enum Collided {
    Food(FoodItem),
    Adversary(AdversaryHandle),
    /// Walls, doors, anything without a gameplay role
    Scenery,
}

impl Collided {
    pub fn as_food(&self) -> Option<&FoodItem> {
        match self {
            Collided::Food(food) => Some(food),
            _ => None,
        }
    }

    pub fn as_adversary(&self) -> Option<&AdversaryHandle> {
        match self {
            Collided::Adversary(adversary) => Some(adversary),
            _ => None,
        }
    }
}

/// Adversary names, assigned in spawn order
pub const ADVERSARY_ROSTER: [&str; 4] = ["Blinky", "Pinky", "Inky", "Clyde"];

struct SpawnedAdversary {
    handle: AdversaryHandle,
    subscription: SubscriptionId,
}

/// Personas spawned for the current level
#[derive(Default)]
pub struct PersonaRegistry {
    player: Option<PlayerHandle>,
    adversaries: Vec<SpawnedAdversary>,
}

impl PersonaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self) -> Option<&PlayerHandle> {
        self.player.as_ref()
    }

    pub fn adversaries(&self) -> impl Iterator<Item = &AdversaryHandle> + '_ {
        self.adversaries.iter().map(|a| &a.handle)
    }

    pub fn adversary_count(&self) -> usize {
        self.adversaries.len()
    }

    /// Unsubscribe and despawn every persona
    pub fn teardown(&mut self, bus: &mut NotificationBus) {
        for spawned in self.adversaries.drain(..) {
            if !bus.phase.unsubscribe(spawned.subscription) {
                log::warn!("Adversary subscription {:?} was already gone", spawned.subscription);
            }
            spawned.handle.borrow_mut().despawn();
        }
        if let Some(player) = self.player.take() {
            player.borrow_mut().despawn();
        }
    }

    /// Replace all personas with a fresh set.
    ///
    /// Spawn positions are drawn before anything is torn down, so an empty
    /// spawn set leaves the current personas in place.
    pub fn respawn(
        &mut self,
        factory: &mut dyn PersonaFactory,
        spawns: &SpawnPoints,
        bus: &mut NotificationBus,
        rng: &mut Pcg32,
        adversary_count: usize,
        home_hint: Vec2,
    ) -> SessionResult<()> {
        let player_spawn = spawns.random_player_spawn(rng)?;
        let adversary_spawns = (0..adversary_count)
            .map(|_| spawns.random_adversary_spawn(rng))
            .collect::<SessionResult<Vec<_>>>()?;

        self.teardown(bus);

        let player = factory.spawn_player(player_spawn);
        for (i, spawn) in adversary_spawns.into_iter().enumerate() {
            let name = ADVERSARY_ROSTER[i % ADVERSARY_ROSTER.len()];
            let handle = factory.spawn_adversary(name, spawn);
            handle
                .borrow_mut()
                .set_data(Rc::clone(&player), spawn, home_hint);

            let listener = Rc::clone(&handle);
            let subscription = bus.phase.subscribe(move |phase| match listener.try_borrow_mut() {
                Ok(mut adversary) => adversary.on_phase_change(*phase),
                Err(_) => log::warn!("Adversary busy, dropped {:?} broadcast", phase),
            });
            self.adversaries.push(SpawnedAdversary {
                handle,
                subscription,
            });
        }
        self.player = Some(player);

        log::debug!(
            "Spawned player at {} and {} adversaries",
            player_spawn,
            self.adversaries.len()
        );
        Ok(())
    }

    /// Run the per-frame update of every persona
    pub fn update_all(&mut self, dt: f32) {
        if let Some(player) = &self.player {
            player.borrow_mut().on_update(dt);
        }
        for spawned in &self.adversaries {
            spawned.handle.borrow_mut().on_update(dt);
        }
    }
}
