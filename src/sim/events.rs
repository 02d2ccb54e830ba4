//! Notification bus
//!
//! One broadcast [`Channel`] per event category. Dispatch is synchronous: every
//! handler has run by the time `emit` returns. Handlers receive only the event,
//! never the bus, so a handler cannot subscribe or unsubscribe anyone while a
//! dispatch is in progress.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Phase;

/// Handle returned by [`Channel::subscribe`], needed to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// Multi-subscriber broadcast channel for a single event type
pub struct Channel<E> {
    subscribers: Vec<(SubscriptionId, Handler<E>)>,
    next_id: u64,
}

impl<E> Default for Channel<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E> fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E> Channel<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. Subscriptions are additive; the same closure logic may be
    /// registered more than once and will then run once per registration.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to every subscriber
    pub fn emit(&mut self, event: &E) {
        for (_, handler) in self.subscribers.iter_mut() {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.iter().any(|(sub, _)| *sub == id)
    }
}

/// Text shown at a maze position (level banner or floating score)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMessage {
    pub position: Vec2,
    pub text: String,
}

impl LevelMessage {
    pub fn new(position: Vec2, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// All event categories published by the session
#[derive(Debug, Default)]
pub struct NotificationBus {
    /// Adversary mode broadcasts (Scatter/Chase/Frightened)
    pub phase: Channel<Phase>,
    /// Current total score
    pub score: Channel<u64>,
    /// Remaining lives
    pub lives: Channel<i32>,
    /// Level banner ("READY!", cleared with empty text)
    pub message: Channel<LevelMessage>,
    /// Floating score popups
    pub floating: Channel<LevelMessage>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_phase(&mut self, phase: Phase) {
        log::debug!("Phase -> {:?}", phase);
        self.phase.emit(&phase);
    }

    pub fn emit_score(&mut self, score: u64) {
        self.score.emit(&score);
    }

    pub fn emit_lives(&mut self, lives: i32) {
        self.lives.emit(&lives);
    }

    pub fn emit_message(&mut self, position: Vec2, text: &str) {
        self.message.emit(&LevelMessage::new(position, text));
    }

    pub fn emit_floating(&mut self, position: Vec2, text: &str) {
        self.floating.emit(&LevelMessage::new(position, text));
    }
}
