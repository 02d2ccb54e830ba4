//! Delayed lifecycle actions
//!
//! A logical clock advanced by the session's per-frame update. Each action can
//! be pending at most once; actions fire once and are then forgotten.

use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Lifecycle transitions that run after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduledAction {
    StartLevel,
    RestartLevel,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Pending {
    action: ScheduledAction,
    due: f64,
}

/// Queue of pending actions keyed by logical time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: f64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical time elapsed since the scheduler was created
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Queue `action` to fire `delay` seconds from now
    pub fn schedule(&mut self, action: ScheduledAction, delay: f32) -> SessionResult<()> {
        if self.is_pending(action) {
            return Err(SessionError::SchedulingConflict(action));
        }
        let due = self.now + f64::from(delay.max(0.0));
        log::trace!("Scheduled {:?} at t={:.3}", action, due);
        self.pending.push(Pending { action, due });
        Ok(())
    }

    pub fn is_pending(&self, action: ScheduledAction) -> bool {
        self.pending.iter().any(|p| p.action == action)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and return the actions now due, earliest first
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledAction> {
        self.now += f64::from(dt.max(0.0));

        let now = self.now;
        let (mut due, pending): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|p| p.action).collect()
    }

    /// Put actions returned by `advance` back, due immediately. Actions
    /// already pending are left alone.
    pub fn requeue(&mut self, actions: impl IntoIterator<Item = ScheduledAction>) {
        for action in actions {
            if !self.is_pending(action) {
                self.pending.push(Pending {
                    action,
                    due: self.now,
                });
            }
        }
    }

    /// Drop every pending action (session teardown)
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending actions", self.pending.len());
        }
        self.pending.clear();
    }
}
