//! Machine view handed to state hooks.

use crate::core::{State, MIN_DELTA_TIME};
use chrono::{DateTime, Utc};
use std::fmt;

/// Transition requested from inside a hook.
pub(crate) enum Request<D> {
    Switch(Option<Box<dyn State<D>>>),
    Reenter,
}

/// The part of a [`StateMachine`](super::StateMachine) a state can reach.
///
/// States receive `&mut Context` in every hook. It carries the machine's
/// data and timing, and accepts transition requests. A request is applied
/// as soon as the running hook returns; a later request in the same hook
/// replaces an earlier one. A request from a hook that panics is dropped.
pub struct Context<D> {
    data: D,
    last_update: DateTime<Utc>,
    delta_time: f64,
    pending: Option<Request<D>>,
}

impl<D> Context<D> {
    pub(crate) fn new(data: D, now: DateTime<Utc>) -> Self {
        Self {
            data,
            last_update: now,
            delta_time: MIN_DELTA_TIME,
            pending: None,
        }
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// Replace the data. No validation is performed.
    pub fn set_data(&mut self, data: D) {
        self.data = data;
    }

    /// Time of the machine's last update.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Seconds between the last two updates.
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Request a switch to `next`, or to terminal when `None`.
    pub fn switch_state(&mut self, next: Option<Box<dyn State<D>>>) {
        self.pending = Some(Request::Switch(next));
    }

    /// Request a switch to `next`.
    pub fn switch_to<S: State<D>>(&mut self, next: S) {
        self.switch_state(Some(Box::new(next)));
    }

    /// Request that the machine become terminal.
    pub fn terminate(&mut self) {
        self.switch_state(None);
    }

    /// Request that the current state be exited and entered again.
    pub fn reenter(&mut self) {
        self.pending = Some(Request::Reenter);
    }

    /// Whether a transition request is waiting to be applied.
    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn take_request(&mut self) -> Option<Request<D>> {
        self.pending.take()
    }

    pub(crate) fn record_update(&mut self, now: DateTime<Utc>, delta_time: f64) {
        self.last_update = now;
        self.delta_time = delta_time;
    }
}

impl<D: fmt::Debug> fmt::Debug for Context<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data)
            .field("last_update", &self.last_update)
            .field("delta_time", &self.delta_time)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}
