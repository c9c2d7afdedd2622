//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{Clock, State, SystemClock};
use crate::machine::StateMachine;
use uuid::Uuid;

/// Builder for constructing state machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use tickstate::builder::StateMachineBuilder;
/// use tickstate::core::ManualClock;
///
/// let clock = ManualClock::default();
/// let machine = StateMachineBuilder::<Vec<String>>::new()
///     .data(Vec::new())
///     .clock(clock)
///     .build()
///     .unwrap();
///
/// assert!(!machine.is_state_valid());
/// ```
pub struct StateMachineBuilder<D: 'static, C: Clock = SystemClock> {
    data: Option<D>,
    initial: Option<Box<dyn State<D>>>,
    clock: C,
    id: Option<Uuid>,
}

impl<D: 'static> StateMachineBuilder<D> {
    /// Create a new builder on the system clock.
    pub fn new() -> Self {
        Self {
            data: None,
            initial: None,
            clock: SystemClock,
            id: None,
        }
    }
}

impl<D: 'static, C: Clock> StateMachineBuilder<D, C> {
    /// Set the machine data (required).
    pub fn data(mut self, data: D) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the state entered on build (optional).
    pub fn initial<S: State<D>>(self, state: S) -> Self {
        self.initial_boxed(Box::new(state))
    }

    /// Set an already boxed initial state (optional).
    pub fn initial_boxed(mut self, state: Box<dyn State<D>>) -> Self {
        self.initial = Some(state);
        self
    }

    /// Read time from `clock` instead of the system clock.
    pub fn clock<T: Clock>(self, clock: T) -> StateMachineBuilder<D, T> {
        StateMachineBuilder {
            data: self.data,
            initial: self.initial,
            clock,
            id: self.id,
        }
    }

    /// Use a fixed id in log records instead of a random one.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Build the state machine, entering the initial state if one was set.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<StateMachine<D, C>, BuildError> {
        let data = self.data.ok_or(BuildError::MissingData)?;
        let id = match self.id {
            Some(id) if id.is_nil() => return Err(BuildError::NilId),
            Some(id) => id,
            None => Uuid::new_v4(),
        };

        Ok(StateMachine::assemble(id, data, self.initial, self.clock))
    }
}

impl<D: 'static> Default for StateMachineBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}
