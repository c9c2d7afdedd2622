//! Core state machine types.
//!
//! This module contains the building blocks shared by the machine:
//! - The `State` trait with its enter/update/exit hooks
//! - `StateType` descriptors for branching on the current state
//! - Clocks that feed update timing

mod clock;
mod state;

pub use clock::{Clock, ManualClock, SystemClock, MIN_DELTA_TIME};
pub use state::{State, StateType};

pub(crate) use clock::seconds_between;
