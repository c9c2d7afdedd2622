//! State machine runtime.
//!
//! This module holds the machine that owns a state and its data, plus the
//! [`Context`] view the machine passes into state hooks.
//!
//! # Key Concepts
//!
//! - **Transitions**: exit the old state, swap, enter the new one
//! - **Updates**: measure elapsed time and forward it to the current state
//! - **Requests**: hooks ask for transitions through `Context`; the machine
//!   applies them once the hook returns

mod context;
mod state_machine;

pub use context::Context;
pub use state_machine::StateMachine;
