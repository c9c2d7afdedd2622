//! Builder API for state machine construction.
//!
//! The builder collects the machine's data, optional initial state, clock and
//! log id, then validates them in `build`.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
