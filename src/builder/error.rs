//! Build errors for the state machine builder.

use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Machine data not specified. Call .data(value) before .build()")]
    MissingData,

    #[error("Machine id must not be nil")]
    NilId,
}
