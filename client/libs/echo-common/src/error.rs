//! Model error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown reaction symbol: {0}")]
    UnknownReaction(String),
}
