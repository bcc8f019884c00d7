//! Error types for the query layer

use dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Operation needs exactly one target but the wrapper holds a collection
    #[error("can't {action} of multiple nodes")]
    MultipleNodes { action: &'static str },

    #[error("only 1 or 2 arguments allowed, got {given}")]
    InvalidArity { given: usize },

    #[error("invalid argument at position {position}: expected {expected}")]
    InvalidArgument {
        position: usize,
        expected: &'static str,
    },

    #[error(transparent)]
    Dom(#[from] DomError),
}
