//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Cannot insert node {child} into {parent}: would create a cycle")]
    HierarchyRequest { parent: u32, child: u32 },

    #[error("Node {0} has no parent")]
    NoParent(u32),

    #[error("Invalid class token: '{0}'")]
    InvalidToken(String),

    #[error("Invalid attribute name: '{0}'")]
    InvalidAttributeName(String),

    #[error("Invalid dataset key: '{0}'")]
    InvalidDataKey(String),

    #[error("Maximum nesting depth exceeded: {current} > {max}")]
    MaxDepthExceeded { current: usize, max: usize },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DomError {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        DomError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}
