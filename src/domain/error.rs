//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Domain errors represent violations of the tree bookkeeping rules.
/// Conditions that only skip a node during flush are reported as
/// [`Resolution`](crate::domain::Resolution) values instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("\"{0}\" already processed")]
    DuplicateIdentifier(String),

    #[error("node not found in arena: {0:?}")]
    NodeNotFound(Index),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
