//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    /// Slot bookkeeping is inconsistent (out-of-range slot, missing pie member)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The backing store rejected a read or write
    #[error("Store failure: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file unreadable or malformed
    #[error("Config error: {0}")]
    Config(String),
}

impl DomainError {
    /// Programming-logic errors, as opposed to environmental failures
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, DomainError::InvariantViolation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}
