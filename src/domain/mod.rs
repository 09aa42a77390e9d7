//! Domain Layer
//!
//! Contains the domain entities and core abstractions.
//! This layer has NO I/O (serde, chrono and uuid only).

mod entity;
mod list;

pub use entity::{DomainError, DomainResult, Entity};
pub use list::{ListId, ListItem, ListRecord, OwnerId};
