//! Repository Layer
//!
//! Data access abstractions and implementations.

pub mod db;
mod list_repo;
mod memory;
mod traits;


pub use db::{init_db, DbState, SharedConnection};
pub use list_repo::ListRepository;
pub use memory::MemoryListStore;
pub use traits::{ListStore, Repository};
