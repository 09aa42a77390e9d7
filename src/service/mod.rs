//! Service Layer
//!
//! Stateful list bookkeeping on top of the allocator and a store.

mod home;
mod search;


pub use home::{DeleteOutcome, HomeService, SharedHome};
pub use search::{search, SearchHit};
