//! Have Your Cake Core
//!
//! Layered architecture:
//! - domain: Core entities and errors
//! - allocator: Pie partitioning and slot bookkeeping
//! - repository: Data access abstractions and implementations
//! - service: Per-owner list state, the single place lists change
//! - config: JSON settings

use std::sync::Arc;

pub mod allocator;
pub mod config;
pub mod domain;
pub mod repository;
pub mod service;

pub use config::CakeConfig;
pub use domain::{DomainError, DomainResult, ListItem, ListRecord};
pub use repository::{init_db, ListRepository, ListStore, MemoryListStore};
pub use service::{HomeService, SharedHome};

/// Set up logging and the database, then load `owner_id`'s lists
///
/// File logging is only installed when `config.log_dir` is set; a logger that
/// cannot be installed does not stop the app.
pub async fn bootstrap(config: &CakeConfig, owner_id: &str) -> DomainResult<SharedHome<ListRepository>> {
    config.validate()?;

    if let Some(log_dir) = &config.log_dir {
        if let Err(e) = rolling_logger::init_logger(log_dir.clone(), &config.app_name) {
            eprintln!(
                "[{}] Logger not installed: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                e
            );
        }
    }

    let db_state = init_db(&config.db_path).await?;
    let store = Arc::new(ListRepository::new(db_state.connection()));

    let mut home = HomeService::new(store, owner_id, config);
    match home.load().await {
        Ok(()) => {
            let _ = rolling_logger::info(&format!(
                "{} ready with {} lists",
                config.app_name,
                home.lists().len()
            ));
        }
        Err(e) => {
            let _ = rolling_logger::error(&format!("Initial load failed: {}", e));
            return Err(e);
        }
    }

    Ok(home.into_shared())
}
