//! Configuration
//!
//! JSON settings file, e.g. `cake_config.json`:
//!
//! ```json
//! { "capacity_per_pie": 8, "cascade_basis": "pre_removal", "db_path": "cake.db" }
//! ```
//!
//! Missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::allocator::{CascadeBasis, MAX_LISTS_PER_PIE};
use crate::domain::{DomainError, DomainResult};

pub const DEFAULT_APP_NAME: &str = "HaveYourCake";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CakeConfig {
    /// Lists per pie
    pub capacity_per_pie: usize,
    pub cascade_basis: CascadeBasis,
    /// SQLite file; `:memory:` keeps everything in memory
    pub db_path: PathBuf,
    /// Directory for the rolling log; no file logging when unset
    pub log_dir: Option<PathBuf>,
    pub app_name: String,
}

impl Default for CakeConfig {
    fn default() -> Self {
        Self {
            capacity_per_pie: MAX_LISTS_PER_PIE,
            cascade_basis: CascadeBasis::default(),
            db_path: PathBuf::from("have_your_cake.db"),
            log_dir: None,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl CakeConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: CakeConfig = serde_json::from_str(&content)
            .map_err(|e| DomainError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`CakeConfig::load`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> DomainResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> DomainResult<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::Config(format!("Failed to encode config: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| DomainError::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.capacity_per_pie == 0 || self.capacity_per_pie > u32::MAX as usize {
            return Err(DomainError::InvalidInput(format!(
                "capacity_per_pie must be between 1 and {}, got {}",
                u32::MAX,
                self.capacity_per_pie
            )));
        }
        if self.app_name.trim().is_empty() {
            return Err(DomainError::InvalidInput("app_name cannot be empty".to_string()));
        }
        Ok(())
    }
}
