//! Twin Configuration Module
//!
//! Provides floor configuration loaded from TOML files, replacing the
//! hardcoded simulation constants with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `CNC_TWIN_CONFIG` environment variable (path to TOML file)
//! 2. `twin_config.toml` in the current working directory
//! 3. Built-in defaults (the design constants in [`defaults`])
//!
//! ## Usage
//!
//! The config is an explicit value handed to the floor at construction;
//! there is no process-wide instance.
//!
//! ```ignore
//! let config = TwinConfig::load();
//! let floor = ProductionFloor::from_config(&config)?;
//! ```

mod twin_config;
pub mod defaults;

pub use twin_config::*;
