//! Configuration loading and management for the workshop engine.
//!
//! This module loads the payroll policy (working days per period, paid hours
//! per day, multipliers and rounding precision) from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use workshop_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/workshop").unwrap();
//! println!("Loaded workshop: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{PayrollPolicy, WorkshopConfig, WorkshopMetadata};
