//! Configuration for the timeline engine
//!
//! - Generic YAML config loading/saving
//! - Default config path
//! - [`EngineConfig`], the engine's tunables
//!
//! # Usage
//!
//! ```ignore
//! use dubline_core::config::{default_config_path, load_config, EngineConfig};
//!
//! let config: EngineConfig = load_config(&default_config_path());
//! ```

mod engine;
mod io;
mod paths;

pub use engine::EngineConfig;
pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path};
