//! Configuration file parsing for Cluster Art
//!
//! Settings live in `<config_dir>/cluster-art/config.toml`. Command-line
//! flags override them.

pub mod settings;
pub mod types;

pub use settings::{default_config_path, load_default_settings, load_settings, save_settings};
pub use types::*;
