#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! File-backed configuration for the tier/category reconciler.
//!
//! Layout: `model.rs` (typed document), `defaults.rs` (built-in values and
//! search locations), `validate.rs` (invariant checks), `loader.rs`
//! (discovery and parsing).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use defaults::{CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadedConfig, candidate_paths, discover, load, load_from_path};
pub use model::{ClientConfig, ClogBand, ClogConfig, GeneralConfig, LeverConfig, Prefixes};
pub use validate::validate_config;
