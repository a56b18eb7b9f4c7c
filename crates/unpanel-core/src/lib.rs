//! unpanel-core: types, configuration, and errors shared by the page
//! reconstruction crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{FailurePolicy, LogConfig, UnpanelConfig, MAX_TOTAL_TILES};
pub use error::{UnpanelError, UnpanelResult};
pub use types::{PageRequest, Seed, TileMapping};
