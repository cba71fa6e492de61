pub mod checksum;
pub mod config;
pub mod types;

pub use checksum::{checksum, checksum_hex};
pub use config::CatalogConfig;
pub use types::*;
