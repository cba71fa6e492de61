//! flowgrid-catalog: versioned process-definition catalog for FlowGrid.
//!
//! Backed by [redb](https://docs.rs/redb), the catalog keeps every
//! deployed version of every process and answers lookups by key, by
//! `(process id, version)`, by deployment, and "latest version" queries
//! without scanning history.
//!
//! # Architecture
//!
//! Definitions are JSON-serialized into a primary table keyed by
//! `(tenant, process_key)`. Four derived indices are maintained by hand:
//!
//! - version index `(tenant, process_id, version) → key`
//! - latest pointer `(tenant, process_id) → (key, version)`
//! - digest `(tenant, process_id) → checksum of the latest version`
//! - version counter `(tenant, process_id) → next version`
//!
//! plus a deployment index `(tenant, process_id, deployment_key) → key`.
//! Keys are built by [`keys`] so that range scans follow version order.
//!
//! Parsed executables are never persisted; they are derived through a
//! caller-supplied [`ProcessParser`] and memoized in memory.

pub mod catalog;
pub mod command;
pub mod error;
pub mod executable;
pub mod keys;
pub mod tables;
pub mod types;

pub use catalog::ProcessCatalog;
pub use command::CatalogCommand;
pub use error::{CatalogError, CatalogResult};
pub use executable::{ExecutableCache, ProcessParser};
pub use types::PersistedProcess;
