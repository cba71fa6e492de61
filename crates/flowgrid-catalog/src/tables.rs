//! redb table definitions for the process catalog.
//!
//! Every table uses opaque byte keys built by [`crate::keys`]; integers are
//! big-endian so redb's byte ordering matches numeric ordering.

use redb::TableDefinition;

/// Persisted definitions keyed by `(tenant, process_key)`. JSON values.
pub const DEFINITIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("process_definitions");

/// Version index keyed by `(tenant, process_id, version)`, value is the process key.
pub const VERSIONS: TableDefinition<&[u8], u64> = TableDefinition::new("process_versions");

/// Latest pointer keyed by `(tenant, process_id)`, value is `(process_key, version)`.
pub const LATEST: TableDefinition<&[u8], (u64, u32)> = TableDefinition::new("process_latest");

/// Checksum of the latest version keyed by `(tenant, process_id)`.
pub const DIGESTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("process_digest");

/// Next version to assign keyed by `(tenant, process_id)`.
pub const NEXT_VERSION: TableDefinition<&[u8], u32> = TableDefinition::new("process_next_version");

/// Deployment index keyed by `(tenant, process_id, deployment_key)`, value is the process key.
pub const DEPLOYMENTS: TableDefinition<&[u8], u64> = TableDefinition::new("process_deployments");
