//! Persisted form of a deployed process definition.

use flowgrid_core::{ProcessKey, ProcessRecord, ProcessState};
use serde::{Deserialize, Serialize};

/// A process definition as stored in the catalog.
///
/// Everything except `state` is immutable once written. The parsed
/// executable is not part of the record; see [`crate::ExecutableCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProcess {
    pub key: ProcessKey,
    pub tenant_id: String,
    pub bpmn_process_id: String,
    pub version: u32,
    pub resource_name: String,
    pub resource: Vec<u8>,
    pub checksum: Vec<u8>,
    pub deployment_key: u64,
    pub version_tag: Option<String>,
    pub state: ProcessState,
}

impl PersistedProcess {
    /// Build the stored form of `record` under `key`, in the active state.
    pub fn from_record(key: ProcessKey, record: &ProcessRecord) -> Self {
        Self {
            key,
            tenant_id: record.tenant_id.clone(),
            bpmn_process_id: record.bpmn_process_id.clone(),
            version: record.version,
            resource_name: record.resource_name.clone(),
            resource: record.resource.clone(),
            checksum: record.checksum.clone(),
            deployment_key: record.deployment_key,
            version_tag: record.version_tag.clone(),
            state: ProcessState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ProcessState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_copies_record_and_starts_active() {
        let record = ProcessRecord::new(5, "order", 2)
            .with_resource("order.bpmn", b"<order/>".to_vec())
            .with_checksum(b"sum".to_vec());

        let stored = PersistedProcess::from_record(9, &record);

        assert_eq!(stored.key, 9);
        assert_eq!(stored.bpmn_process_id, "order");
        assert_eq!(stored.version, 2);
        assert_eq!(stored.resource, record.resource);
        assert!(stored.is_active());
    }
}
