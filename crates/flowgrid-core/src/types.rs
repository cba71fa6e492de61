//! Record types shared across FlowGrid crates.
//!
//! These are the write-side inputs of the process catalog: a
//! [`DeploymentRecord`] bundles raw resources with the metadata of every
//! process it contains, and a [`ProcessRecord`] describes one process
//! definition on its own.

use serde::{Deserialize, Serialize};

/// Tenant used when a record does not name one.
pub const DEFAULT_TENANT: &str = "<default>";

/// Globally unique key assigned by the key generator.
pub type ProcessKey = u64;

/// Lifecycle state of a deployed process definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    #[default]
    Active,
    PendingDeletion,
}

// ── Process ───────────────────────────────────────────────────────

/// A single process definition, as produced by the deployment pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub key: ProcessKey,
    pub tenant_id: String,
    /// Human-assigned identifier, shared by every version of the process.
    pub bpmn_process_id: String,
    /// 1-based version within `(tenant_id, bpmn_process_id)`.
    pub version: u32,
    pub resource_name: String,
    pub resource: Vec<u8>,
    /// Digest of `resource`.
    pub checksum: Vec<u8>,
    /// Deployment that introduced this definition (0 if unknown).
    #[serde(default)]
    pub deployment_key: u64,
    #[serde(default)]
    pub version_tag: Option<String>,
}

impl ProcessRecord {
    /// Create a record in the default tenant with empty resource and checksum.
    pub fn new(key: ProcessKey, bpmn_process_id: impl Into<String>, version: u32) -> Self {
        Self {
            key,
            tenant_id: DEFAULT_TENANT.to_string(),
            bpmn_process_id: bpmn_process_id.into(),
            version,
            resource_name: String::new(),
            resource: Vec::new(),
            checksum: Vec::new(),
            deployment_key: 0,
            version_tag: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, resource: impl Into<Vec<u8>>) -> Self {
        self.resource_name = name.into();
        self.resource = resource.into();
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<Vec<u8>>) -> Self {
        self.checksum = checksum.into();
        self
    }

    pub fn with_deployment_key(mut self, deployment_key: u64) -> Self {
        self.deployment_key = deployment_key;
        self
    }

    pub fn with_version_tag(mut self, tag: impl Into<String>) -> Self {
        self.version_tag = Some(tag.into());
        self
    }
}

// ── Deployment ────────────────────────────────────────────────────

/// A raw deployable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResource {
    pub resource_name: String,
    pub resource: Vec<u8>,
}

/// Metadata of one process embedded in a deployment.
///
/// The resource bytes live in [`DeploymentRecord::resources`] and are
/// matched by `resource_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetadata {
    pub bpmn_process_id: String,
    pub version: u32,
    pub key: ProcessKey,
    pub resource_name: String,
    pub checksum: Vec<u8>,
    #[serde(default)]
    pub version_tag: Option<String>,
}

/// A batch submission of resources and the processes they define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub key: u64,
    pub tenant_id: String,
    pub resources: Vec<DeploymentResource>,
    pub processes: Vec<ProcessMetadata>,
}

impl DeploymentRecord {
    /// Create an empty deployment in the default tenant.
    pub fn new(key: u64) -> Self {
        Self {
            key,
            tenant_id: DEFAULT_TENANT.to_string(),
            resources: Vec::new(),
            processes: Vec::new(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn add_resource(&mut self, name: impl Into<String>, resource: impl Into<Vec<u8>>) -> &mut Self {
        self.resources.push(DeploymentResource {
            resource_name: name.into(),
            resource: resource.into(),
        });
        self
    }

    pub fn add_process(&mut self, metadata: ProcessMetadata) -> &mut Self {
        self.processes.push(metadata);
        self
    }

    /// Look up a resource by name.
    pub fn resource(&self, name: &str) -> Option<&DeploymentResource> {
        self.resources.iter().find(|r| r.resource_name == name)
    }

    /// Unpack one embedded process into a standalone record.
    ///
    /// Returns `None` when the metadata names a resource the deployment
    /// does not carry.
    pub fn process_record(&self, metadata: &ProcessMetadata) -> Option<ProcessRecord> {
        let resource = self.resource(&metadata.resource_name)?;
        Some(ProcessRecord {
            key: metadata.key,
            tenant_id: self.tenant_id.clone(),
            bpmn_process_id: metadata.bpmn_process_id.clone(),
            version: metadata.version,
            resource_name: metadata.resource_name.clone(),
            resource: resource.resource.clone(),
            checksum: metadata.checksum.clone(),
            deployment_key: self.key,
            version_tag: metadata.version_tag.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment() -> DeploymentRecord {
        let mut deployment = DeploymentRecord::new(7).with_tenant("acme");
        deployment.add_resource("order.bpmn", b"<order/>".to_vec());
        deployment.add_process(ProcessMetadata {
            bpmn_process_id: "order".to_string(),
            version: 3,
            key: 42,
            resource_name: "order.bpmn".to_string(),
            checksum: b"sum".to_vec(),
            version_tag: Some("v3".to_string()),
        });
        deployment
    }

    #[test]
    fn unpacks_embedded_process() {
        let deployment = deployment();
        let record = deployment.process_record(&deployment.processes[0]).unwrap();

        assert_eq!(record.key, 42);
        assert_eq!(record.tenant_id, "acme");
        assert_eq!(record.version, 3);
        assert_eq!(record.resource, b"<order/>");
        assert_eq!(record.deployment_key, 7);
        assert_eq!(record.version_tag.as_deref(), Some("v3"));
    }

    #[test]
    fn missing_resource_yields_none() {
        let mut deployment = deployment();
        deployment.resources.clear();
        assert!(deployment.process_record(&deployment.processes[0]).is_none());
    }

    #[test]
    fn new_record_uses_default_tenant() {
        let record = ProcessRecord::new(1, "p", 1);
        assert_eq!(record.tenant_id, DEFAULT_TENANT);
        assert_eq!(record.deployment_key, 0);
    }

    #[test]
    fn builders_set_fields() {
        let record = ProcessRecord::new(1, "p", 2)
            .with_tenant("t")
            .with_resource("p.bpmn", b"x".to_vec())
            .with_checksum(b"c".to_vec())
            .with_deployment_key(9)
            .with_version_tag("stable");

        assert_eq!(record.tenant_id, "t");
        assert_eq!(record.resource_name, "p.bpmn");
        assert_eq!(record.checksum, b"c");
        assert_eq!(record.deployment_key, 9);
        assert_eq!(record.version_tag.as_deref(), Some("stable"));
        assert_eq!(ProcessState::default(), ProcessState::Active);
    }
}
