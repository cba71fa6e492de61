//! Write commands applied to the catalog by the ordered apply loop.

use flowgrid_core::{DeploymentRecord, ProcessKey, ProcessRecord, ProcessState};
use serde::{Deserialize, Serialize};

/// A catalog mutation, as sequenced by the replicated log.
///
/// Every variant maps onto exactly one catalog primitive; a deployment is
/// just a collection of process writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogCommand {
    PutDeployment {
        deployment: DeploymentRecord,
    },
    PutProcess {
        key: ProcessKey,
        record: ProcessRecord,
    },
    DeleteProcess {
        record: ProcessRecord,
    },
    UpdateProcessState {
        record: ProcessRecord,
        state: ProcessState,
    },
}

impl CatalogCommand {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogCommand::PutDeployment { .. } => "put_deployment",
            CatalogCommand::PutProcess { .. } => "put_process",
            CatalogCommand::DeleteProcess { .. } => "delete_process",
            CatalogCommand::UpdateProcessState { .. } => "update_process_state",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let cmd = CatalogCommand::DeleteProcess {
            record: ProcessRecord::new(1, "p", 1),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "delete_process");
        assert_eq!(json["record"]["bpmn_process_id"], "p");

        let back: CatalogCommand = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
        assert_eq!(back.kind(), "delete_process");
    }

    #[test]
    fn state_update_parses_from_log_json() {
        let json = r#"{
            "type": "update_process_state",
            "record": {
                "key": 3,
                "tenant_id": "<default>",
                "bpmn_process_id": "order",
                "version": 1,
                "resource_name": "order.bpmn",
                "resource": [],
                "checksum": []
            },
            "state": "pending_deletion"
        }"#;
        let cmd: CatalogCommand = serde_json::from_str(json).unwrap();
        match cmd {
            CatalogCommand::UpdateProcessState { record, state } => {
                assert_eq!(record.key, 3);
                assert_eq!(record.deployment_key, 0);
                assert_eq!(state, ProcessState::PendingDeletion);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
