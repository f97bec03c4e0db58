//! Nodes: machines that may later be attached to a cluster.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cluster::InfraStatus;
use crate::error::{SmResult, SystemModelError};
use crate::labels::{Labels, apply_label_update};
use crate::validate::{reject_supplied, require};

/// Assignment state of a node.
///
/// Moves `Unregistered → Unassigned → Assigned`, only through explicit
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Known to the platform, nothing done yet.
    #[default]
    Unregistered,
    /// Prepared but not part of any cluster.
    Unassigned,
    /// Installed and part of a cluster.
    Assigned,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub organization_id: String,
    /// Empty until the node is attached.
    #[serde(default)]
    pub cluster_id: String,
    pub node_id: String,
    pub ip: String,
    #[serde(default)]
    pub labels: Labels,
    pub status: InfraStatus,
    pub state: NodeState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddNodeRequest {
    #[serde(default)]
    pub organization_id: String,
    /// Assigned by the system; must be left empty.
    #[serde(default)]
    pub node_id: String,
    pub ip: String,
    #[serde(default)]
    pub labels: Labels,
}

impl AddNodeRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        reject_supplied(&self.node_id, "node_id")?;
        require(&self.ip, "ip")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateNodeRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub node_id: String,
    pub status: Option<InfraStatus>,
    pub state: Option<NodeState>,
    pub add_labels: Option<Labels>,
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateNodeRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.node_id, "node_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachNodeRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub node_id: String,
    pub cluster_id: String,
}

impl AttachNodeRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.node_id, "node_id")?;
        require(&self.cluster_id, "cluster_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveNodesRequest {
    #[serde(default)]
    pub organization_id: String,
    pub nodes: Vec<String>,
}

impl RemoveNodesRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        if self.nodes.is_empty() {
            return Err(SystemModelError::invalid("nodes must not be empty"));
        }
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node_id in &self.nodes {
            require(node_id, "node id")?;
            if !seen.insert(node_id.as_str()) {
                return Err(SystemModelError::invalid(format!(
                    "node {node_id} is listed more than once"
                )));
            }
        }
        Ok(())
    }
}

impl Node {
    pub fn from_request(req: &AddNodeRequest, node_id: String) -> SmResult<Self> {
        reject_supplied(&req.node_id, "node_id")?;
        Ok(Self {
            organization_id: req.organization_id.clone(),
            cluster_id: String::new(),
            node_id,
            ip: req.ip.clone(),
            labels: req.labels.clone(),
            status: InfraStatus::Installing,
            state: NodeState::Unregistered,
        })
    }

    pub fn apply_update(&mut self, req: &UpdateNodeRequest) {
        apply_label_update(
            &mut self.labels,
            req.add_labels.as_ref(),
            req.remove_labels.as_deref(),
        );
        if let Some(status) = req.status {
            self.status = status;
        }
        if let Some(state) = req.state {
            self.state = state;
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.cluster_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        let req = AddNodeRequest {
            organization_id: "org-1".to_string(),
            ip: "10.0.0.7".to_string(),
            labels: [("rack".to_string(), "r1".to_string())].into(),
            ..Default::default()
        };
        Node::from_request(&req, "node-1".to_string()).unwrap()
    }

    #[test]
    fn new_node_defaults() {
        let n = node();
        assert_eq!(n.state, NodeState::Unregistered);
        assert_eq!(n.status, InfraStatus::Installing);
        assert!(n.cluster_id.is_empty());
        assert!(!n.is_attached());
    }

    #[test]
    fn supplied_node_id_is_rejected() {
        let req = AddNodeRequest {
            organization_id: "org-1".to_string(),
            node_id: "chosen".to_string(),
            ip: "10.0.0.7".to_string(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(Node::from_request(&req, "node-1".to_string()).is_err());
    }

    #[test]
    fn empty_update_is_identity() {
        let mut n = node();
        let before = n.clone();
        n.apply_update(&UpdateNodeRequest::default());
        assert_eq!(n, before);
    }

    #[test]
    fn add_and_remove_same_label_removes_it() {
        let mut n = node();
        n.apply_update(&UpdateNodeRequest {
            add_labels: Some([("a".to_string(), "1".to_string())].into()),
            remove_labels: Some(vec!["a".to_string()]),
            ..Default::default()
        });
        assert!(!n.labels.contains_key("a"));
        assert_eq!(n.labels.get("rack").map(String::as_str), Some("r1"));
    }

    #[test]
    fn state_moves_only_when_requested() {
        let mut n = node();
        n.apply_update(&UpdateNodeRequest {
            status: Some(InfraStatus::Running),
            ..Default::default()
        });
        assert_eq!(n.state, NodeState::Unregistered);
        n.apply_update(&UpdateNodeRequest {
            state: Some(NodeState::Unassigned),
            ..Default::default()
        });
        assert_eq!(n.state, NodeState::Unassigned);
    }

    #[test]
    fn remove_nodes_requires_ids() {
        let req = RemoveNodesRequest {
            organization_id: "org-1".to_string(),
            nodes: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn remove_nodes_rejects_repeated_ids() {
        let req = RemoveNodesRequest {
            organization_id: "org-1".to_string(),
            nodes: vec!["n-1".to_string(), "n-2".to_string(), "n-1".to_string()],
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert!(err.to_string().contains("n-1"));
    }
}
