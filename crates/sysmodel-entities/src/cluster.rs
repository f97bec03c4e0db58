//! Clusters owned by an organization.

use serde::{Deserialize, Serialize};

use crate::error::SmResult;
use crate::labels::{Labels, apply_label_update};
use crate::validate::{reject_supplied, require};

/// Installation status of a piece of infrastructure, as reported by monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfraStatus {
    #[default]
    Installing,
    Running,
    Error,
    Uninstalling,
}

/// Orchestrator flavour of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterType {
    #[default]
    Kubernetes,
    DockerNode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cluster {
    pub organization_id: String,
    pub cluster_id: String,
    pub name: String,
    pub cluster_type: ClusterType,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub control_plane_hostname: String,
    #[serde(default)]
    pub multitenant: bool,
    #[serde(default)]
    pub labels: Labels,
    pub status: InfraStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddClusterRequest {
    #[serde(default)]
    pub organization_id: String,
    /// Assigned by the system; must be left empty.
    #[serde(default)]
    pub cluster_id: String,
    pub name: String,
    #[serde(default)]
    pub cluster_type: ClusterType,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub control_plane_hostname: String,
    #[serde(default)]
    pub multitenant: bool,
    #[serde(default)]
    pub labels: Labels,
}

impl AddClusterRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.name, "name")?;
        reject_supplied(&self.cluster_id, "cluster_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateClusterRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub cluster_id: String,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub control_plane_hostname: Option<String>,
    pub multitenant: Option<bool>,
    pub status: Option<InfraStatus>,
    pub add_labels: Option<Labels>,
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateClusterRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.cluster_id, "cluster_id")
    }
}

impl Cluster {
    pub fn from_request(req: &AddClusterRequest, cluster_id: String) -> SmResult<Self> {
        reject_supplied(&req.cluster_id, "cluster_id")?;
        Ok(Self {
            organization_id: req.organization_id.clone(),
            cluster_id,
            name: req.name.clone(),
            cluster_type: req.cluster_type,
            hostname: req.hostname.clone(),
            control_plane_hostname: req.control_plane_hostname.clone(),
            multitenant: req.multitenant,
            labels: req.labels.clone(),
            status: InfraStatus::Installing,
        })
    }

    pub fn apply_update(&mut self, req: &UpdateClusterRequest) {
        if let Some(name) = &req.name {
            self.name = name.clone();
        }
        if let Some(hostname) = &req.hostname {
            self.hostname = hostname.clone();
        }
        if let Some(cp) = &req.control_plane_hostname {
            self.control_plane_hostname = cp.clone();
        }
        if let Some(multitenant) = req.multitenant {
            self.multitenant = multitenant;
        }
        if let Some(status) = req.status {
            self.status = status;
        }
        apply_label_update(
            &mut self.labels,
            req.add_labels.as_ref(),
            req.remove_labels.as_deref(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cluster_starts_installing() {
        let req = AddClusterRequest {
            organization_id: "org-1".to_string(),
            name: "edge".to_string(),
            ..Default::default()
        };
        let cluster = Cluster::from_request(&req, "c-1".to_string()).unwrap();
        assert_eq!(cluster.status, InfraStatus::Installing);
        assert_eq!(cluster.cluster_id, "c-1");
    }

    #[test]
    fn update_status_and_labels() {
        let req = AddClusterRequest {
            organization_id: "org-1".to_string(),
            name: "edge".to_string(),
            labels: [("zone".to_string(), "a".to_string())].into(),
            ..Default::default()
        };
        let mut cluster = Cluster::from_request(&req, "c-1".to_string()).unwrap();
        cluster.apply_update(&UpdateClusterRequest {
            status: Some(InfraStatus::Running),
            remove_labels: Some(vec!["zone".to_string()]),
            ..Default::default()
        });
        assert_eq!(cluster.status, InfraStatus::Running);
        assert!(cluster.labels.is_empty());
        assert_eq!(cluster.name, "edge");
    }
}
