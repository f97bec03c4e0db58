//! Edge controllers and the assets they manage.

use serde::{Deserialize, Serialize};

use crate::error::SmResult;
use crate::labels::{Labels, apply_label_update};
use crate::validate::{reject_supplied, require};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeController {
    pub organization_id: String,
    pub edge_controller_id: String,
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub location: String,
    /// Hidden controllers are kept for bookkeeping but not shown to tenants.
    pub show: bool,
    pub created: i64,
    #[serde(default)]
    pub last_alive_timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddEdgeControllerRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub edge_controller_id: String,
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub location: String,
}

impl AddEdgeControllerRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.name, "name")?;
        reject_supplied(&self.edge_controller_id, "edge_controller_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateEdgeControllerRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub edge_controller_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub show: Option<bool>,
    pub last_alive_timestamp: Option<i64>,
    pub add_labels: Option<Labels>,
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateEdgeControllerRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.edge_controller_id, "edge_controller_id")
    }
}

impl EdgeController {
    pub fn from_request(
        req: &AddEdgeControllerRequest,
        edge_controller_id: String,
        created: i64,
    ) -> SmResult<Self> {
        reject_supplied(&req.edge_controller_id, "edge_controller_id")?;
        Ok(Self {
            organization_id: req.organization_id.clone(),
            edge_controller_id,
            name: req.name.clone(),
            labels: req.labels.clone(),
            location: req.location.clone(),
            show: true,
            created,
            last_alive_timestamp: 0,
        })
    }

    pub fn apply_update(&mut self, req: &UpdateEdgeControllerRequest) {
        if let Some(name) = &req.name {
            self.name = name.clone();
        }
        if let Some(location) = &req.location {
            self.location = location.clone();
        }
        if let Some(show) = req.show {
            self.show = show;
        }
        if let Some(ts) = req.last_alive_timestamp {
            self.last_alive_timestamp = ts;
        }
        apply_label_update(
            &mut self.labels,
            req.add_labels.as_ref(),
            req.remove_labels.as_deref(),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsClass {
    #[default]
    Linux,
    Windows,
    Darwin,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatingSystemInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub class: OsClass,
    #[serde(default)]
    pub architecture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub organization_id: String,
    /// Empty when the asset is not managed by any controller.
    #[serde(default)]
    pub edge_controller_id: String,
    pub asset_id: String,
    pub agent_id: String,
    pub show: bool,
    pub created: i64,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub os: OperatingSystemInfo,
    #[serde(default)]
    pub last_alive_timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddAssetRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub edge_controller_id: String,
    #[serde(default)]
    pub asset_id: String,
    pub agent_id: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub os: OperatingSystemInfo,
}

impl AddAssetRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.agent_id, "agent_id")?;
        reject_supplied(&self.asset_id, "asset_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateAssetRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub asset_id: String,
    pub show: Option<bool>,
    pub os: Option<OperatingSystemInfo>,
    pub last_alive_timestamp: Option<i64>,
    pub add_labels: Option<Labels>,
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateAssetRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.asset_id, "asset_id")
    }
}

impl Asset {
    pub fn from_request(req: &AddAssetRequest, asset_id: String, created: i64) -> SmResult<Self> {
        reject_supplied(&req.asset_id, "asset_id")?;
        Ok(Self {
            organization_id: req.organization_id.clone(),
            edge_controller_id: req.edge_controller_id.clone(),
            asset_id,
            agent_id: req.agent_id.clone(),
            show: true,
            created,
            labels: req.labels.clone(),
            os: req.os.clone(),
            last_alive_timestamp: 0,
        })
    }

    pub fn apply_update(&mut self, req: &UpdateAssetRequest) {
        if let Some(show) = req.show {
            self.show = show;
        }
        if let Some(os) = &req.os {
            self.os = os.clone();
        }
        if let Some(ts) = req.last_alive_timestamp {
            self.last_alive_timestamp = ts;
        }
        apply_label_update(
            &mut self.labels,
            req.add_labels.as_ref(),
            req.remove_labels.as_deref(),
        );
    }

    pub fn is_managed(&self) -> bool {
        !self.edge_controller_id.is_empty()
    }
}
