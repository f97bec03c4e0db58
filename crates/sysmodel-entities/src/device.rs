//! Device groups and the devices registered inside them.

use serde::{Deserialize, Serialize};

use crate::error::SmResult;
use crate::labels::{Labels, apply_label_update};
use crate::validate::{reject_supplied, require};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceGroup {
    pub organization_id: String,
    pub device_group_id: String,
    pub name: String,
    pub enabled: bool,
    /// Connectivity new devices in this group start with.
    pub default_device_connectivity: bool,
    /// Secret devices present when joining the group.
    pub device_group_api_key: String,
    #[serde(default)]
    pub labels: Labels,
    pub created: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddDeviceGroupRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub device_group_id: String,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub default_device_connectivity: bool,
    #[serde(default)]
    pub labels: Labels,
}

impl AddDeviceGroupRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.name, "name")?;
        reject_supplied(&self.device_group_id, "device_group_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateDeviceGroupRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub device_group_id: String,
    pub enabled: Option<bool>,
    pub default_device_connectivity: Option<bool>,
    pub add_labels: Option<Labels>,
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateDeviceGroupRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.device_group_id, "device_group_id")
    }
}

impl DeviceGroup {
    pub fn from_request(
        req: &AddDeviceGroupRequest,
        device_group_id: String,
        api_key: String,
        created: i64,
    ) -> SmResult<Self> {
        reject_supplied(&req.device_group_id, "device_group_id")?;
        Ok(Self {
            organization_id: req.organization_id.clone(),
            device_group_id,
            name: req.name.clone(),
            enabled: req.enabled,
            default_device_connectivity: req.default_device_connectivity,
            device_group_api_key: api_key,
            labels: req.labels.clone(),
            created,
        })
    }

    pub fn apply_update(&mut self, req: &UpdateDeviceGroupRequest) {
        if let Some(enabled) = req.enabled {
            self.enabled = enabled;
        }
        if let Some(connectivity) = req.default_device_connectivity {
            self.default_device_connectivity = connectivity;
        }
        apply_label_update(
            &mut self.labels,
            req.add_labels.as_ref(),
            req.remove_labels.as_deref(),
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    pub organization_id: String,
    pub device_group_id: String,
    pub device_id: String,
    #[serde(default)]
    pub labels: Labels,
    pub enabled: bool,
    pub register_since: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddDeviceRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub device_group_id: String,
    /// Chosen by the device itself when it registers.
    pub device_id: String,
    #[serde(default)]
    pub labels: Labels,
}

impl AddDeviceRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.device_group_id, "device_group_id")?;
        require(&self.device_id, "device_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateDeviceRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub device_group_id: String,
    #[serde(default)]
    pub device_id: String,
    pub enabled: Option<bool>,
    pub add_labels: Option<Labels>,
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateDeviceRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.device_group_id, "device_group_id")?;
        require(&self.device_id, "device_id")
    }
}

impl Device {
    /// New devices inherit their group's default connectivity.
    pub fn from_request(req: &AddDeviceRequest, group: &DeviceGroup, register_since: i64) -> Self {
        Self {
            organization_id: req.organization_id.clone(),
            device_group_id: req.device_group_id.clone(),
            device_id: req.device_id.clone(),
            labels: req.labels.clone(),
            enabled: group.default_device_connectivity,
            register_since,
        }
    }

    pub fn apply_update(&mut self, req: &UpdateDeviceRequest) {
        if let Some(enabled) = req.enabled {
            self.enabled = enabled;
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

    fn group(connectivity: bool) -> DeviceGroup {
        let req = AddDeviceGroupRequest {
            organization_id: "org-1".to_string(),
            name: "sensors".to_string(),
            enabled: true,
            default_device_connectivity: connectivity,
            ..Default::default()
        };
        DeviceGroup::from_request(&req, "dg-1".to_string(), "key".to_string(), 1).unwrap()
    }

    #[test]
    fn device_inherits_group_connectivity() {
        let req = AddDeviceRequest {
            organization_id: "org-1".to_string(),
            device_group_id: "dg-1".to_string(),
            device_id: "thermo-7".to_string(),
            ..Default::default()
        };
        assert!(Device::from_request(&req, &group(true), 3).enabled);
        assert!(!Device::from_request(&req, &group(false), 3).enabled);
    }

    #[test]
    fn group_rejects_supplied_id() {
        let req = AddDeviceGroupRequest {
            organization_id: "org-1".to_string(),
            device_group_id: "mine".to_string(),
            name: "sensors".to_string(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(DeviceGroup::from_request(&req, "dg-1".to_string(), "k".to_string(), 1).is_err());
    }

    #[test]
    fn group_update_keeps_api_key() {
        let mut g = group(false);
        g.apply_update(&UpdateDeviceGroupRequest {
            enabled: Some(false),
            default_device_connectivity: Some(true),
            ..Default::default()
        });
        assert!(!g.enabled);
        assert!(g.default_device_connectivity);
        assert_eq!(g.device_group_api_key, "key");
    }

    #[test]
    fn device_requires_its_own_id() {
        let req = AddDeviceRequest {
            organization_id: "org-1".to_string(),
            device_group_id: "dg-1".to_string(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
