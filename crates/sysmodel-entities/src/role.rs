//! Roles and the access primitives they grant.

use serde::{Deserialize, Serialize};

use crate::error::SmResult;
use crate::validate::{reject_supplied, require};

/// Platform capability a role may grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPrimitive {
    Org,
    Apps,
    Resources,
    Profile,
    AppCluster,
    Devices,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub organization_id: String,
    pub role_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Internal roles are managed by the platform and hidden from tenants.
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub primitives: Vec<AccessPrimitive>,
    pub created: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddRoleRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub role_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub primitives: Vec<AccessPrimitive>,
}

impl AddRoleRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.name, "name")?;
        reject_supplied(&self.role_id, "role_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub role_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub primitives: Option<Vec<AccessPrimitive>>,
}

impl UpdateRoleRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.role_id, "role_id")
    }
}

impl Role {
    pub fn from_request(req: &AddRoleRequest, role_id: String, created: i64) -> SmResult<Self> {
        reject_supplied(&req.role_id, "role_id")?;
        let mut primitives = Vec::with_capacity(req.primitives.len());
        for p in &req.primitives {
            if !primitives.contains(p) {
                primitives.push(*p);
            }
        }
        Ok(Self {
            organization_id: req.organization_id.clone(),
            role_id,
            name: req.name.clone(),
            description: req.description.clone(),
            internal: req.internal,
            primitives,
            created,
        })
    }

    pub fn apply_update(&mut self, req: &UpdateRoleRequest) {
        if let Some(name) = &req.name {
            self.name = name.clone();
        }
        if let Some(description) = &req.description {
            self.description = description.clone();
        }
        if let Some(primitives) = &req.primitives {
            self.primitives = primitives.clone();
        }
    }

    pub fn grants(&self, primitive: AccessPrimitive) -> bool {
        self.primitives.contains(&primitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_primitives_collapse() {
        let req = AddRoleRequest {
            organization_id: "org-1".to_string(),
            name: "admin".to_string(),
            primitives: vec![AccessPrimitive::Org, AccessPrimitive::Apps, AccessPrimitive::Org],
            ..Default::default()
        };
        let role = Role::from_request(&req, "role-1".to_string(), 5).unwrap();
        assert_eq!(role.primitives, vec![AccessPrimitive::Org, AccessPrimitive::Apps]);
        assert!(role.grants(AccessPrimitive::Apps));
        assert!(!role.grants(AccessPrimitive::Devices));
    }

    #[test]
    fn update_can_clear_primitives() {
        let req = AddRoleRequest {
            organization_id: "org-1".to_string(),
            name: "ops".to_string(),
            primitives: vec![AccessPrimitive::Resources],
            ..Default::default()
        };
        let mut role = Role::from_request(&req, "role-1".to_string(), 5).unwrap();
        role.apply_update(&UpdateRoleRequest {
            primitives: Some(vec![]),
            ..Default::default()
        });
        assert!(role.primitives.is_empty());
        assert_eq!(role.name, "ops");
    }

    #[test]
    fn primitives_use_snake_case_on_the_wire() {
        let json = serde_json::to_string(&AccessPrimitive::AppCluster).unwrap();
        assert_eq!(json, "\"app_cluster\"");
    }
}
