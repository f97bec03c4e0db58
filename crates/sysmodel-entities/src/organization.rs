//! Organizations: the tenant boundary every other entity hangs off.

use serde::{Deserialize, Serialize};

use crate::error::{SmResult, SystemModelError};
use crate::validate::{reject_supplied, require};

/// A tenant of the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub photo_base64: String,
    /// Unix timestamp (seconds) of creation.
    pub created: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddOrganizationRequest {
    /// Assigned by the system; must be left empty.
    #[serde(default)]
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub photo_base64: String,
}

impl AddOrganizationRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.name, "name")?;
        reject_supplied(&self.organization_id, "organization_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateOrganizationRequest {
    #[serde(default)]
    pub organization_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub full_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub photo_base64: Option<String>,
}

impl UpdateOrganizationRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        if matches!(self.name.as_deref(), Some("")) {
            return Err(SystemModelError::invalid("name must not be set to empty"));
        }
        Ok(())
    }
}

impl Organization {
    pub fn from_request(
        req: &AddOrganizationRequest,
        organization_id: String,
        created: i64,
    ) -> SmResult<Self> {
        reject_supplied(&req.organization_id, "organization_id")?;
        Ok(Self {
            organization_id,
            name: req.name.clone(),
            email: req.email.clone(),
            full_address: req.full_address.clone(),
            city: req.city.clone(),
            state: req.state.clone(),
            country: req.country.clone(),
            zip_code: req.zip_code.clone(),
            photo_base64: req.photo_base64.clone(),
            created,
        })
    }

    pub fn apply_update(&mut self, req: &UpdateOrganizationRequest) {
        let fields = [
            (&mut self.name, &req.name),
            (&mut self.email, &req.email),
            (&mut self.full_address, &req.full_address),
            (&mut self.city, &req.city),
            (&mut self.state, &req.state),
            (&mut self.country, &req.country),
            (&mut self.zip_code, &req.zip_code),
            (&mut self.photo_base64, &req.photo_base64),
        ];
        for (field, update) in fields {
            if let Some(value) = update {
                *field = value.clone();
            }
        }
    }
}
