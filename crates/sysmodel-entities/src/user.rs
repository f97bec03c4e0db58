//! Users of an organization, keyed by email.

use serde::{Deserialize, Serialize};

use crate::error::SmResult;
use crate::validate::require;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub organization_id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub photo_base64: String,
    pub member_since: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddUserRequest {
    #[serde(default)]
    pub organization_id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub photo_base64: String,
}

impl AddUserRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.email, "email")?;
        require(&self.name, "name")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub email: String,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub photo_base64: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.email, "email")
    }
}

impl User {
    /// Users are keyed by the caller-chosen email, so nothing is generated
    /// here besides the membership timestamp.
    pub fn from_request(req: &AddUserRequest, member_since: i64) -> Self {
        Self {
            organization_id: req.organization_id.clone(),
            email: req.email.clone(),
            name: req.name.clone(),
            last_name: req.last_name.clone(),
            title: req.title.clone(),
            phone: req.phone.clone(),
            location: req.location.clone(),
            photo_base64: req.photo_base64.clone(),
            member_since,
        }
    }

    pub fn apply_update(&mut self, req: &UpdateUserRequest) {
        let fields = [
            (&mut self.name, &req.name),
            (&mut self.last_name, &req.last_name),
            (&mut self.title, &req.title),
            (&mut self.phone, &req.phone),
            (&mut self.location, &req.location),
            (&mut self.photo_base64, &req.photo_base64),
        ];
        for (field, update) in fields {
            if let Some(value) = update {
                *field = value.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_requires_email_and_name() {
        let mut req = AddUserRequest {
            organization_id: "org-1".to_string(),
            email: "a@b.c".to_string(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        req.name = "Ann".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_sets_phone_only() {
        let req = AddUserRequest {
            organization_id: "org-1".to_string(),
            email: "a@b.c".to_string(),
            name: "Ann".to_string(),
            title: "CTO".to_string(),
            ..Default::default()
        };
        let mut user = User::from_request(&req, 42);
        user.apply_update(&UpdateUserRequest {
            phone: Some("555".to_string()),
            ..Default::default()
        });
        assert_eq!(user.phone, "555");
        assert_eq!(user.title, "CTO");
        assert_eq!(user.member_since, 42);
    }
}
