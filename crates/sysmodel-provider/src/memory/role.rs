use async_trait::async_trait;
use parking_lot::Mutex;

use sysmodel_entities::{EntityKind, Role, SmResult};

use super::table::Table;
use crate::traits::{Mutation, RoleProvider};

/// In-memory role rows, keyed by `(organization_id, role_id)`.
///
/// A row here does not make a role part of its organization; the
/// organization's role set does.
pub struct MemoryRoleProvider {
    rows: Mutex<Table<Role>>,
}

impl MemoryRoleProvider {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Table::new(EntityKind::Role)),
        }
    }
}

impl Default for MemoryRoleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleProvider for MemoryRoleProvider {
    async fn add(&self, role: &Role) -> SmResult<()> {
        self.rows
            .lock()
            .insert(&[&role.organization_id, &role.role_id], role)
    }

    async fn update(&self, role: &Role) -> SmResult<()> {
        self.rows
            .lock()
            .replace(&[&role.organization_id, &role.role_id], role)
    }

    async fn exists(&self, organization_id: &str, role_id: &str) -> SmResult<bool> {
        Ok(self.rows.lock().contains(&[organization_id, role_id]))
    }

    async fn get(&self, organization_id: &str, role_id: &str) -> SmResult<Role> {
        self.rows.lock().get(&[organization_id, role_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Role>> {
        Ok(self.rows.lock().scan(&[organization_id]))
    }

    async fn modify(
        &self,
        organization_id: &str,
        role_id: &str,
        change: Mutation<Role>,
    ) -> SmResult<Role> {
        self.rows.lock().modify(&[organization_id, role_id], change)
    }

    async fn remove(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        self.rows.lock().remove(&[organization_id, role_id]).map(|_| ())
    }

    async fn clear(&self) -> SmResult<()> {
        self.rows.lock().clear();
        Ok(())
    }
}
