use async_trait::async_trait;

use sysmodel_entities::{EntityKind, Role, SmResult};

use super::store::RedbStore;
use super::tables::ROLES;
use crate::traits::{Mutation, RoleProvider};

pub struct RedbRoleProvider {
    store: RedbStore,
}

impl RedbRoleProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleProvider for RedbRoleProvider {
    async fn add(&self, role: &Role) -> SmResult<()> {
        self.store.insert(
            ROLES,
            EntityKind::Role,
            &[&role.organization_id, &role.role_id],
            role,
        )
    }

    async fn update(&self, role: &Role) -> SmResult<()> {
        self.store.replace(
            ROLES,
            EntityKind::Role,
            &[&role.organization_id, &role.role_id],
            role,
        )
    }

    async fn exists(&self, organization_id: &str, role_id: &str) -> SmResult<bool> {
        self.store.contains(ROLES, &[organization_id, role_id])
    }

    async fn get(&self, organization_id: &str, role_id: &str) -> SmResult<Role> {
        self.store
            .fetch(ROLES, EntityKind::Role, &[organization_id, role_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Role>> {
        let mut rows: Vec<Role> = self.store.scan(ROLES, &[organization_id])?;
        rows.retain(|r| r.organization_id == organization_id);
        Ok(rows)
    }

    async fn modify(
        &self,
        organization_id: &str,
        role_id: &str,
        change: Mutation<Role>,
    ) -> SmResult<Role> {
        self.store
            .modify(ROLES, EntityKind::Role, &[organization_id, role_id], change)
    }

    async fn remove(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        self.store
            .remove(ROLES, EntityKind::Role, &[organization_id, role_id])
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[ROLES])
    }
}
