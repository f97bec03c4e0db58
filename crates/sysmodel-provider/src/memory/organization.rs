use async_trait::async_trait;
use parking_lot::Mutex;

use sysmodel_entities::{EntityKind, Organization, SmResult, SystemModelError};

use super::table::{LinkSet, Table};
use crate::traits::{Mutation, OrganizationProvider};

struct State {
    orgs: Table<Organization>,
    clusters: LinkSet,
    roles: LinkSet,
}

impl State {
    fn require_org(&self, organization_id: &str) -> SmResult<()> {
        if self.orgs.contains(&[organization_id]) {
            Ok(())
        } else {
            Err(SystemModelError::not_found(
                EntityKind::Organization,
                &[organization_id],
            ))
        }
    }
}

/// In-memory organizations plus their cluster and role linkage sets.
pub struct MemoryOrganizationProvider {
    state: Mutex<State>,
}

impl MemoryOrganizationProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                orgs: Table::new(EntityKind::Organization),
                clusters: LinkSet::new(EntityKind::Cluster),
                roles: LinkSet::new(EntityKind::Role),
            }),
        }
    }
}

impl Default for MemoryOrganizationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrganizationProvider for MemoryOrganizationProvider {
    async fn add(&self, org: &Organization) -> SmResult<()> {
        self.state.lock().orgs.insert(&[&org.organization_id], org)
    }

    async fn update(&self, org: &Organization) -> SmResult<()> {
        self.state.lock().orgs.replace(&[&org.organization_id], org)
    }

    async fn exists(&self, organization_id: &str) -> SmResult<bool> {
        Ok(self.state.lock().orgs.contains(&[organization_id]))
    }

    async fn get(&self, organization_id: &str) -> SmResult<Organization> {
        self.state.lock().orgs.get(&[organization_id])
    }

    async fn list(&self) -> SmResult<Vec<Organization>> {
        Ok(self.state.lock().orgs.all())
    }

    async fn modify(
        &self,
        organization_id: &str,
        change: Mutation<Organization>,
    ) -> SmResult<Organization> {
        self.state.lock().orgs.modify(&[organization_id], change)
    }

    async fn remove(&self, organization_id: &str) -> SmResult<()> {
        let mut state = self.state.lock();
        state.orgs.remove(&[organization_id])?;
        state.clusters.drop_parent(&[organization_id]);
        state.roles.drop_parent(&[organization_id]);
        Ok(())
    }

    async fn add_cluster(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        let mut state = self.state.lock();
        state.require_org(organization_id)?;
        state.clusters.add(&[organization_id], cluster_id)
    }

    async fn cluster_exists(&self, organization_id: &str, cluster_id: &str) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .clusters
            .contains(&[organization_id], cluster_id))
    }

    async fn list_clusters(&self, organization_id: &str) -> SmResult<Vec<String>> {
        let state = self.state.lock();
        state.require_org(organization_id)?;
        Ok(state.clusters.list(&[organization_id]))
    }

    async fn delete_cluster(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        self.state
            .lock()
            .clusters
            .delete(&[organization_id], cluster_id)
    }

    async fn add_role(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        let mut state = self.state.lock();
        state.require_org(organization_id)?;
        state.roles.add(&[organization_id], role_id)
    }

    async fn role_exists(&self, organization_id: &str, role_id: &str) -> SmResult<bool> {
        Ok(self.state.lock().roles.contains(&[organization_id], role_id))
    }

    async fn list_roles(&self, organization_id: &str) -> SmResult<Vec<String>> {
        let state = self.state.lock();
        state.require_org(organization_id)?;
        Ok(state.roles.list(&[organization_id]))
    }

    async fn delete_role(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        self.state.lock().roles.delete(&[organization_id], role_id)
    }

    async fn clear(&self) -> SmResult<()> {
        let mut state = self.state.lock();
        state.orgs.clear();
        state.clusters.clear();
        state.roles.clear();
        Ok(())
    }
}
