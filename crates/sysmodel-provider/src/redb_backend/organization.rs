use async_trait::async_trait;

use sysmodel_entities::{EntityKind, Organization, SmResult, SystemModelError};

use super::store::{RedbStore, Writer};
use super::tables::{ORGANIZATION_CLUSTERS, ORGANIZATION_ROLES, ORGANIZATIONS};
use crate::traits::{Mutation, OrganizationProvider};

pub struct RedbOrganizationProvider {
    store: RedbStore,
}

impl RedbOrganizationProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

fn require_org(w: &Writer<'_>, organization_id: &str) -> SmResult<()> {
    if w.contains(ORGANIZATIONS, &[organization_id])? {
        Ok(())
    } else {
        Err(SystemModelError::not_found(
            EntityKind::Organization,
            &[organization_id],
        ))
    }
}

#[async_trait]
impl OrganizationProvider for RedbOrganizationProvider {
    async fn add(&self, org: &Organization) -> SmResult<()> {
        self.store.insert(
            ORGANIZATIONS,
            EntityKind::Organization,
            &[&org.organization_id],
            org,
        )
    }

    async fn update(&self, org: &Organization) -> SmResult<()> {
        self.store.replace(
            ORGANIZATIONS,
            EntityKind::Organization,
            &[&org.organization_id],
            org,
        )
    }

    async fn exists(&self, organization_id: &str) -> SmResult<bool> {
        self.store.contains(ORGANIZATIONS, &[organization_id])
    }

    async fn get(&self, organization_id: &str) -> SmResult<Organization> {
        self.store
            .fetch(ORGANIZATIONS, EntityKind::Organization, &[organization_id])
    }

    async fn list(&self) -> SmResult<Vec<Organization>> {
        self.store.scan(ORGANIZATIONS, &[])
    }

    async fn modify(
        &self,
        organization_id: &str,
        change: Mutation<Organization>,
    ) -> SmResult<Organization> {
        self.store.modify(
            ORGANIZATIONS,
            EntityKind::Organization,
            &[organization_id],
            change,
        )
    }

    async fn remove(&self, organization_id: &str) -> SmResult<()> {
        self.store.write(|w| {
            w.remove(ORGANIZATIONS, EntityKind::Organization, &[organization_id])?;
            w.remove_prefix(ORGANIZATION_CLUSTERS, &[organization_id])?;
            w.remove_prefix(ORGANIZATION_ROLES, &[organization_id])?;
            Ok(())
        })
    }

    async fn add_cluster(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        self.store.write(|w| {
            require_org(w, organization_id)?;
            w.link(
                ORGANIZATION_CLUSTERS,
                EntityKind::Cluster,
                &[organization_id],
                cluster_id,
            )
        })
    }

    async fn cluster_exists(&self, organization_id: &str, cluster_id: &str) -> SmResult<bool> {
        self.store
            .contains(ORGANIZATION_CLUSTERS, &[organization_id, cluster_id])
    }

    async fn list_clusters(&self, organization_id: &str) -> SmResult<Vec<String>> {
        self.store.read(|r| {
            if !r.contains(ORGANIZATIONS, &[organization_id])? {
                return Err(SystemModelError::not_found(
                    EntityKind::Organization,
                    &[organization_id],
                ));
            }
            r.children(ORGANIZATION_CLUSTERS, &[organization_id])
        })
    }

    async fn delete_cluster(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        self.store.write(|w| {
            w.unlink(
                ORGANIZATION_CLUSTERS,
                EntityKind::Cluster,
                &[organization_id],
                cluster_id,
            )
        })
    }

    async fn add_role(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        self.store.write(|w| {
            require_org(w, organization_id)?;
            w.link(
                ORGANIZATION_ROLES,
                EntityKind::Role,
                &[organization_id],
                role_id,
            )
        })
    }

    async fn role_exists(&self, organization_id: &str, role_id: &str) -> SmResult<bool> {
        self.store
            .contains(ORGANIZATION_ROLES, &[organization_id, role_id])
    }

    async fn list_roles(&self, organization_id: &str) -> SmResult<Vec<String>> {
        self.store.read(|r| {
            if !r.contains(ORGANIZATIONS, &[organization_id])? {
                return Err(SystemModelError::not_found(
                    EntityKind::Organization,
                    &[organization_id],
                ));
            }
            r.children(ORGANIZATION_ROLES, &[organization_id])
        })
    }

    async fn delete_role(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        self.store.write(|w| {
            w.unlink(
                ORGANIZATION_ROLES,
                EntityKind::Role,
                &[organization_id],
                role_id,
            )
        })
    }

    async fn clear(&self) -> SmResult<()> {
        self.store
            .clear(&[ORGANIZATIONS, ORGANIZATION_CLUSTERS, ORGANIZATION_ROLES])
    }
}
