use async_trait::async_trait;

use sysmodel_entities::{Cluster, EntityKind, SmResult, SystemModelError};

use super::store::RedbStore;
use super::tables::{CLUSTER_NODES, CLUSTERS};
use crate::traits::{ClusterProvider, Mutation};

pub struct RedbClusterProvider {
    store: RedbStore,
}

impl RedbClusterProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

fn cluster_not_found(organization_id: &str, cluster_id: &str) -> SystemModelError {
    SystemModelError::not_found(EntityKind::Cluster, &[organization_id, cluster_id])
}

#[async_trait]
impl ClusterProvider for RedbClusterProvider {
    async fn add(&self, cluster: &Cluster) -> SmResult<()> {
        self.store.insert(
            CLUSTERS,
            EntityKind::Cluster,
            &[&cluster.organization_id, &cluster.cluster_id],
            cluster,
        )
    }

    async fn update(&self, cluster: &Cluster) -> SmResult<()> {
        self.store.replace(
            CLUSTERS,
            EntityKind::Cluster,
            &[&cluster.organization_id, &cluster.cluster_id],
            cluster,
        )
    }

    async fn exists(&self, organization_id: &str, cluster_id: &str) -> SmResult<bool> {
        self.store.contains(CLUSTERS, &[organization_id, cluster_id])
    }

    async fn get(&self, organization_id: &str, cluster_id: &str) -> SmResult<Cluster> {
        self.store
            .fetch(CLUSTERS, EntityKind::Cluster, &[organization_id, cluster_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Cluster>> {
        let mut clusters: Vec<Cluster> = self.store.scan(CLUSTERS, &[organization_id])?;
        clusters.retain(|c| c.organization_id == organization_id);
        Ok(clusters)
    }

    async fn modify(
        &self,
        organization_id: &str,
        cluster_id: &str,
        change: Mutation<Cluster>,
    ) -> SmResult<Cluster> {
        self.store.modify(
            CLUSTERS,
            EntityKind::Cluster,
            &[organization_id, cluster_id],
            change,
        )
    }

    async fn remove(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        self.store.write(|w| {
            w.remove(CLUSTERS, EntityKind::Cluster, &[organization_id, cluster_id])?;
            w.remove_prefix(CLUSTER_NODES, &[organization_id, cluster_id])?;
            Ok(())
        })
    }

    async fn add_node(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<()> {
        self.store.write(|w| {
            if !w.contains(CLUSTERS, &[organization_id, cluster_id])? {
                return Err(cluster_not_found(organization_id, cluster_id));
            }
            w.link(
                CLUSTER_NODES,
                EntityKind::Node,
                &[organization_id, cluster_id],
                node_id,
            )
        })
    }

    async fn node_exists(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<bool> {
        self.store
            .contains(CLUSTER_NODES, &[organization_id, cluster_id, node_id])
    }

    async fn list_nodes(&self, organization_id: &str, cluster_id: &str) -> SmResult<Vec<String>> {
        self.store.read(|r| {
            if !r.contains(CLUSTERS, &[organization_id, cluster_id])? {
                return Err(cluster_not_found(organization_id, cluster_id));
            }
            r.children(CLUSTER_NODES, &[organization_id, cluster_id])
        })
    }

    async fn delete_node(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<()> {
        self.store.write(|w| {
            w.unlink(
                CLUSTER_NODES,
                EntityKind::Node,
                &[organization_id, cluster_id],
                node_id,
            )
        })
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[CLUSTERS, CLUSTER_NODES])
    }
}
