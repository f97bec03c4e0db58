use async_trait::async_trait;
use parking_lot::Mutex;

use sysmodel_entities::{Cluster, EntityKind, SmResult, SystemModelError};

use super::table::{LinkSet, Table};
use crate::traits::{ClusterProvider, Mutation};

struct State {
    clusters: Table<Cluster>,
    nodes: LinkSet,
}

/// In-memory clusters plus the node ids attached to each.
pub struct MemoryClusterProvider {
    state: Mutex<State>,
}

impl MemoryClusterProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                clusters: Table::new(EntityKind::Cluster),
                nodes: LinkSet::new(EntityKind::Node),
            }),
        }
    }
}

impl Default for MemoryClusterProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterProvider for MemoryClusterProvider {
    async fn add(&self, cluster: &Cluster) -> SmResult<()> {
        self.state
            .lock()
            .clusters
            .insert(&[&cluster.organization_id, &cluster.cluster_id], cluster)
    }

    async fn update(&self, cluster: &Cluster) -> SmResult<()> {
        self.state
            .lock()
            .clusters
            .replace(&[&cluster.organization_id, &cluster.cluster_id], cluster)
    }

    async fn exists(&self, organization_id: &str, cluster_id: &str) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .clusters
            .contains(&[organization_id, cluster_id]))
    }

    async fn get(&self, organization_id: &str, cluster_id: &str) -> SmResult<Cluster> {
        self.state.lock().clusters.get(&[organization_id, cluster_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Cluster>> {
        Ok(self.state.lock().clusters.scan(&[organization_id]))
    }

    async fn modify(
        &self,
        organization_id: &str,
        cluster_id: &str,
        change: Mutation<Cluster>,
    ) -> SmResult<Cluster> {
        self.state
            .lock()
            .clusters
            .modify(&[organization_id, cluster_id], change)
    }

    async fn remove(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        let mut state = self.state.lock();
        state.clusters.remove(&[organization_id, cluster_id])?;
        state.nodes.drop_parent(&[organization_id, cluster_id]);
        Ok(())
    }

    async fn add_node(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<()> {
        let mut state = self.state.lock();
        if !state.clusters.contains(&[organization_id, cluster_id]) {
            return Err(SystemModelError::not_found(
                EntityKind::Cluster,
                &[organization_id, cluster_id],
            ));
        }
        state.nodes.add(&[organization_id, cluster_id], node_id)
    }

    async fn node_exists(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .nodes
            .contains(&[organization_id, cluster_id], node_id))
    }

    async fn list_nodes(&self, organization_id: &str, cluster_id: &str) -> SmResult<Vec<String>> {
        let state = self.state.lock();
        if !state.clusters.contains(&[organization_id, cluster_id]) {
            return Err(SystemModelError::not_found(
                EntityKind::Cluster,
                &[organization_id, cluster_id],
            ));
        }
        Ok(state.nodes.list(&[organization_id, cluster_id]))
    }

    async fn delete_node(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<()> {
        self.state
            .lock()
            .nodes
            .delete(&[organization_id, cluster_id], node_id)
    }

    async fn clear(&self) -> SmResult<()> {
        let mut state = self.state.lock();
        state.clusters.clear();
        state.nodes.clear();
        Ok(())
    }
}
