use async_trait::async_trait;

use sysmodel_entities::{EntityKind, Node, SmResult};

use super::store::RedbStore;
use super::tables::NODES;
use crate::traits::{Mutation, NodeProvider};

pub struct RedbNodeProvider {
    store: RedbStore,
}

impl RedbNodeProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NodeProvider for RedbNodeProvider {
    async fn add(&self, node: &Node) -> SmResult<()> {
        self.store.insert(
            NODES,
            EntityKind::Node,
            &[&node.organization_id, &node.node_id],
            node,
        )
    }

    async fn update(&self, node: &Node) -> SmResult<()> {
        self.store.replace(
            NODES,
            EntityKind::Node,
            &[&node.organization_id, &node.node_id],
            node,
        )
    }

    async fn exists(&self, organization_id: &str, node_id: &str) -> SmResult<bool> {
        self.store.contains(NODES, &[organization_id, node_id])
    }

    async fn get(&self, organization_id: &str, node_id: &str) -> SmResult<Node> {
        self.store
            .fetch(NODES, EntityKind::Node, &[organization_id, node_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Node>> {
        let mut rows: Vec<Node> = self.store.scan(NODES, &[organization_id])?;
        rows.retain(|r| r.organization_id == organization_id);
        Ok(rows)
    }

    async fn modify(
        &self,
        organization_id: &str,
        node_id: &str,
        change: Mutation<Node>,
    ) -> SmResult<Node> {
        self.store
            .modify(NODES, EntityKind::Node, &[organization_id, node_id], change)
    }

    async fn remove(&self, organization_id: &str, node_id: &str) -> SmResult<()> {
        self.store
            .remove(NODES, EntityKind::Node, &[organization_id, node_id])
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[NODES])
    }
}
