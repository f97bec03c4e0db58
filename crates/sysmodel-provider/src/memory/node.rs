use async_trait::async_trait;
use parking_lot::Mutex;

use sysmodel_entities::{EntityKind, Node, SmResult};

use super::table::Table;
use crate::traits::{Mutation, NodeProvider};

/// In-memory nodes, keyed by `(organization_id, node_id)`.
pub struct MemoryNodeProvider {
    rows: Mutex<Table<Node>>,
}

impl MemoryNodeProvider {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Table::new(EntityKind::Node)),
        }
    }
}

impl Default for MemoryNodeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeProvider for MemoryNodeProvider {
    async fn add(&self, node: &Node) -> SmResult<()> {
        self.rows
            .lock()
            .insert(&[&node.organization_id, &node.node_id], node)
    }

    async fn update(&self, node: &Node) -> SmResult<()> {
        self.rows
            .lock()
            .replace(&[&node.organization_id, &node.node_id], node)
    }

    async fn exists(&self, organization_id: &str, node_id: &str) -> SmResult<bool> {
        Ok(self.rows.lock().contains(&[organization_id, node_id]))
    }

    async fn get(&self, organization_id: &str, node_id: &str) -> SmResult<Node> {
        self.rows.lock().get(&[organization_id, node_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Node>> {
        Ok(self.rows.lock().scan(&[organization_id]))
    }

    async fn modify(
        &self,
        organization_id: &str,
        node_id: &str,
        change: Mutation<Node>,
    ) -> SmResult<Node> {
        self.rows.lock().modify(&[organization_id, node_id], change)
    }

    async fn remove(&self, organization_id: &str, node_id: &str) -> SmResult<()> {
        self.rows.lock().remove(&[organization_id, node_id]).map(|_| ())
    }

    async fn clear(&self) -> SmResult<()> {
        self.rows.lock().clear();
        Ok(())
    }
}
