use async_trait::async_trait;
use parking_lot::Mutex;

use sysmodel_entities::{Asset, EdgeController, EntityKind, SmResult};

use super::table::Table;
use crate::traits::{AssetProvider, EdgeControllerProvider, Mutation};

pub struct MemoryEdgeControllerProvider {
    rows: Mutex<Table<EdgeController>>,
}

impl MemoryEdgeControllerProvider {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Table::new(EntityKind::EdgeController)),
        }
    }
}

impl Default for MemoryEdgeControllerProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeControllerProvider for MemoryEdgeControllerProvider {
    async fn add(&self, controller: &EdgeController) -> SmResult<()> {
        self.rows.lock().insert(
            &[&controller.organization_id, &controller.edge_controller_id],
            controller,
        )
    }

    async fn update(&self, controller: &EdgeController) -> SmResult<()> {
        self.rows.lock().replace(
            &[&controller.organization_id, &controller.edge_controller_id],
            controller,
        )
    }

    async fn exists(&self, organization_id: &str, edge_controller_id: &str) -> SmResult<bool> {
        Ok(self
            .rows
            .lock()
            .contains(&[organization_id, edge_controller_id]))
    }

    async fn get(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
    ) -> SmResult<EdgeController> {
        self.rows.lock().get(&[organization_id, edge_controller_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<EdgeController>> {
        Ok(self.rows.lock().scan(&[organization_id]))
    }

    async fn modify(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
        change: Mutation<EdgeController>,
    ) -> SmResult<EdgeController> {
        self.rows
            .lock()
            .modify(&[organization_id, edge_controller_id], change)
    }

    async fn remove(&self, organization_id: &str, edge_controller_id: &str) -> SmResult<()> {
        self.rows
            .lock()
            .remove(&[organization_id, edge_controller_id])
            .map(|_| ())
    }

    async fn clear(&self) -> SmResult<()> {
        self.rows.lock().clear();
        Ok(())
    }
}

/// In-memory assets. The owning controller is an attribute, not part of the key.
pub struct MemoryAssetProvider {
    rows: Mutex<Table<Asset>>,
}

impl MemoryAssetProvider {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Table::new(EntityKind::Asset)),
        }
    }
}

impl Default for MemoryAssetProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetProvider for MemoryAssetProvider {
    async fn add(&self, asset: &Asset) -> SmResult<()> {
        self.rows
            .lock()
            .insert(&[&asset.organization_id, &asset.asset_id], asset)
    }

    async fn update(&self, asset: &Asset) -> SmResult<()> {
        self.rows
            .lock()
            .replace(&[&asset.organization_id, &asset.asset_id], asset)
    }

    async fn exists(&self, organization_id: &str, asset_id: &str) -> SmResult<bool> {
        Ok(self.rows.lock().contains(&[organization_id, asset_id]))
    }

    async fn get(&self, organization_id: &str, asset_id: &str) -> SmResult<Asset> {
        self.rows.lock().get(&[organization_id, asset_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Asset>> {
        Ok(self.rows.lock().scan(&[organization_id]))
    }

    async fn modify(
        &self,
        organization_id: &str,
        asset_id: &str,
        change: Mutation<Asset>,
    ) -> SmResult<Asset> {
        self.rows.lock().modify(&[organization_id, asset_id], change)
    }

    async fn list_controller_assets(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
    ) -> SmResult<Vec<Asset>> {
        let mut assets = self.rows.lock().scan(&[organization_id]);
        assets.retain(|a| a.edge_controller_id == edge_controller_id);
        Ok(assets)
    }

    async fn remove(&self, organization_id: &str, asset_id: &str) -> SmResult<()> {
        self.rows
            .lock()
            .remove(&[organization_id, asset_id])
            .map(|_| ())
    }

    async fn clear(&self) -> SmResult<()> {
        self.rows.lock().clear();
        Ok(())
    }
}
