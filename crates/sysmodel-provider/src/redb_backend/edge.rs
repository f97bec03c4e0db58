use async_trait::async_trait;

use sysmodel_entities::{Asset, EdgeController, EntityKind, SmResult};

use super::store::RedbStore;
use super::tables::{ASSETS, EDGE_CONTROLLERS};
use crate::traits::{AssetProvider, EdgeControllerProvider, Mutation};

pub struct RedbEdgeControllerProvider {
    store: RedbStore,
}

impl RedbEdgeControllerProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EdgeControllerProvider for RedbEdgeControllerProvider {
    async fn add(&self, controller: &EdgeController) -> SmResult<()> {
        self.store.insert(
            EDGE_CONTROLLERS,
            EntityKind::EdgeController,
            &[&controller.organization_id, &controller.edge_controller_id],
            controller,
        )
    }

    async fn update(&self, controller: &EdgeController) -> SmResult<()> {
        self.store.replace(
            EDGE_CONTROLLERS,
            EntityKind::EdgeController,
            &[&controller.organization_id, &controller.edge_controller_id],
            controller,
        )
    }

    async fn exists(&self, organization_id: &str, edge_controller_id: &str) -> SmResult<bool> {
        self.store
            .contains(EDGE_CONTROLLERS, &[organization_id, edge_controller_id])
    }

    async fn get(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
    ) -> SmResult<EdgeController> {
        self.store.fetch(
            EDGE_CONTROLLERS,
            EntityKind::EdgeController,
            &[organization_id, edge_controller_id],
        )
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<EdgeController>> {
        let mut rows: Vec<EdgeController> =
            self.store.scan(EDGE_CONTROLLERS, &[organization_id])?;
        rows.retain(|c| c.organization_id == organization_id);
        Ok(rows)
    }

    async fn modify(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
        change: Mutation<EdgeController>,
    ) -> SmResult<EdgeController> {
        self.store.modify(
            EDGE_CONTROLLERS,
            EntityKind::EdgeController,
            &[organization_id, edge_controller_id],
            change,
        )
    }

    async fn remove(&self, organization_id: &str, edge_controller_id: &str) -> SmResult<()> {
        self.store.remove(
            EDGE_CONTROLLERS,
            EntityKind::EdgeController,
            &[organization_id, edge_controller_id],
        )
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[EDGE_CONTROLLERS])
    }
}

pub struct RedbAssetProvider {
    store: RedbStore,
}

impl RedbAssetProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AssetProvider for RedbAssetProvider {
    async fn add(&self, asset: &Asset) -> SmResult<()> {
        self.store.insert(
            ASSETS,
            EntityKind::Asset,
            &[&asset.organization_id, &asset.asset_id],
            asset,
        )
    }

    async fn update(&self, asset: &Asset) -> SmResult<()> {
        self.store.replace(
            ASSETS,
            EntityKind::Asset,
            &[&asset.organization_id, &asset.asset_id],
            asset,
        )
    }

    async fn exists(&self, organization_id: &str, asset_id: &str) -> SmResult<bool> {
        self.store.contains(ASSETS, &[organization_id, asset_id])
    }

    async fn get(&self, organization_id: &str, asset_id: &str) -> SmResult<Asset> {
        self.store
            .fetch(ASSETS, EntityKind::Asset, &[organization_id, asset_id])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<Asset>> {
        let mut rows: Vec<Asset> = self.store.scan(ASSETS, &[organization_id])?;
        rows.retain(|a| a.organization_id == organization_id);
        Ok(rows)
    }

    async fn modify(
        &self,
        organization_id: &str,
        asset_id: &str,
        change: Mutation<Asset>,
    ) -> SmResult<Asset> {
        self.store
            .modify(ASSETS, EntityKind::Asset, &[organization_id, asset_id], change)
    }

    async fn list_controller_assets(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
    ) -> SmResult<Vec<Asset>> {
        let mut rows = self.list(organization_id).await?;
        rows.retain(|a| a.edge_controller_id == edge_controller_id);
        Ok(rows)
    }

    async fn remove(&self, organization_id: &str, asset_id: &str) -> SmResult<()> {
        self.store
            .remove(ASSETS, EntityKind::Asset, &[organization_id, asset_id])
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[ASSETS])
    }
}
