use std::sync::Arc;

use sysmodel_entities::SmResult;

use crate::memory::{
    MemoryApplicationProvider, MemoryAssetProvider, MemoryClusterProvider, MemoryDeviceProvider,
    MemoryEdgeControllerProvider, MemoryNodeProvider, MemoryOrganizationProvider,
    MemoryRoleProvider, MemoryUserProvider,
};
use crate::redb_backend::{
    RedbApplicationProvider, RedbAssetProvider, RedbClusterProvider, RedbDeviceProvider,
    RedbEdgeControllerProvider, RedbNodeProvider, RedbOrganizationProvider, RedbRoleProvider,
    RedbStore, RedbUserProvider,
};
use crate::traits::{
    ApplicationProvider, AssetProvider, ClusterProvider, DeviceProvider, EdgeControllerProvider,
    NodeProvider, OrganizationProvider, RoleProvider, UserProvider,
};

/// One provider per entity family, shared by the managers.
#[derive(Clone)]
pub struct Providers {
    pub organizations: Arc<dyn OrganizationProvider>,
    pub clusters: Arc<dyn ClusterProvider>,
    pub nodes: Arc<dyn NodeProvider>,
    pub roles: Arc<dyn RoleProvider>,
    pub users: Arc<dyn UserProvider>,
    pub devices: Arc<dyn DeviceProvider>,
    pub applications: Arc<dyn ApplicationProvider>,
    pub edge_controllers: Arc<dyn EdgeControllerProvider>,
    pub assets: Arc<dyn AssetProvider>,
}

impl Providers {
    pub fn in_memory() -> Self {
        Self {
            organizations: Arc::new(MemoryOrganizationProvider::new()),
            clusters: Arc::new(MemoryClusterProvider::new()),
            nodes: Arc::new(MemoryNodeProvider::new()),
            roles: Arc::new(MemoryRoleProvider::new()),
            users: Arc::new(MemoryUserProvider::new()),
            devices: Arc::new(MemoryDeviceProvider::new()),
            applications: Arc::new(MemoryApplicationProvider::new()),
            edge_controllers: Arc::new(MemoryEdgeControllerProvider::new()),
            assets: Arc::new(MemoryAssetProvider::new()),
        }
    }

    pub fn redb(store: RedbStore) -> Self {
        Self {
            organizations: Arc::new(RedbOrganizationProvider::new(store.clone())),
            clusters: Arc::new(RedbClusterProvider::new(store.clone())),
            nodes: Arc::new(RedbNodeProvider::new(store.clone())),
            roles: Arc::new(RedbRoleProvider::new(store.clone())),
            users: Arc::new(RedbUserProvider::new(store.clone())),
            devices: Arc::new(RedbDeviceProvider::new(store.clone())),
            applications: Arc::new(RedbApplicationProvider::new(store.clone())),
            edge_controllers: Arc::new(RedbEdgeControllerProvider::new(store.clone())),
            assets: Arc::new(RedbAssetProvider::new(store)),
        }
    }

    /// Empty every family. Meant for test setup.
    pub async fn clear_all(&self) -> SmResult<()> {
        self.organizations.clear().await?;
        self.clusters.clear().await?;
        self.nodes.clear().await?;
        self.roles.clear().await?;
        self.users.clear().await?;
        self.devices.clear().await?;
        self.applications.clear().await?;
        self.edge_controllers.clear().await?;
        self.assets.clear().await
    }
}
