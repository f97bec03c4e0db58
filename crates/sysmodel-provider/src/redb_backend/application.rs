use async_trait::async_trait;

use sysmodel_entities::{
    AppDescriptor, AppEndpoint, AppInstance, AppZtNetwork, EntityKind, ParametrizedDescriptor,
    SmResult,
};

use super::store::RedbStore;
use super::tables::{
    APP_DESCRIPTORS, APP_ENDPOINTS, APP_INSTANCES, APP_ZT_NETWORKS, PARAMETRIZED_DESCRIPTORS,
};
use crate::traits::{ApplicationProvider, Mutation};

pub struct RedbApplicationProvider {
    store: RedbStore,
}

impl RedbApplicationProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ApplicationProvider for RedbApplicationProvider {
    async fn add_descriptor(&self, descriptor: &AppDescriptor) -> SmResult<()> {
        self.store.insert(
            APP_DESCRIPTORS,
            EntityKind::AppDescriptor,
            &[&descriptor.organization_id, &descriptor.app_descriptor_id],
            descriptor,
        )
    }

    async fn update_descriptor(&self, descriptor: &AppDescriptor) -> SmResult<()> {
        self.store.replace(
            APP_DESCRIPTORS,
            EntityKind::AppDescriptor,
            &[&descriptor.organization_id, &descriptor.app_descriptor_id],
            descriptor,
        )
    }

    async fn descriptor_exists(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<bool> {
        self.store
            .contains(APP_DESCRIPTORS, &[organization_id, descriptor_id])
    }

    async fn get_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<AppDescriptor> {
        self.store.fetch(
            APP_DESCRIPTORS,
            EntityKind::AppDescriptor,
            &[organization_id, descriptor_id],
        )
    }

    async fn list_descriptors(&self, organization_id: &str) -> SmResult<Vec<AppDescriptor>> {
        let mut rows: Vec<AppDescriptor> = self.store.scan(APP_DESCRIPTORS, &[organization_id])?;
        rows.retain(|d| d.organization_id == organization_id);
        Ok(rows)
    }

    async fn modify_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
        change: Mutation<AppDescriptor>,
    ) -> SmResult<AppDescriptor> {
        self.store.modify(
            APP_DESCRIPTORS,
            EntityKind::AppDescriptor,
            &[organization_id, descriptor_id],
            change,
        )
    }

    async fn remove_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<()> {
        self.store.remove(
            APP_DESCRIPTORS,
            EntityKind::AppDescriptor,
            &[organization_id, descriptor_id],
        )
    }

    async fn add_instance(&self, instance: &AppInstance) -> SmResult<()> {
        self.store.insert(
            APP_INSTANCES,
            EntityKind::AppInstance,
            &[&instance.organization_id, &instance.app_instance_id],
            instance,
        )
    }

    async fn update_instance(&self, instance: &AppInstance) -> SmResult<()> {
        self.store.replace(
            APP_INSTANCES,
            EntityKind::AppInstance,
            &[&instance.organization_id, &instance.app_instance_id],
            instance,
        )
    }

    async fn modify_instance(
        &self,
        organization_id: &str,
        instance_id: &str,
        change: Mutation<AppInstance>,
    ) -> SmResult<AppInstance> {
        self.store.modify(
            APP_INSTANCES,
            EntityKind::AppInstance,
            &[organization_id, instance_id],
            change,
        )
    }

    async fn instance_exists(&self, organization_id: &str, instance_id: &str) -> SmResult<bool> {
        self.store
            .contains(APP_INSTANCES, &[organization_id, instance_id])
    }

    async fn get_instance(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<AppInstance> {
        self.store.fetch(
            APP_INSTANCES,
            EntityKind::AppInstance,
            &[organization_id, instance_id],
        )
    }

    async fn list_instances(&self, organization_id: &str) -> SmResult<Vec<AppInstance>> {
        let mut rows: Vec<AppInstance> = self.store.scan(APP_INSTANCES, &[organization_id])?;
        rows.retain(|i| i.organization_id == organization_id);
        Ok(rows)
    }

    async fn list_descriptor_instances(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<Vec<AppInstance>> {
        let mut rows = self.list_instances(organization_id).await?;
        rows.retain(|i| i.app_descriptor_id == descriptor_id);
        Ok(rows)
    }

    async fn remove_instance(&self, organization_id: &str, instance_id: &str) -> SmResult<()> {
        let key = [organization_id, instance_id];
        self.store.write(|w| {
            w.remove(APP_INSTANCES, EntityKind::AppInstance, &key)?;
            w.remove_prefix(APP_ENDPOINTS, &key)?;
            w.remove_prefix(PARAMETRIZED_DESCRIPTORS, &key)?;
            w.remove_prefix(APP_ZT_NETWORKS, &key)?;
            Ok(())
        })
    }

    async fn add_app_endpoint(&self, endpoint: &AppEndpoint) -> SmResult<()> {
        self.store.insert(
            APP_ENDPOINTS,
            EntityKind::AppEndpoint,
            &[
                &endpoint.organization_id,
                &endpoint.app_instance_id,
                &endpoint.endpoint_instance.endpoint_instance_id,
            ],
            endpoint,
        )
    }

    async fn get_app_endpoints(
        &self,
        organization_id: &str,
        fqdn: &str,
    ) -> SmResult<Vec<AppEndpoint>> {
        let mut rows: Vec<AppEndpoint> = self.store.scan(APP_ENDPOINTS, &[organization_id])?;
        rows.retain(|e| e.organization_id == organization_id && e.endpoint_instance.fqdn == fqdn);
        Ok(rows)
    }

    async fn remove_app_endpoints(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<usize> {
        let dropped = self
            .store
            .write(|w| w.remove_prefix(APP_ENDPOINTS, &[organization_id, instance_id]))?;
        Ok(dropped as usize)
    }

    async fn add_parametrized_descriptor(
        &self,
        descriptor: &ParametrizedDescriptor,
    ) -> SmResult<()> {
        self.store.insert(
            PARAMETRIZED_DESCRIPTORS,
            EntityKind::ParametrizedDescriptor,
            &[descriptor.organization_id(), &descriptor.app_instance_id],
            descriptor,
        )
    }

    async fn get_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<ParametrizedDescriptor> {
        self.store.fetch(
            PARAMETRIZED_DESCRIPTORS,
            EntityKind::ParametrizedDescriptor,
            &[organization_id, instance_id],
        )
    }

    async fn remove_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<()> {
        self.store.remove(
            PARAMETRIZED_DESCRIPTORS,
            EntityKind::ParametrizedDescriptor,
            &[organization_id, instance_id],
        )
    }

    async fn add_zt_network(&self, network: &AppZtNetwork) -> SmResult<()> {
        self.store.insert(
            APP_ZT_NETWORKS,
            EntityKind::AppZtNetwork,
            &[&network.organization_id, &network.app_instance_id],
            network,
        )
    }

    async fn get_zt_network(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<AppZtNetwork> {
        self.store.fetch(
            APP_ZT_NETWORKS,
            EntityKind::AppZtNetwork,
            &[organization_id, instance_id],
        )
    }

    async fn remove_zt_network(&self, organization_id: &str, instance_id: &str) -> SmResult<()> {
        self.store.remove(
            APP_ZT_NETWORKS,
            EntityKind::AppZtNetwork,
            &[organization_id, instance_id],
        )
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[
            APP_DESCRIPTORS,
            APP_INSTANCES,
            APP_ENDPOINTS,
            PARAMETRIZED_DESCRIPTORS,
            APP_ZT_NETWORKS,
        ])
    }
}
