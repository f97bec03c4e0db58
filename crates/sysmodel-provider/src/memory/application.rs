use async_trait::async_trait;
use parking_lot::Mutex;

use sysmodel_entities::{
    AppDescriptor, AppEndpoint, AppInstance, AppZtNetwork, EntityKind, ParametrizedDescriptor,
    SmResult,
};

use super::table::Table;
use crate::traits::{ApplicationProvider, Mutation};

struct State {
    descriptors: Table<AppDescriptor>,
    instances: Table<AppInstance>,
    // keyed by (organization_id, app_instance_id, endpoint_instance_id)
    endpoints: Table<AppEndpoint>,
    parametrized: Table<ParametrizedDescriptor>,
    networks: Table<AppZtNetwork>,
}

/// In-memory descriptors and instances. Instances are independent rows;
/// removing a descriptor leaves its instances alone. Endpoints, parametrized
/// descriptors and networks hang off an instance and go with it.
pub struct MemoryApplicationProvider {
    state: Mutex<State>,
}

impl MemoryApplicationProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                descriptors: Table::new(EntityKind::AppDescriptor),
                instances: Table::new(EntityKind::AppInstance),
                endpoints: Table::new(EntityKind::AppEndpoint),
                parametrized: Table::new(EntityKind::ParametrizedDescriptor),
                networks: Table::new(EntityKind::AppZtNetwork),
            }),
        }
    }
}

impl Default for MemoryApplicationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApplicationProvider for MemoryApplicationProvider {
    async fn add_descriptor(&self, descriptor: &AppDescriptor) -> SmResult<()> {
        self.state.lock().descriptors.insert(
            &[&descriptor.organization_id, &descriptor.app_descriptor_id],
            descriptor,
        )
    }

    async fn update_descriptor(&self, descriptor: &AppDescriptor) -> SmResult<()> {
        self.state.lock().descriptors.replace(
            &[&descriptor.organization_id, &descriptor.app_descriptor_id],
            descriptor,
        )
    }

    async fn descriptor_exists(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .descriptors
            .contains(&[organization_id, descriptor_id]))
    }

    async fn get_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<AppDescriptor> {
        self.state
            .lock()
            .descriptors
            .get(&[organization_id, descriptor_id])
    }

    async fn list_descriptors(&self, organization_id: &str) -> SmResult<Vec<AppDescriptor>> {
        Ok(self.state.lock().descriptors.scan(&[organization_id]))
    }

    async fn modify_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
        change: Mutation<AppDescriptor>,
    ) -> SmResult<AppDescriptor> {
        self.state
            .lock()
            .descriptors
            .modify(&[organization_id, descriptor_id], change)
    }

    async fn remove_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<()> {
        self.state
            .lock()
            .descriptors
            .remove(&[organization_id, descriptor_id])
            .map(|_| ())
    }

    async fn add_instance(&self, instance: &AppInstance) -> SmResult<()> {
        self.state.lock().instances.insert(
            &[&instance.organization_id, &instance.app_instance_id],
            instance,
        )
    }

    async fn update_instance(&self, instance: &AppInstance) -> SmResult<()> {
        self.state.lock().instances.replace(
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
        self.state
            .lock()
            .instances
            .modify(&[organization_id, instance_id], change)
    }

    async fn instance_exists(&self, organization_id: &str, instance_id: &str) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .instances
            .contains(&[organization_id, instance_id]))
    }

    async fn get_instance(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<AppInstance> {
        self.state
            .lock()
            .instances
            .get(&[organization_id, instance_id])
    }

    async fn list_instances(&self, organization_id: &str) -> SmResult<Vec<AppInstance>> {
        Ok(self.state.lock().instances.scan(&[organization_id]))
    }

    async fn list_descriptor_instances(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<Vec<AppInstance>> {
        let mut instances = self.state.lock().instances.scan(&[organization_id]);
        instances.retain(|i| i.app_descriptor_id == descriptor_id);
        Ok(instances)
    }

    async fn remove_instance(&self, organization_id: &str, instance_id: &str) -> SmResult<()> {
        let mut state = self.state.lock();
        state.instances.remove(&[organization_id, instance_id])?;
        let key = [organization_id, instance_id];
        state.endpoints.remove_prefix(&key);
        state.parametrized.remove_prefix(&key);
        state.networks.remove_prefix(&key);
        Ok(())
    }

    async fn add_app_endpoint(&self, endpoint: &AppEndpoint) -> SmResult<()> {
        self.state.lock().endpoints.insert(
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
        let mut endpoints = self.state.lock().endpoints.scan(&[organization_id]);
        endpoints.retain(|e| e.endpoint_instance.fqdn == fqdn);
        Ok(endpoints)
    }

    async fn remove_app_endpoints(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<usize> {
        Ok(self
            .state
            .lock()
            .endpoints
            .remove_prefix(&[organization_id, instance_id]))
    }

    async fn add_parametrized_descriptor(
        &self,
        descriptor: &ParametrizedDescriptor,
    ) -> SmResult<()> {
        self.state.lock().parametrized.insert(
            &[descriptor.organization_id(), &descriptor.app_instance_id],
            descriptor,
        )
    }

    async fn get_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<ParametrizedDescriptor> {
        self.state
            .lock()
            .parametrized
            .get(&[organization_id, instance_id])
    }

    async fn remove_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<()> {
        self.state
            .lock()
            .parametrized
            .remove(&[organization_id, instance_id])
            .map(|_| ())
    }

    async fn add_zt_network(&self, network: &AppZtNetwork) -> SmResult<()> {
        self.state.lock().networks.insert(
            &[&network.organization_id, &network.app_instance_id],
            network,
        )
    }

    async fn get_zt_network(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<AppZtNetwork> {
        self.state.lock().networks.get(&[organization_id, instance_id])
    }

    async fn remove_zt_network(&self, organization_id: &str, instance_id: &str) -> SmResult<()> {
        self.state
            .lock()
            .networks
            .remove(&[organization_id, instance_id])
            .map(|_| ())
    }

    async fn clear(&self) -> SmResult<()> {
        let mut state = self.state.lock();
        state.descriptors.clear();
        state.instances.clear();
        state.endpoints.clear();
        state.parametrized.clear();
        state.networks.clear();
        Ok(())
    }
}
