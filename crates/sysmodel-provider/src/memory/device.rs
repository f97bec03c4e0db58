use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use sysmodel_entities::{Device, DeviceGroup, EntityKind, SmResult, SystemModelError};

use super::table::Table;
use crate::traits::{DeviceProvider, Mutation};

struct State {
    groups: Table<DeviceGroup>,
    // keyed by (organization_id, device_group_id, device_id)
    devices: Table<Device>,
}

/// In-memory device groups and devices behind a single lock.
pub struct MemoryDeviceProvider {
    state: Mutex<State>,
}

impl MemoryDeviceProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                groups: Table::new(EntityKind::DeviceGroup),
                devices: Table::new(EntityKind::Device),
            }),
        }
    }
}

impl Default for MemoryDeviceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceProvider for MemoryDeviceProvider {
    async fn add_device_group(&self, group: &DeviceGroup) -> SmResult<()> {
        let mut state = self.state.lock();
        let taken = state
            .groups
            .scan(&[&group.organization_id])
            .iter()
            .any(|g| g.name == group.name);
        if taken {
            return Err(SystemModelError::already_exists(
                EntityKind::DeviceGroup,
                &[&group.organization_id, &group.name],
            ));
        }
        state
            .groups
            .insert(&[&group.organization_id, &group.device_group_id], group)
    }

    async fn update_device_group(&self, group: &DeviceGroup) -> SmResult<()> {
        self.state
            .lock()
            .groups
            .replace(&[&group.organization_id, &group.device_group_id], group)
    }

    async fn device_group_exists(&self, organization_id: &str, group_id: &str) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .groups
            .contains(&[organization_id, group_id]))
    }

    async fn device_group_exists_by_name(
        &self,
        organization_id: &str,
        name: &str,
    ) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .groups
            .scan(&[organization_id])
            .iter()
            .any(|g| g.name == name))
    }

    async fn get_device_group(
        &self,
        organization_id: &str,
        group_id: &str,
    ) -> SmResult<DeviceGroup> {
        self.state.lock().groups.get(&[organization_id, group_id])
    }

    async fn list_device_groups(&self, organization_id: &str) -> SmResult<Vec<DeviceGroup>> {
        Ok(self.state.lock().groups.scan(&[organization_id]))
    }

    async fn modify_device_group(
        &self,
        organization_id: &str,
        group_id: &str,
        change: Mutation<DeviceGroup>,
    ) -> SmResult<DeviceGroup> {
        self.state
            .lock()
            .groups
            .modify(&[organization_id, group_id], change)
    }

    async fn remove_device_group(&self, organization_id: &str, group_id: &str) -> SmResult<()> {
        let mut state = self.state.lock();
        state.groups.remove(&[organization_id, group_id])?;
        let dropped = state.devices.remove_prefix(&[organization_id, group_id]);
        debug!(%organization_id, %group_id, dropped, "device group removed");
        Ok(())
    }

    async fn add_device(&self, device: &Device) -> SmResult<()> {
        self.state.lock().devices.insert(
            &[
                &device.organization_id,
                &device.device_group_id,
                &device.device_id,
            ],
            device,
        )
    }

    async fn update_device(&self, device: &Device) -> SmResult<()> {
        self.state.lock().devices.replace(
            &[
                &device.organization_id,
                &device.device_group_id,
                &device.device_id,
            ],
            device,
        )
    }

    async fn device_exists(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<bool> {
        Ok(self
            .state
            .lock()
            .devices
            .contains(&[organization_id, group_id, device_id]))
    }

    async fn get_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<Device> {
        self.state
            .lock()
            .devices
            .get(&[organization_id, group_id, device_id])
    }

    async fn list_devices(&self, organization_id: &str, group_id: &str) -> SmResult<Vec<Device>> {
        Ok(self.state.lock().devices.scan(&[organization_id, group_id]))
    }

    async fn modify_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
        change: Mutation<Device>,
    ) -> SmResult<Device> {
        self.state
            .lock()
            .devices
            .modify(&[organization_id, group_id, device_id], change)
    }

    async fn remove_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<()> {
        self.state
            .lock()
            .devices
            .remove(&[organization_id, group_id, device_id])
            .map(|_| ())
    }

    async fn clear(&self) -> SmResult<()> {
        let mut state = self.state.lock();
        state.groups.clear();
        state.devices.clear();
        Ok(())
    }
}
