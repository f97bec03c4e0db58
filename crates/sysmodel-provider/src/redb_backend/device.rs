use async_trait::async_trait;
use tracing::debug;

use sysmodel_entities::{Device, DeviceGroup, EntityKind, SmResult, SystemModelError};

use super::store::RedbStore;
use super::tables::{DEVICE_GROUPS, DEVICES};
use crate::traits::{DeviceProvider, Mutation};

pub struct RedbDeviceProvider {
    store: RedbStore,
}

impl RedbDeviceProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DeviceProvider for RedbDeviceProvider {
    async fn add_device_group(&self, group: &DeviceGroup) -> SmResult<()> {
        self.store.write(|w| {
            let groups: Vec<DeviceGroup> = w.scan(DEVICE_GROUPS, &[&group.organization_id])?;
            if groups.iter().any(|g| g.name == group.name) {
                return Err(SystemModelError::already_exists(
                    EntityKind::DeviceGroup,
                    &[&group.organization_id, &group.name],
                ));
            }
            w.insert(
                DEVICE_GROUPS,
                EntityKind::DeviceGroup,
                &[&group.organization_id, &group.device_group_id],
                group,
            )
        })
    }

    async fn update_device_group(&self, group: &DeviceGroup) -> SmResult<()> {
        self.store.replace(
            DEVICE_GROUPS,
            EntityKind::DeviceGroup,
            &[&group.organization_id, &group.device_group_id],
            group,
        )
    }

    async fn device_group_exists(&self, organization_id: &str, group_id: &str) -> SmResult<bool> {
        self.store
            .contains(DEVICE_GROUPS, &[organization_id, group_id])
    }

    async fn device_group_exists_by_name(
        &self,
        organization_id: &str,
        name: &str,
    ) -> SmResult<bool> {
        let groups = self.list_device_groups(organization_id).await?;
        Ok(groups.iter().any(|g| g.name == name))
    }

    async fn get_device_group(
        &self,
        organization_id: &str,
        group_id: &str,
    ) -> SmResult<DeviceGroup> {
        self.store.fetch(
            DEVICE_GROUPS,
            EntityKind::DeviceGroup,
            &[organization_id, group_id],
        )
    }

    async fn list_device_groups(&self, organization_id: &str) -> SmResult<Vec<DeviceGroup>> {
        let mut groups: Vec<DeviceGroup> = self.store.scan(DEVICE_GROUPS, &[organization_id])?;
        groups.retain(|g| g.organization_id == organization_id);
        Ok(groups)
    }

    async fn modify_device_group(
        &self,
        organization_id: &str,
        group_id: &str,
        change: Mutation<DeviceGroup>,
    ) -> SmResult<DeviceGroup> {
        self.store.modify(
            DEVICE_GROUPS,
            EntityKind::DeviceGroup,
            &[organization_id, group_id],
            change,
        )
    }

    async fn remove_device_group(&self, organization_id: &str, group_id: &str) -> SmResult<()> {
        let dropped = self.store.write(|w| {
            w.remove(
                DEVICE_GROUPS,
                EntityKind::DeviceGroup,
                &[organization_id, group_id],
            )?;
            w.remove_prefix(DEVICES, &[organization_id, group_id])
        })?;
        debug!(%organization_id, %group_id, dropped, "device group removed");
        Ok(())
    }

    async fn add_device(&self, device: &Device) -> SmResult<()> {
        self.store.insert(
            DEVICES,
            EntityKind::Device,
            &[
                &device.organization_id,
                &device.device_group_id,
                &device.device_id,
            ],
            device,
        )
    }

    async fn update_device(&self, device: &Device) -> SmResult<()> {
        self.store.replace(
            DEVICES,
            EntityKind::Device,
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
        self.store
            .contains(DEVICES, &[organization_id, group_id, device_id])
    }

    async fn get_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<Device> {
        self.store.fetch(
            DEVICES,
            EntityKind::Device,
            &[organization_id, group_id, device_id],
        )
    }

    async fn list_devices(&self, organization_id: &str, group_id: &str) -> SmResult<Vec<Device>> {
        let mut devices: Vec<Device> = self.store.scan(DEVICES, &[organization_id, group_id])?;
        devices.retain(|d| d.organization_id == organization_id && d.device_group_id == group_id);
        Ok(devices)
    }

    async fn modify_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
        change: Mutation<Device>,
    ) -> SmResult<Device> {
        self.store.modify(
            DEVICES,
            EntityKind::Device,
            &[organization_id, group_id, device_id],
            change,
        )
    }

    async fn remove_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<()> {
        self.store.remove(
            DEVICES,
            EntityKind::Device,
            &[organization_id, group_id, device_id],
        )
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[DEVICE_GROUPS, DEVICES])
    }
}
