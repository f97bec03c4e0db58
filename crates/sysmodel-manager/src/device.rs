use std::sync::Arc;

use tracing::info;

use sysmodel_entities::{
    AddDeviceGroupRequest, AddDeviceRequest, Device, DeviceGroup, EntityKind, IdGenerator,
    SmResult, SystemModelError, UpdateDeviceGroupRequest, UpdateDeviceRequest, epoch_secs,
};
use sysmodel_provider::{DeviceProvider, OrganizationProvider, Providers};

use crate::require_org;

#[derive(Clone)]
pub struct DeviceManager {
    orgs: Arc<dyn OrganizationProvider>,
    devices: Arc<dyn DeviceProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl DeviceManager {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            devices: providers.devices.clone(),
            ids,
        }
    }

    async fn require_group(&self, organization_id: &str, group_id: &str) -> SmResult<()> {
        if self
            .devices
            .device_group_exists(organization_id, group_id)
            .await?
        {
            Ok(())
        } else {
            Err(SystemModelError::not_found(
                EntityKind::DeviceGroup,
                &[organization_id, group_id],
            ))
        }
    }

    // ── Groups ──────────────────────────────────────────────────

    /// The group gets a generated id and API key. The provider refuses a
    /// name already taken in the organization.
    pub async fn add_group(&self, req: &AddDeviceGroupRequest) -> SmResult<DeviceGroup> {
        let org = &req.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        let group =
            DeviceGroup::from_request(req, self.ids.next_id(), self.ids.next_id(), epoch_secs())?;
        self.devices.add_device_group(&group).await?;
        info!(organization_id = %org, device_group_id = %group.device_group_id, name = %group.name, "device group added");
        Ok(group)
    }

    pub async fn get_group(&self, organization_id: &str, group_id: &str) -> SmResult<DeviceGroup> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.devices.get_device_group(organization_id, group_id).await
    }

    pub async fn list_groups(&self, organization_id: &str) -> SmResult<Vec<DeviceGroup>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.devices.list_device_groups(organization_id).await
    }

    pub async fn update_group(&self, req: &UpdateDeviceGroupRequest) -> SmResult<DeviceGroup> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let group = self
            .devices
            .modify_device_group(
                &req.organization_id,
                &req.device_group_id,
                Box::new(move |group: &mut DeviceGroup| {
                    group.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(organization_id = %group.organization_id, device_group_id = %group.device_group_id, "device group updated");
        Ok(group)
    }

    /// Removes the group together with its devices.
    pub async fn remove_group(&self, organization_id: &str, group_id: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.require_group(organization_id, group_id).await?;
        self.devices
            .remove_device_group(organization_id, group_id)
            .await?;
        info!(%organization_id, device_group_id = %group_id, "device group removed");
        Ok(())
    }

    // ── Devices ─────────────────────────────────────────────────

    /// Register a device under an existing group. The device starts enabled
    /// if the group's default connectivity says so.
    pub async fn add_device(&self, req: &AddDeviceRequest) -> SmResult<Device> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let group = self
            .devices
            .get_device_group(&req.organization_id, &req.device_group_id)
            .await?;
        let device = Device::from_request(req, &group, epoch_secs());
        self.devices.add_device(&device).await?;
        info!(
            organization_id = %device.organization_id,
            device_group_id = %device.device_group_id,
            device_id = %device.device_id,
            enabled = device.enabled,
            "device added"
        );
        Ok(device)
    }

    pub async fn get_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<Device> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.require_group(organization_id, group_id).await?;
        self.devices
            .get_device(organization_id, group_id, device_id)
            .await
    }

    pub async fn list_devices(&self, organization_id: &str, group_id: &str) -> SmResult<Vec<Device>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.require_group(organization_id, group_id).await?;
        self.devices.list_devices(organization_id, group_id).await
    }

    pub async fn update_device(&self, req: &UpdateDeviceRequest) -> SmResult<Device> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        self.require_group(&req.organization_id, &req.device_group_id)
            .await?;
        let update = req.clone();
        let device = self
            .devices
            .modify_device(
                &req.organization_id,
                &req.device_group_id,
                &req.device_id,
                Box::new(move |device: &mut Device| {
                    device.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(
            organization_id = %device.organization_id,
            device_group_id = %device.device_group_id,
            device_id = %device.device_id,
            "device updated"
        );
        Ok(device)
    }

    /// Checks organization, then group, then device.
    pub async fn remove_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.require_group(organization_id, group_id).await?;
        if !self
            .devices
            .device_exists(organization_id, group_id, device_id)
            .await?
        {
            return Err(SystemModelError::not_found(
                EntityKind::Device,
                &[organization_id, group_id, device_id],
            ));
        }
        self.devices
            .remove_device(organization_id, group_id, device_id)
            .await?;
        info!(%organization_id, device_group_id = %group_id, %device_id, "device removed");
        Ok(())
    }
}
