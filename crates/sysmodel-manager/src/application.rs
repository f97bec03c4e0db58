use std::sync::Arc;

use tracing::{debug, info};

use sysmodel_entities::{
    AddAppDescriptorRequest, AddAppEndpointRequest, AddAppInstanceRequest,
    AddServiceGroupInstancesRequest, AddServiceInstanceRequest, AppDescriptor, AppEndpoint,
    AppInstance, AppParameter, AppZtNetwork, EntityKind, IdGenerator, InstanceMetadata,
    InstanceParameter, ParametrizedDescriptor, RemoveServiceGroupInstancesRequest,
    ServiceGroupInstance, ServiceInstance, SmResult, SystemModelError, UpdateAppDescriptorRequest,
    UpdateAppStatusRequest, UpdateServiceStatusRequest,
};
use sysmodel_provider::{ApplicationProvider, OrganizationProvider, Providers};

use crate::require_org;

#[derive(Clone)]
pub struct ApplicationManager {
    orgs: Arc<dyn OrganizationProvider>,
    apps: Arc<dyn ApplicationProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl ApplicationManager {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            apps: providers.applications.clone(),
            ids,
        }
    }

    // ── Descriptors ─────────────────────────────────────────────

    pub async fn add_descriptor(&self, req: &AddAppDescriptorRequest) -> SmResult<AppDescriptor> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let descriptor = AppDescriptor::from_request(req, self.ids.next_id(), self.ids.as_ref())?;
        self.apps.add_descriptor(&descriptor).await?;
        info!(
            organization_id = %descriptor.organization_id,
            app_descriptor_id = %descriptor.app_descriptor_id,
            groups = descriptor.groups.len(),
            "app descriptor added"
        );
        Ok(descriptor)
    }

    pub async fn get_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<AppDescriptor> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps.get_descriptor(organization_id, descriptor_id).await
    }

    pub async fn list_descriptors(&self, organization_id: &str) -> SmResult<Vec<AppDescriptor>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps.list_descriptors(organization_id).await
    }

    pub async fn update_descriptor(
        &self,
        req: &UpdateAppDescriptorRequest,
    ) -> SmResult<AppDescriptor> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let descriptor = self
            .apps
            .modify_descriptor(
                &req.organization_id,
                &req.app_descriptor_id,
                Box::new(move |descriptor: &mut AppDescriptor| {
                    descriptor.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(
            organization_id = %descriptor.organization_id,
            app_descriptor_id = %descriptor.app_descriptor_id,
            "app descriptor updated"
        );
        Ok(descriptor)
    }

    /// Instances created from the descriptor are left alone.
    pub async fn remove_descriptor(&self, organization_id: &str, descriptor_id: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps
            .remove_descriptor(organization_id, descriptor_id)
            .await?;
        info!(%organization_id, app_descriptor_id = %descriptor_id, "app descriptor removed");
        Ok(())
    }

    pub async fn descriptor_parameters(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<Vec<AppParameter>> {
        Ok(self
            .get_descriptor(organization_id, descriptor_id)
            .await?
            .parameters)
    }

    pub async fn list_descriptor_instances(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<Vec<AppInstance>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps
            .list_descriptor_instances(organization_id, descriptor_id)
            .await
    }

    // ── Instances ───────────────────────────────────────────────

    /// Freeze a stored descriptor into a new queued instance.
    pub async fn add_instance(&self, req: &AddAppInstanceRequest) -> SmResult<AppInstance> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let descriptor = self
            .apps
            .get_descriptor(&req.organization_id, &req.app_descriptor_id)
            .await?;
        let instance = AppInstance::from_descriptor(
            req,
            &descriptor,
            self.ids.next_id(),
            self.ids.as_ref(),
        )?;
        self.apps.add_instance(&instance).await?;
        info!(
            organization_id = %instance.organization_id,
            app_descriptor_id = %instance.app_descriptor_id,
            app_instance_id = %instance.app_instance_id,
            "app instance added"
        );
        Ok(instance)
    }

    pub async fn get_instance(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<AppInstance> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps.get_instance(organization_id, instance_id).await
    }

    pub async fn list_instances(&self, organization_id: &str) -> SmResult<Vec<AppInstance>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps.list_instances(organization_id).await
    }

    pub async fn instance_parameters(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<Vec<InstanceParameter>> {
        Ok(self
            .get_instance(organization_id, instance_id)
            .await?
            .parameters)
    }

    /// Replace the stored instance wholesale.
    pub async fn update_instance(&self, instance: &AppInstance) -> SmResult<()> {
        if instance.app_instance_id.is_empty() {
            return Err(SystemModelError::invalid("app_instance_id is required"));
        }
        require_org(self.orgs.as_ref(), &instance.organization_id).await?;
        self.apps.update_instance(instance).await?;
        info!(
            organization_id = %instance.organization_id,
            app_instance_id = %instance.app_instance_id,
            "app instance replaced"
        );
        Ok(())
    }

    pub async fn update_app_status(&self, req: &UpdateAppStatusRequest) -> SmResult<AppInstance> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let instance = self
            .apps
            .modify_instance(
                &req.organization_id,
                &req.app_instance_id,
                Box::new(move |instance: &mut AppInstance| {
                    instance.apply_status(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(
            organization_id = %instance.organization_id,
            app_instance_id = %instance.app_instance_id,
            status = ?instance.status,
            "app status updated"
        );
        Ok(instance)
    }

    /// Concurrent updates of different services in one instance all land.
    pub async fn update_service_status(
        &self,
        req: &UpdateServiceStatusRequest,
    ) -> SmResult<AppInstance> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let instance = self
            .apps
            .modify_instance(
                &req.organization_id,
                &req.app_instance_id,
                Box::new(move |instance: &mut AppInstance| instance.apply_service_status(&update)),
            )
            .await?;
        info!(
            organization_id = %instance.organization_id,
            app_instance_id = %instance.app_instance_id,
            service_instance_id = %req.service_instance_id,
            status = ?req.status,
            "service status updated"
        );
        Ok(instance)
    }

    /// The descriptor the instance was frozen from, as currently stored.
    async fn instance_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<AppDescriptor> {
        let instance = self.apps.get_instance(organization_id, instance_id).await?;
        self.apps
            .get_descriptor(organization_id, &instance.app_descriptor_id)
            .await
    }

    // ── Group and service instances ─────────────────────────────

    /// Instantiate a descriptor group `num_instances` more times.
    pub async fn add_service_group_instances(
        &self,
        req: &AddServiceGroupInstancesRequest,
    ) -> SmResult<Vec<ServiceGroupInstance>> {
        req.validate()?;
        let org = &req.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        let descriptor = self.instance_descriptor(org, &req.app_instance_id).await?;
        let group = descriptor.group(&req.service_group_id)?;
        let created: Vec<ServiceGroupInstance> = (0..req.num_instances)
            .map(|_| ServiceGroupInstance::from_group(group, &req.app_instance_id, self.ids.as_ref()))
            .collect();
        let appended = created.clone();
        self.apps
            .modify_instance(
                org,
                &req.app_instance_id,
                Box::new(move |instance: &mut AppInstance| {
                    instance.groups.extend(appended);
                    Ok(())
                }),
            )
            .await?;
        info!(
            organization_id = %org,
            app_instance_id = %req.app_instance_id,
            service_group_id = %req.service_group_id,
            count = created.len(),
            "service group instances added"
        );
        Ok(created)
    }

    /// Drop the listed group instances, or every one when none is listed.
    pub async fn remove_service_group_instances(
        &self,
        req: &RemoveServiceGroupInstancesRequest,
    ) -> SmResult<()> {
        req.validate()?;
        let org = &req.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        let ids = req.service_group_instance_ids.clone();
        self.apps
            .modify_instance(
                org,
                &req.app_instance_id,
                Box::new(move |instance: &mut AppInstance| {
                    instance.remove_group_instances(&ids).map(|_| ())
                }),
            )
            .await?;
        info!(organization_id = %org, app_instance_id = %req.app_instance_id, "service group instances removed");
        Ok(())
    }

    /// Add one more instance of a descriptor service to a group instance.
    pub async fn add_service_instance(
        &self,
        req: &AddServiceInstanceRequest,
    ) -> SmResult<ServiceInstance> {
        req.validate()?;
        let org = &req.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        let instance = self.apps.get_instance(org, &req.app_instance_id).await?;
        let group_id = instance
            .group_instance(&req.service_group_instance_id)?
            .service_group_id
            .clone();
        let descriptor = self
            .apps
            .get_descriptor(org, &instance.app_descriptor_id)
            .await?;
        let service = ServiceInstance::from_service(
            descriptor.service(&group_id, &req.service_id)?,
            &req.app_instance_id,
            &req.service_group_instance_id,
            self.ids.next_id(),
        );
        let pushed = service.clone();
        let group_instance_id = req.service_group_instance_id.clone();
        self.apps
            .modify_instance(
                org,
                &req.app_instance_id,
                Box::new(move |instance: &mut AppInstance| {
                    instance
                        .group_instance_mut(&group_instance_id)?
                        .push_service(pushed);
                    Ok(())
                }),
            )
            .await?;
        info!(
            organization_id = %org,
            app_instance_id = %req.app_instance_id,
            service_instance_id = %service.service_instance_id,
            "service instance added"
        );
        Ok(service)
    }

    pub async fn get_group_metadata(
        &self,
        organization_id: &str,
        instance_id: &str,
        service_group_instance_id: &str,
    ) -> SmResult<InstanceMetadata> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        let instance = self.apps.get_instance(organization_id, instance_id).await?;
        Ok(instance
            .group_instance(service_group_instance_id)?
            .metadata
            .clone())
    }

    /// Replace the metadata of the group instance it names.
    pub async fn update_group_metadata(
        &self,
        metadata: &InstanceMetadata,
    ) -> SmResult<InstanceMetadata> {
        metadata.validate()?;
        let org = &metadata.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        let group_instance_id = metadata.monitored_instance_id.clone();
        let replacement = metadata.clone();
        let instance = self
            .apps
            .modify_instance(
                org,
                &metadata.app_instance_id,
                Box::new(move |instance: &mut AppInstance| {
                    instance.set_group_metadata(replacement)
                }),
            )
            .await?;
        debug!(
            organization_id = %org,
            app_instance_id = %metadata.app_instance_id,
            service_group_instance_id = %group_instance_id,
            "group metadata updated"
        );
        Ok(instance.group_instance(&group_instance_id)?.metadata.clone())
    }

    // ── Endpoints ───────────────────────────────────────────────

    /// Register an endpoint of a service instance that exists in the
    /// application instance.
    pub async fn add_app_endpoint(&self, req: &AddAppEndpointRequest) -> SmResult<AppEndpoint> {
        req.validate()?;
        let org = &req.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        let instance = self.apps.get_instance(org, &req.app_instance_id).await?;
        instance.service_instance(&req.service_group_instance_id, &req.service_instance_id)?;
        let endpoint = AppEndpoint::from_request(req);
        self.apps.add_app_endpoint(&endpoint).await?;
        info!(
            organization_id = %org,
            app_instance_id = %req.app_instance_id,
            fqdn = %endpoint.endpoint_instance.fqdn,
            "app endpoint added"
        );
        Ok(endpoint)
    }

    pub async fn get_app_endpoints(
        &self,
        organization_id: &str,
        fqdn: &str,
    ) -> SmResult<Vec<AppEndpoint>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        if fqdn.is_empty() {
            return Err(SystemModelError::invalid("fqdn is required"));
        }
        self.apps.get_app_endpoints(organization_id, fqdn).await
    }

    /// Drop every endpoint of the instance. An instance without endpoints
    /// is not an error.
    pub async fn remove_app_endpoints(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        let dropped = self
            .apps
            .remove_app_endpoints(organization_id, instance_id)
            .await?;
        info!(%organization_id, app_instance_id = %instance_id, dropped, "app endpoints removed");
        Ok(())
    }

    // ── Parametrized descriptors ────────────────────────────────

    /// Store the descriptor an instance was deployed from once its
    /// parameters were applied. It must name the instance's descriptor.
    pub async fn add_parametrized_descriptor(
        &self,
        descriptor: &ParametrizedDescriptor,
    ) -> SmResult<ParametrizedDescriptor> {
        descriptor.validate()?;
        let org = descriptor.organization_id();
        require_org(self.orgs.as_ref(), org).await?;
        let instance = self
            .apps
            .get_instance(org, &descriptor.app_instance_id)
            .await?;
        if instance.app_descriptor_id != descriptor.descriptor.app_descriptor_id {
            return Err(SystemModelError::invalid(format!(
                "instance {} was created from descriptor {}, not {}",
                instance.app_instance_id,
                instance.app_descriptor_id,
                descriptor.descriptor.app_descriptor_id
            )));
        }
        self.apps.add_parametrized_descriptor(descriptor).await?;
        info!(organization_id = %org, app_instance_id = %descriptor.app_instance_id, "parametrized descriptor added");
        Ok(descriptor.clone())
    }

    pub async fn get_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<ParametrizedDescriptor> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps
            .get_parametrized_descriptor(organization_id, instance_id)
            .await
    }

    pub async fn remove_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps
            .remove_parametrized_descriptor(organization_id, instance_id)
            .await?;
        info!(%organization_id, app_instance_id = %instance_id, "parametrized descriptor removed");
        Ok(())
    }

    // ── Overlay networks ────────────────────────────────────────

    pub async fn add_zt_network(&self, network: &AppZtNetwork) -> SmResult<AppZtNetwork> {
        network.validate()?;
        let org = &network.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        if !self
            .apps
            .instance_exists(org, &network.app_instance_id)
            .await?
        {
            return Err(SystemModelError::not_found(
                EntityKind::AppInstance,
                &[org, &network.app_instance_id],
            ));
        }
        self.apps.add_zt_network(network).await?;
        info!(
            organization_id = %org,
            app_instance_id = %network.app_instance_id,
            network_id = %network.network_id,
            "zt network added"
        );
        Ok(network.clone())
    }

    pub async fn get_zt_network(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<AppZtNetwork> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps.get_zt_network(organization_id, instance_id).await
    }

    pub async fn remove_zt_network(&self, organization_id: &str, instance_id: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.apps
            .remove_zt_network(organization_id, instance_id)
            .await?;
        info!(%organization_id, app_instance_id = %instance_id, "zt network removed");
        Ok(())
    }

    pub async fn remove_instance(&self, organization_id: &str, instance_id: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        if !self.apps.instance_exists(organization_id, instance_id).await? {
            return Err(SystemModelError::not_found(
                EntityKind::AppInstance,
                &[organization_id, instance_id],
            ));
        }
        // Endpoints, the parametrized descriptor and the network go with it.
        self.apps.remove_instance(organization_id, instance_id).await?;
        info!(%organization_id, app_instance_id = %instance_id, "app instance removed");
        Ok(())
    }
}
