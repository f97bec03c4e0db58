//! Storage contract, one trait per entity family.
//!
//! Every operation is scoped by the full key path of the entity. `add` fails
//! with `AlreadyExists` on a taken key; `update`, `get` and `remove` fail with
//! `NotFound` on an absent one. Listing at organization scope returns only
//! that organization's entities.
//!
//! Implementations own their storage exclusively and hand out copies.
//!
//! A read-check-write on one row must not span two calls: the `modify`
//! operations take a [`Mutation`] and run it against the stored row inside
//! the same call that writes the result back.

use async_trait::async_trait;

use sysmodel_entities::{
    AppDescriptor, AppEndpoint, AppInstance, AppZtNetwork, Asset, Cluster, Device, DeviceGroup,
    EdgeController, Node, Organization, ParametrizedDescriptor, Role, SmResult, User,
};

/// Change applied to a stored row within a single provider call. Returning
/// an error leaves the row untouched. It must not change the row's key
/// fields.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> SmResult<()> + Send>;

#[async_trait]
pub trait OrganizationProvider: Send + Sync {
    async fn add(&self, org: &Organization) -> SmResult<()>;
    async fn update(&self, org: &Organization) -> SmResult<()>;
    async fn exists(&self, organization_id: &str) -> SmResult<bool>;
    async fn get(&self, organization_id: &str) -> SmResult<Organization>;
    async fn list(&self) -> SmResult<Vec<Organization>>;
    async fn modify(
        &self,
        organization_id: &str,
        change: Mutation<Organization>,
    ) -> SmResult<Organization>;
    /// Removes the organization together with its linkage sets.
    async fn remove(&self, organization_id: &str) -> SmResult<()>;

    // Cluster ids linked to the organization.
    async fn add_cluster(&self, organization_id: &str, cluster_id: &str) -> SmResult<()>;
    async fn cluster_exists(&self, organization_id: &str, cluster_id: &str) -> SmResult<bool>;
    async fn list_clusters(&self, organization_id: &str) -> SmResult<Vec<String>>;
    async fn delete_cluster(&self, organization_id: &str, cluster_id: &str) -> SmResult<()>;

    // Role ids linked to the organization. This set is the membership record.
    async fn add_role(&self, organization_id: &str, role_id: &str) -> SmResult<()>;
    async fn role_exists(&self, organization_id: &str, role_id: &str) -> SmResult<bool>;
    async fn list_roles(&self, organization_id: &str) -> SmResult<Vec<String>>;
    async fn delete_role(&self, organization_id: &str, role_id: &str) -> SmResult<()>;

    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait ClusterProvider: Send + Sync {
    async fn add(&self, cluster: &Cluster) -> SmResult<()>;
    async fn update(&self, cluster: &Cluster) -> SmResult<()>;
    async fn exists(&self, organization_id: &str, cluster_id: &str) -> SmResult<bool>;
    async fn get(&self, organization_id: &str, cluster_id: &str) -> SmResult<Cluster>;
    async fn list(&self, organization_id: &str) -> SmResult<Vec<Cluster>>;
    async fn modify(
        &self,
        organization_id: &str,
        cluster_id: &str,
        change: Mutation<Cluster>,
    ) -> SmResult<Cluster>;
    /// Removes the cluster together with its node linkage set.
    async fn remove(&self, organization_id: &str, cluster_id: &str) -> SmResult<()>;

    async fn add_node(&self, organization_id: &str, cluster_id: &str, node_id: &str)
    -> SmResult<()>;
    async fn node_exists(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<bool>;
    async fn list_nodes(&self, organization_id: &str, cluster_id: &str) -> SmResult<Vec<String>>;
    async fn delete_node(
        &self,
        organization_id: &str,
        cluster_id: &str,
        node_id: &str,
    ) -> SmResult<()>;

    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait NodeProvider: Send + Sync {
    async fn add(&self, node: &Node) -> SmResult<()>;
    async fn update(&self, node: &Node) -> SmResult<()>;
    async fn exists(&self, organization_id: &str, node_id: &str) -> SmResult<bool>;
    async fn get(&self, organization_id: &str, node_id: &str) -> SmResult<Node>;
    async fn list(&self, organization_id: &str) -> SmResult<Vec<Node>>;
    /// Apply `change` to the stored node and return the written row.
    async fn modify(
        &self,
        organization_id: &str,
        node_id: &str,
        change: Mutation<Node>,
    ) -> SmResult<Node>;
    async fn remove(&self, organization_id: &str, node_id: &str) -> SmResult<()>;
    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait RoleProvider: Send + Sync {
    async fn add(&self, role: &Role) -> SmResult<()>;
    async fn update(&self, role: &Role) -> SmResult<()>;
    async fn exists(&self, organization_id: &str, role_id: &str) -> SmResult<bool>;
    async fn get(&self, organization_id: &str, role_id: &str) -> SmResult<Role>;
    async fn list(&self, organization_id: &str) -> SmResult<Vec<Role>>;
    async fn modify(
        &self,
        organization_id: &str,
        role_id: &str,
        change: Mutation<Role>,
    ) -> SmResult<Role>;
    async fn remove(&self, organization_id: &str, role_id: &str) -> SmResult<()>;
    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn add(&self, user: &User) -> SmResult<()>;
    async fn update(&self, user: &User) -> SmResult<()>;
    async fn exists(&self, organization_id: &str, email: &str) -> SmResult<bool>;
    async fn get(&self, organization_id: &str, email: &str) -> SmResult<User>;
    async fn list(&self, organization_id: &str) -> SmResult<Vec<User>>;
    async fn modify(
        &self,
        organization_id: &str,
        email: &str,
        change: Mutation<User>,
    ) -> SmResult<User>;
    async fn remove(&self, organization_id: &str, email: &str) -> SmResult<()>;
    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait DeviceProvider: Send + Sync {
    /// Fails `AlreadyExists` on a taken id, and also when another group of
    /// the organization already uses the name.
    async fn add_device_group(&self, group: &DeviceGroup) -> SmResult<()>;
    async fn update_device_group(&self, group: &DeviceGroup) -> SmResult<()>;
    async fn device_group_exists(&self, organization_id: &str, group_id: &str) -> SmResult<bool>;
    async fn device_group_exists_by_name(&self, organization_id: &str, name: &str)
    -> SmResult<bool>;
    async fn get_device_group(&self, organization_id: &str, group_id: &str)
    -> SmResult<DeviceGroup>;
    async fn list_device_groups(&self, organization_id: &str) -> SmResult<Vec<DeviceGroup>>;
    async fn modify_device_group(
        &self,
        organization_id: &str,
        group_id: &str,
        change: Mutation<DeviceGroup>,
    ) -> SmResult<DeviceGroup>;
    /// Removes the group and every device registered in it.
    async fn remove_device_group(&self, organization_id: &str, group_id: &str) -> SmResult<()>;

    async fn add_device(&self, device: &Device) -> SmResult<()>;
    async fn update_device(&self, device: &Device) -> SmResult<()>;
    async fn device_exists(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<bool>;
    async fn get_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<Device>;
    async fn list_devices(&self, organization_id: &str, group_id: &str) -> SmResult<Vec<Device>>;
    async fn modify_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
        change: Mutation<Device>,
    ) -> SmResult<Device>;
    async fn remove_device(
        &self,
        organization_id: &str,
        group_id: &str,
        device_id: &str,
    ) -> SmResult<()>;

    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait ApplicationProvider: Send + Sync {
    async fn add_descriptor(&self, descriptor: &AppDescriptor) -> SmResult<()>;
    async fn update_descriptor(&self, descriptor: &AppDescriptor) -> SmResult<()>;
    async fn descriptor_exists(&self, organization_id: &str, descriptor_id: &str)
    -> SmResult<bool>;
    async fn get_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<AppDescriptor>;
    async fn list_descriptors(&self, organization_id: &str) -> SmResult<Vec<AppDescriptor>>;
    async fn modify_descriptor(
        &self,
        organization_id: &str,
        descriptor_id: &str,
        change: Mutation<AppDescriptor>,
    ) -> SmResult<AppDescriptor>;
    async fn remove_descriptor(&self, organization_id: &str, descriptor_id: &str)
    -> SmResult<()>;

    async fn add_instance(&self, instance: &AppInstance) -> SmResult<()>;
    async fn update_instance(&self, instance: &AppInstance) -> SmResult<()>;
    /// Apply `change` to the stored instance and return the written row.
    async fn modify_instance(
        &self,
        organization_id: &str,
        instance_id: &str,
        change: Mutation<AppInstance>,
    ) -> SmResult<AppInstance>;
    async fn instance_exists(&self, organization_id: &str, instance_id: &str) -> SmResult<bool>;
    async fn get_instance(&self, organization_id: &str, instance_id: &str)
    -> SmResult<AppInstance>;
    async fn list_instances(&self, organization_id: &str) -> SmResult<Vec<AppInstance>>;
    async fn list_descriptor_instances(
        &self,
        organization_id: &str,
        descriptor_id: &str,
    ) -> SmResult<Vec<AppInstance>>;
    /// Removes the instance together with its endpoints, its parametrized
    /// descriptor and its network.
    async fn remove_instance(&self, organization_id: &str, instance_id: &str) -> SmResult<()>;

    // Endpoints, keyed by (organization, instance, endpoint instance id).
    async fn add_app_endpoint(&self, endpoint: &AppEndpoint) -> SmResult<()>;
    async fn get_app_endpoints(&self, organization_id: &str, fqdn: &str)
    -> SmResult<Vec<AppEndpoint>>;
    /// Drops every endpoint of the instance. Returns how many went.
    async fn remove_app_endpoints(&self, organization_id: &str, instance_id: &str)
    -> SmResult<usize>;

    // At most one parametrized descriptor per instance.
    async fn add_parametrized_descriptor(&self, descriptor: &ParametrizedDescriptor)
    -> SmResult<()>;
    async fn get_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<ParametrizedDescriptor>;
    async fn remove_parametrized_descriptor(
        &self,
        organization_id: &str,
        instance_id: &str,
    ) -> SmResult<()>;

    // At most one network per instance.
    async fn add_zt_network(&self, network: &AppZtNetwork) -> SmResult<()>;
    async fn get_zt_network(&self, organization_id: &str, instance_id: &str)
    -> SmResult<AppZtNetwork>;
    async fn remove_zt_network(&self, organization_id: &str, instance_id: &str) -> SmResult<()>;

    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait EdgeControllerProvider: Send + Sync {
    async fn add(&self, controller: &EdgeController) -> SmResult<()>;
    async fn update(&self, controller: &EdgeController) -> SmResult<()>;
    async fn exists(&self, organization_id: &str, edge_controller_id: &str) -> SmResult<bool>;
    async fn get(&self, organization_id: &str, edge_controller_id: &str)
    -> SmResult<EdgeController>;
    async fn list(&self, organization_id: &str) -> SmResult<Vec<EdgeController>>;
    async fn modify(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
        change: Mutation<EdgeController>,
    ) -> SmResult<EdgeController>;
    async fn remove(&self, organization_id: &str, edge_controller_id: &str) -> SmResult<()>;
    async fn clear(&self) -> SmResult<()>;
}

#[async_trait]
pub trait AssetProvider: Send + Sync {
    async fn add(&self, asset: &Asset) -> SmResult<()>;
    async fn update(&self, asset: &Asset) -> SmResult<()>;
    async fn exists(&self, organization_id: &str, asset_id: &str) -> SmResult<bool>;
    async fn get(&self, organization_id: &str, asset_id: &str) -> SmResult<Asset>;
    async fn list(&self, organization_id: &str) -> SmResult<Vec<Asset>>;
    async fn modify(
        &self,
        organization_id: &str,
        asset_id: &str,
        change: Mutation<Asset>,
    ) -> SmResult<Asset>;
    async fn list_controller_assets(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
    ) -> SmResult<Vec<Asset>>;
    async fn remove(&self, organization_id: &str, asset_id: &str) -> SmResult<()>;
    async fn clear(&self) -> SmResult<()>;
}
