//! redb table definitions.
//!
//! Row tables use `&str` keys and JSON `&[u8]` values. Keys are the entity's
//! key path joined with `/`, e.g. `{organization_id}/{cluster_id}`.
//! Link tables store `{parent path}/{child id}` with an empty value.

use redb::TableDefinition;

pub type Table = TableDefinition<'static, &'static str, &'static [u8]>;

pub const ORGANIZATIONS: Table = TableDefinition::new("organizations");
/// Cluster ids linked to an organization.
pub const ORGANIZATION_CLUSTERS: Table = TableDefinition::new("organization_clusters");
/// Role ids linked to an organization.
pub const ORGANIZATION_ROLES: Table = TableDefinition::new("organization_roles");

pub const CLUSTERS: Table = TableDefinition::new("clusters");
/// Node ids attached to a cluster, keyed `{org}/{cluster}/{node}`.
pub const CLUSTER_NODES: Table = TableDefinition::new("cluster_nodes");

pub const NODES: Table = TableDefinition::new("nodes");
pub const ROLES: Table = TableDefinition::new("roles");
pub const USERS: Table = TableDefinition::new("users");

pub const DEVICE_GROUPS: Table = TableDefinition::new("device_groups");
/// Devices keyed `{org}/{group}/{device}`.
pub const DEVICES: Table = TableDefinition::new("devices");

pub const APP_DESCRIPTORS: Table = TableDefinition::new("app_descriptors");
pub const APP_INSTANCES: Table = TableDefinition::new("app_instances");
/// Endpoints keyed `{org}/{app instance}/{endpoint instance}`.
pub const APP_ENDPOINTS: Table = TableDefinition::new("app_endpoints");
/// One per instance, keyed `{org}/{app instance}`.
pub const PARAMETRIZED_DESCRIPTORS: Table = TableDefinition::new("parametrized_descriptors");
pub const APP_ZT_NETWORKS: Table = TableDefinition::new("app_zt_networks");

pub const EDGE_CONTROLLERS: Table = TableDefinition::new("edge_controllers");
pub const ASSETS: Table = TableDefinition::new("assets");

pub const ALL: [Table; 17] = [
    ORGANIZATIONS,
    ORGANIZATION_CLUSTERS,
    ORGANIZATION_ROLES,
    CLUSTERS,
    CLUSTER_NODES,
    NODES,
    ROLES,
    USERS,
    DEVICE_GROUPS,
    DEVICES,
    APP_DESCRIPTORS,
    APP_INSTANCES,
    APP_ENDPOINTS,
    PARAMETRIZED_DESCRIPTORS,
    APP_ZT_NETWORKS,
    EDGE_CONTROLLERS,
    ASSETS,
];
