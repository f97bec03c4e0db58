//! sysmodel-api: REST API for the system model.
//!
//! Every route lives under `/api/v1/organizations`. Request bodies are
//! validated before they reach a manager; identifiers in the path win over
//! the same fields in the body.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET, POST | `/organizations` | List / add organizations |
//! | GET, PATCH, DELETE | `/organizations/{org}` | Get / update / remove (unsupported) |
//! | GET, POST | `/organizations/{org}/clusters` | List / add clusters |
//! | GET, PATCH, DELETE | `/organizations/{org}/clusters/{cluster}` | One cluster |
//! | GET | `/organizations/{org}/clusters/{cluster}/nodes` | Nodes linked on a cluster |
//! | GET, POST | `/organizations/{org}/nodes` | List / add nodes |
//! | POST | `/organizations/{org}/nodes/remove` | Remove a batch of nodes |
//! | GET, PATCH | `/organizations/{org}/nodes/{node}` | One node |
//! | POST | `/organizations/{org}/nodes/{node}/attach` | Assign to a cluster |
//! | POST | `/organizations/{org}/nodes/{node}/detach` | Release from its cluster |
//! | GET, POST | `/organizations/{org}/roles` | List / add roles |
//! | GET, PATCH, DELETE | `/organizations/{org}/roles/{role}` | One role |
//! | POST | `/organizations/{org}/reconcile-roles` | Repair role membership |
//! | POST | `/organizations/{org}/reconcile-clusters` | Repair cluster membership and node assignment |
//! | GET, POST | `/organizations/{org}/users` | List / add users |
//! | GET, PATCH, DELETE | `/organizations/{org}/users/{email}` | One user |
//! | GET, POST | `/organizations/{org}/device-groups` | List / add device groups |
//! | GET, PATCH, DELETE | `/organizations/{org}/device-groups/{group}` | One group |
//! | GET, POST | `/organizations/{org}/device-groups/{group}/devices` | Devices of a group |
//! | GET, PATCH, DELETE | `/organizations/{org}/device-groups/{group}/devices/{device}` | One device |
//! | GET, POST | `/organizations/{org}/app-descriptors` | List / add descriptors |
//! | GET, PATCH, DELETE | `/organizations/{org}/app-descriptors/{desc}` | One descriptor |
//! | GET | `/organizations/{org}/app-descriptors/{desc}/parameters` | Declared parameters |
//! | GET | `/organizations/{org}/app-descriptors/{desc}/instances` | Instances deployed from it |
//! | GET, POST | `/organizations/{org}/app-instances` | List / add instances |
//! | GET, PUT, DELETE | `/organizations/{org}/app-instances/{inst}` | One instance |
//! | GET | `/organizations/{org}/app-instances/{inst}/parameters` | Instance parameters |
//! | POST | `/organizations/{org}/app-instances/{inst}/status` | Set application status |
//! | POST | `/organizations/{org}/app-instances/{inst}/service-status` | Set a service's status |
//! | POST | `/organizations/{org}/app-instances/{inst}/group-instances` | Add group instances |
//! | POST | `/organizations/{org}/app-instances/{inst}/group-instances/remove` | Remove group instances |
//! | POST | `/organizations/{org}/app-instances/{inst}/group-instances/{sgi}/services` | Add a service instance |
//! | GET, PUT | `/organizations/{org}/app-instances/{inst}/group-instances/{sgi}/metadata` | Group instance metadata |
//! | POST, DELETE | `/organizations/{org}/app-instances/{inst}/endpoints` | Add / drop endpoints |
//! | GET | `/organizations/{org}/app-endpoints?fqdn=` | Endpoints serving a name |
//! | GET, POST, DELETE | `/organizations/{org}/app-instances/{inst}/parametrized-descriptor` | Parametrized descriptor |
//! | GET, POST, DELETE | `/organizations/{org}/app-instances/{inst}/zt-network` | Overlay network |
//! | GET, POST | `/organizations/{org}/edge-controllers` | List / add controllers |
//! | GET, PATCH, DELETE | `/organizations/{org}/edge-controllers/{ec}` | One controller |
//! | GET | `/organizations/{org}/edge-controllers/{ec}/assets` | Assets it manages |
//! | GET, POST | `/organizations/{org}/assets` | List / add assets |
//! | GET, PATCH, DELETE | `/organizations/{org}/assets/{asset}` | One asset |

pub mod app_handlers;
pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use sysmodel_manager::Managers;

use crate::app_handlers as apps;
use crate::handlers as h;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub managers: Managers,
}

/// Build the API router.
pub fn build_router(managers: Managers) -> Router {
    let state = ApiState { managers };

    let org_routes = Router::new()
        .route("/", get(h::list_organizations).post(h::add_organization))
        .route(
            "/{org}",
            get(h::get_organization)
                .patch(h::update_organization)
                .delete(h::remove_organization),
        )
        // Infrastructure
        .route("/{org}/clusters", get(h::list_clusters).post(h::add_cluster))
        .route(
            "/{org}/clusters/{cluster}",
            get(h::get_cluster)
                .patch(h::update_cluster)
                .delete(h::remove_cluster),
        )
        .route("/{org}/clusters/{cluster}/nodes", get(h::list_cluster_nodes))
        .route("/{org}/nodes", get(h::list_nodes).post(h::add_node))
        .route("/{org}/nodes/remove", post(h::remove_nodes))
        .route("/{org}/nodes/{node}", get(h::get_node).patch(h::update_node))
        .route("/{org}/nodes/{node}/attach", post(h::attach_node))
        .route("/{org}/nodes/{node}/detach", post(h::detach_node))
        // Access
        .route("/{org}/roles", get(h::list_roles).post(h::add_role))
        .route(
            "/{org}/roles/{role}",
            get(h::get_role).patch(h::update_role).delete(h::remove_role),
        )
        .route("/{org}/reconcile-roles", post(h::reconcile_roles))
        .route("/{org}/reconcile-clusters", post(h::reconcile_clusters))
        .route("/{org}/users", get(h::list_users).post(h::add_user))
        .route(
            "/{org}/users/{email}",
            get(h::get_user).patch(h::update_user).delete(h::remove_user),
        )
        // Devices
        .route(
            "/{org}/device-groups",
            get(apps::list_device_groups).post(apps::add_device_group),
        )
        .route(
            "/{org}/device-groups/{group}",
            get(apps::get_device_group)
                .patch(apps::update_device_group)
                .delete(apps::remove_device_group),
        )
        .route(
            "/{org}/device-groups/{group}/devices",
            get(apps::list_devices).post(apps::add_device),
        )
        .route(
            "/{org}/device-groups/{group}/devices/{device}",
            get(apps::get_device)
                .patch(apps::update_device)
                .delete(apps::remove_device),
        )
        // Applications
        .route(
            "/{org}/app-descriptors",
            get(apps::list_descriptors).post(apps::add_descriptor),
        )
        .route(
            "/{org}/app-descriptors/{desc}",
            get(apps::get_descriptor)
                .patch(apps::update_descriptor)
                .delete(apps::remove_descriptor),
        )
        .route(
            "/{org}/app-descriptors/{desc}/parameters",
            get(apps::descriptor_parameters),
        )
        .route(
            "/{org}/app-descriptors/{desc}/instances",
            get(apps::list_descriptor_instances),
        )
        .route(
            "/{org}/app-instances",
            get(apps::list_instances).post(apps::add_instance),
        )
        .route(
            "/{org}/app-instances/{inst}",
            get(apps::get_instance)
                .put(apps::replace_instance)
                .delete(apps::remove_instance),
        )
        .route(
            "/{org}/app-instances/{inst}/parameters",
            get(apps::instance_parameters),
        )
        .route("/{org}/app-instances/{inst}/status", post(apps::update_app_status))
        .route(
            "/{org}/app-instances/{inst}/service-status",
            post(apps::update_service_status),
        )
        .route(
            "/{org}/app-instances/{inst}/group-instances",
            post(apps::add_service_group_instances),
        )
        .route(
            "/{org}/app-instances/{inst}/group-instances/remove",
            post(apps::remove_service_group_instances),
        )
        .route(
            "/{org}/app-instances/{inst}/group-instances/{sgi}/services",
            post(apps::add_service_instance),
        )
        .route(
            "/{org}/app-instances/{inst}/group-instances/{sgi}/metadata",
            get(apps::get_group_metadata).put(apps::update_group_metadata),
        )
        .route(
            "/{org}/app-instances/{inst}/endpoints",
            post(apps::add_app_endpoint).delete(apps::remove_app_endpoints),
        )
        .route("/{org}/app-endpoints", get(apps::get_app_endpoints))
        .route(
            "/{org}/app-instances/{inst}/parametrized-descriptor",
            get(apps::get_parametrized_descriptor)
                .post(apps::add_parametrized_descriptor)
                .delete(apps::remove_parametrized_descriptor),
        )
        .route(
            "/{org}/app-instances/{inst}/zt-network",
            get(apps::get_zt_network)
                .post(apps::add_zt_network)
                .delete(apps::remove_zt_network),
        )
        // Edge
        .route(
            "/{org}/edge-controllers",
            get(apps::list_controllers).post(apps::add_controller),
        )
        .route(
            "/{org}/edge-controllers/{ec}",
            get(apps::get_controller)
                .patch(apps::update_controller)
                .delete(apps::remove_controller),
        )
        .route(
            "/{org}/edge-controllers/{ec}/assets",
            get(apps::list_controller_assets),
        )
        .route("/{org}/assets", get(apps::list_assets).post(apps::add_asset))
        .route(
            "/{org}/assets/{asset}",
            get(apps::get_asset)
                .patch(apps::update_asset)
                .delete(apps::remove_asset),
        )
        .with_state(state);

    Router::new().nest("/api/v1/organizations", org_routes)
}
