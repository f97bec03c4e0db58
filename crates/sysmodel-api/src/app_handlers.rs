//! REST API handlers for devices, applications and edge inventory.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use sysmodel_entities::*;

use crate::ApiState;
use crate::handlers::{ApiJson, created, deleted, error_response, reply};

// ── Device groups ──────────────────────────────────────────────

/// GET /api/v1/organizations/{org}/device-groups
pub async fn list_device_groups(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.devices.list_groups(&org).await)
}

/// POST /api/v1/organizations/{org}/device-groups
pub async fn add_device_group(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddDeviceGroupRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.devices.add_group(&req).await)
}

/// GET /api/v1/organizations/{org}/device-groups/{group}
pub async fn get_device_group(
    State(state): State<ApiState>,
    Path((org, group)): Path<(String, String)>,
) -> Response {
    reply(state.managers.devices.get_group(&org, &group).await)
}

/// PATCH /api/v1/organizations/{org}/device-groups/{group}
pub async fn update_device_group(
    State(state): State<ApiState>,
    Path((org, group)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateDeviceGroupRequest>,
) -> Response {
    req.organization_id = org;
    req.device_group_id = group;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.devices.update_group(&req).await)
}

/// DELETE /api/v1/organizations/{org}/device-groups/{group}
pub async fn remove_device_group(
    State(state): State<ApiState>,
    Path((org, group)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.devices.remove_group(&org, &group).await)
}

// ── Devices ────────────────────────────────────────────────────

/// GET /api/v1/organizations/{org}/device-groups/{group}/devices
pub async fn list_devices(
    State(state): State<ApiState>,
    Path((org, group)): Path<(String, String)>,
) -> Response {
    reply(state.managers.devices.list_devices(&org, &group).await)
}

/// POST /api/v1/organizations/{org}/device-groups/{group}/devices
pub async fn add_device(
    State(state): State<ApiState>,
    Path((org, group)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<AddDeviceRequest>,
) -> Response {
    req.organization_id = org;
    req.device_group_id = group;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.devices.add_device(&req).await)
}

/// GET /api/v1/organizations/{org}/device-groups/{group}/devices/{device}
pub async fn get_device(
    State(state): State<ApiState>,
    Path((org, group, device)): Path<(String, String, String)>,
) -> Response {
    reply(state.managers.devices.get_device(&org, &group, &device).await)
}

/// PATCH /api/v1/organizations/{org}/device-groups/{group}/devices/{device}
pub async fn update_device(
    State(state): State<ApiState>,
    Path((org, group, device)): Path<(String, String, String)>,
    ApiJson(mut req): ApiJson<UpdateDeviceRequest>,
) -> Response {
    req.organization_id = org;
    req.device_group_id = group;
    req.device_id = device;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.devices.update_device(&req).await)
}

/// DELETE /api/v1/organizations/{org}/device-groups/{group}/devices/{device}
pub async fn remove_device(
    State(state): State<ApiState>,
    Path((org, group, device)): Path<(String, String, String)>,
) -> Response {
    deleted(
        state
            .managers
            .devices
            .remove_device(&org, &group, &device)
            .await,
    )
}

// ── Application descriptors ────────────────────────────────────

/// GET /api/v1/organizations/{org}/app-descriptors
pub async fn list_descriptors(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.applications.list_descriptors(&org).await)
}

/// POST /api/v1/organizations/{org}/app-descriptors
pub async fn add_descriptor(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddAppDescriptorRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.applications.add_descriptor(&req).await)
}

/// GET /api/v1/organizations/{org}/app-descriptors/{desc}
pub async fn get_descriptor(
    State(state): State<ApiState>,
    Path((org, desc)): Path<(String, String)>,
) -> Response {
    reply(state.managers.applications.get_descriptor(&org, &desc).await)
}

/// PATCH /api/v1/organizations/{org}/app-descriptors/{desc}
pub async fn update_descriptor(
    State(state): State<ApiState>,
    Path((org, desc)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateAppDescriptorRequest>,
) -> Response {
    req.organization_id = org;
    req.app_descriptor_id = desc;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.applications.update_descriptor(&req).await)
}

/// DELETE /api/v1/organizations/{org}/app-descriptors/{desc}
pub async fn remove_descriptor(
    State(state): State<ApiState>,
    Path((org, desc)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.applications.remove_descriptor(&org, &desc).await)
}

/// GET /api/v1/organizations/{org}/app-descriptors/{desc}/parameters
pub async fn descriptor_parameters(
    State(state): State<ApiState>,
    Path((org, desc)): Path<(String, String)>,
) -> Response {
    reply(
        state
            .managers
            .applications
            .descriptor_parameters(&org, &desc)
            .await,
    )
}

/// GET /api/v1/organizations/{org}/app-descriptors/{desc}/instances
pub async fn list_descriptor_instances(
    State(state): State<ApiState>,
    Path((org, desc)): Path<(String, String)>,
) -> Response {
    reply(
        state
            .managers
            .applications
            .list_descriptor_instances(&org, &desc)
            .await,
    )
}

// ── Application instances ──────────────────────────────────────

/// GET /api/v1/organizations/{org}/app-instances
pub async fn list_instances(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.applications.list_instances(&org).await)
}

/// POST /api/v1/organizations/{org}/app-instances
pub async fn add_instance(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddAppInstanceRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.applications.add_instance(&req).await)
}

/// GET /api/v1/organizations/{org}/app-instances/{inst}
pub async fn get_instance(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    reply(state.managers.applications.get_instance(&org, &inst).await)
}

/// PUT /api/v1/organizations/{org}/app-instances/{inst}
pub async fn replace_instance(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut instance): ApiJson<AppInstance>,
) -> Response {
    instance.organization_id = org;
    instance.app_instance_id = inst;
    let result = state.managers.applications.update_instance(&instance).await;
    reply(result.map(|()| instance))
}

/// DELETE /api/v1/organizations/{org}/app-instances/{inst}
pub async fn remove_instance(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.applications.remove_instance(&org, &inst).await)
}

/// GET /api/v1/organizations/{org}/app-instances/{inst}/parameters
pub async fn instance_parameters(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    reply(
        state
            .managers
            .applications
            .instance_parameters(&org, &inst)
            .await,
    )
}

/// POST /api/v1/organizations/{org}/app-instances/{inst}/status
pub async fn update_app_status(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateAppStatusRequest>,
) -> Response {
    req.organization_id = org;
    req.app_instance_id = inst;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.applications.update_app_status(&req).await)
}

/// POST /api/v1/organizations/{org}/app-instances/{inst}/service-status
pub async fn update_service_status(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateServiceStatusRequest>,
) -> Response {
    req.organization_id = org;
    req.app_instance_id = inst;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.applications.update_service_status(&req).await)
}

// ── Instance lifecycle ─────────────────────────────────────────

/// POST /api/v1/organizations/{org}/app-instances/{inst}/group-instances
pub async fn add_service_group_instances(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<AddServiceGroupInstancesRequest>,
) -> Response {
    req.organization_id = org;
    req.app_instance_id = inst;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(
        state
            .managers
            .applications
            .add_service_group_instances(&req)
            .await,
    )
}

/// POST /api/v1/organizations/{org}/app-instances/{inst}/group-instances/remove
pub async fn remove_service_group_instances(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<RemoveServiceGroupInstancesRequest>,
) -> Response {
    req.organization_id = org;
    req.app_instance_id = inst;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    deleted(
        state
            .managers
            .applications
            .remove_service_group_instances(&req)
            .await,
    )
}

/// POST /api/v1/organizations/{org}/app-instances/{inst}/group-instances/{sgi}/services
pub async fn add_service_instance(
    State(state): State<ApiState>,
    Path((org, inst, sgi)): Path<(String, String, String)>,
    ApiJson(mut req): ApiJson<AddServiceInstanceRequest>,
) -> Response {
    req.organization_id = org;
    req.app_instance_id = inst;
    req.service_group_instance_id = sgi;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.applications.add_service_instance(&req).await)
}

/// GET /api/v1/organizations/{org}/app-instances/{inst}/group-instances/{sgi}/metadata
pub async fn get_group_metadata(
    State(state): State<ApiState>,
    Path((org, inst, sgi)): Path<(String, String, String)>,
) -> Response {
    reply(
        state
            .managers
            .applications
            .get_group_metadata(&org, &inst, &sgi)
            .await,
    )
}

/// PUT /api/v1/organizations/{org}/app-instances/{inst}/group-instances/{sgi}/metadata
pub async fn update_group_metadata(
    State(state): State<ApiState>,
    Path((org, inst, sgi)): Path<(String, String, String)>,
    ApiJson(mut metadata): ApiJson<InstanceMetadata>,
) -> Response {
    metadata.organization_id = org;
    metadata.app_instance_id = inst;
    metadata.monitored_instance_id = sgi;
    if let Err(e) = metadata.validate() {
        return error_response(&e);
    }
    reply(
        state
            .managers
            .applications
            .update_group_metadata(&metadata)
            .await,
    )
}

// ── Endpoints ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EndpointQuery {
    #[serde(default)]
    pub fqdn: String,
}

/// GET /api/v1/organizations/{org}/app-endpoints?fqdn=...
pub async fn get_app_endpoints(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    Query(query): Query<EndpointQuery>,
) -> Response {
    reply(
        state
            .managers
            .applications
            .get_app_endpoints(&org, &query.fqdn)
            .await,
    )
}

/// POST /api/v1/organizations/{org}/app-instances/{inst}/endpoints
pub async fn add_app_endpoint(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<AddAppEndpointRequest>,
) -> Response {
    req.organization_id = org;
    req.app_instance_id = inst;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.applications.add_app_endpoint(&req).await)
}

/// DELETE /api/v1/organizations/{org}/app-instances/{inst}/endpoints
pub async fn remove_app_endpoints(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    deleted(
        state
            .managers
            .applications
            .remove_app_endpoints(&org, &inst)
            .await,
    )
}

// ── Parametrized descriptor and network ────────────────────────

/// POST /api/v1/organizations/{org}/app-instances/{inst}/parametrized-descriptor
pub async fn add_parametrized_descriptor(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut descriptor): ApiJson<ParametrizedDescriptor>,
) -> Response {
    descriptor.descriptor.organization_id = org;
    descriptor.app_instance_id = inst;
    if let Err(e) = descriptor.validate() {
        return error_response(&e);
    }
    created(
        state
            .managers
            .applications
            .add_parametrized_descriptor(&descriptor)
            .await,
    )
}

/// GET /api/v1/organizations/{org}/app-instances/{inst}/parametrized-descriptor
pub async fn get_parametrized_descriptor(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    reply(
        state
            .managers
            .applications
            .get_parametrized_descriptor(&org, &inst)
            .await,
    )
}

/// DELETE /api/v1/organizations/{org}/app-instances/{inst}/parametrized-descriptor
pub async fn remove_parametrized_descriptor(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    deleted(
        state
            .managers
            .applications
            .remove_parametrized_descriptor(&org, &inst)
            .await,
    )
}

/// POST /api/v1/organizations/{org}/app-instances/{inst}/zt-network
pub async fn add_zt_network(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
    ApiJson(mut network): ApiJson<AppZtNetwork>,
) -> Response {
    network.organization_id = org;
    network.app_instance_id = inst;
    if let Err(e) = network.validate() {
        return error_response(&e);
    }
    created(state.managers.applications.add_zt_network(&network).await)
}

/// GET /api/v1/organizations/{org}/app-instances/{inst}/zt-network
pub async fn get_zt_network(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    reply(state.managers.applications.get_zt_network(&org, &inst).await)
}

/// DELETE /api/v1/organizations/{org}/app-instances/{inst}/zt-network
pub async fn remove_zt_network(
    State(state): State<ApiState>,
    Path((org, inst)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.applications.remove_zt_network(&org, &inst).await)
}

// ── Edge controllers ───────────────────────────────────────────

/// GET /api/v1/organizations/{org}/edge-controllers
pub async fn list_controllers(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.edge.list_controllers(&org).await)
}

/// POST /api/v1/organizations/{org}/edge-controllers
pub async fn add_controller(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddEdgeControllerRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.edge.add_controller(&req).await)
}

/// GET /api/v1/organizations/{org}/edge-controllers/{ec}
pub async fn get_controller(
    State(state): State<ApiState>,
    Path((org, ec)): Path<(String, String)>,
) -> Response {
    reply(state.managers.edge.get_controller(&org, &ec).await)
}

/// PATCH /api/v1/organizations/{org}/edge-controllers/{ec}
pub async fn update_controller(
    State(state): State<ApiState>,
    Path((org, ec)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateEdgeControllerRequest>,
) -> Response {
    req.organization_id = org;
    req.edge_controller_id = ec;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.edge.update_controller(&req).await)
}

/// DELETE /api/v1/organizations/{org}/edge-controllers/{ec}
pub async fn remove_controller(
    State(state): State<ApiState>,
    Path((org, ec)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.edge.remove_controller(&org, &ec).await)
}

/// GET /api/v1/organizations/{org}/edge-controllers/{ec}/assets
pub async fn list_controller_assets(
    State(state): State<ApiState>,
    Path((org, ec)): Path<(String, String)>,
) -> Response {
    reply(state.managers.edge.list_controller_assets(&org, &ec).await)
}

// ── Assets ─────────────────────────────────────────────────────

/// GET /api/v1/organizations/{org}/assets
pub async fn list_assets(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.edge.list_assets(&org).await)
}

/// POST /api/v1/organizations/{org}/assets
pub async fn add_asset(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddAssetRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.edge.add_asset(&req).await)
}

/// GET /api/v1/organizations/{org}/assets/{asset}
pub async fn get_asset(
    State(state): State<ApiState>,
    Path((org, asset)): Path<(String, String)>,
) -> Response {
    reply(state.managers.edge.get_asset(&org, &asset).await)
}

/// PATCH /api/v1/organizations/{org}/assets/{asset}
pub async fn update_asset(
    State(state): State<ApiState>,
    Path((org, asset)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateAssetRequest>,
) -> Response {
    req.organization_id = org;
    req.asset_id = asset;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.edge.update_asset(&req).await)
}

/// DELETE /api/v1/organizations/{org}/assets/{asset}
pub async fn remove_asset(
    State(state): State<ApiState>,
    Path((org, asset)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.edge.remove_asset(&org, &asset).await)
}
