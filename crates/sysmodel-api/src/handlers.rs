//! REST API handlers for organizations, infrastructure and access.
//!
//! Each handler fills path identifiers into the request, validates it, and
//! hands it to a manager. Results use one JSON envelope.

use axum::Json;
use axum::extract::{FromRequest, Path, Request, State};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

use sysmodel_entities::*;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        })
    }
}

pub(crate) fn status_for(err: &SystemModelError) -> StatusCode {
    match err {
        SystemModelError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        SystemModelError::NotFound { .. } => StatusCode::NOT_FOUND,
        SystemModelError::AlreadyExists { .. } => StatusCode::CONFLICT,
        SystemModelError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
        SystemModelError::Inconsistent { .. } | SystemModelError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(err: &SystemModelError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        warn!(kind = err.kind(), error = %err, "request failed");
    }
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }),
    )
        .into_response()
}

/// JSON body extractor. A body that does not parse is answered with the
/// usual envelope as `invalid_argument`.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(error_response(&SystemModelError::invalid(
                rejection.body_text(),
            ))),
        }
    }
}

pub(crate) fn reply_with<T: Serialize>(status: StatusCode, result: SmResult<T>) -> Response {
    match result {
        Ok(data) => (status, ApiResponse::ok(data)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub(crate) fn reply<T: Serialize>(result: SmResult<T>) -> Response {
    reply_with(StatusCode::OK, result)
}

pub(crate) fn created<T: Serialize>(result: SmResult<T>) -> Response {
    reply_with(StatusCode::CREATED, result)
}

pub(crate) fn deleted(result: SmResult<()>) -> Response {
    reply(result.map(|()| "deleted"))
}

// ── Organizations ──────────────────────────────────────────────

/// GET /api/v1/organizations
pub async fn list_organizations(State(state): State<ApiState>) -> Response {
    reply(state.managers.organizations.list().await)
}

/// POST /api/v1/organizations
pub async fn add_organization(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<AddOrganizationRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.organizations.add(&req).await)
}

/// GET /api/v1/organizations/{org}
pub async fn get_organization(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.organizations.get(&org).await)
}

/// PATCH /api/v1/organizations/{org}
pub async fn update_organization(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<UpdateOrganizationRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.organizations.update(&req).await)
}

/// DELETE /api/v1/organizations/{org}
pub async fn remove_organization(
    State(state): State<ApiState>,
    Path(org): Path<String>,
) -> Response {
    deleted(state.managers.organizations.remove(&org).await)
}

// ── Clusters ───────────────────────────────────────────────────

/// GET /api/v1/organizations/{org}/clusters
pub async fn list_clusters(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.clusters.list(&org).await)
}

/// POST /api/v1/organizations/{org}/clusters
pub async fn add_cluster(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddClusterRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.clusters.add(&req).await)
}

/// GET /api/v1/organizations/{org}/clusters/{cluster}
pub async fn get_cluster(
    State(state): State<ApiState>,
    Path((org, cluster)): Path<(String, String)>,
) -> Response {
    reply(state.managers.clusters.get(&org, &cluster).await)
}

/// PATCH /api/v1/organizations/{org}/clusters/{cluster}
pub async fn update_cluster(
    State(state): State<ApiState>,
    Path((org, cluster)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateClusterRequest>,
) -> Response {
    req.organization_id = org;
    req.cluster_id = cluster;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.clusters.update(&req).await)
}

/// DELETE /api/v1/organizations/{org}/clusters/{cluster}
pub async fn remove_cluster(
    State(state): State<ApiState>,
    Path((org, cluster)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.clusters.remove(&org, &cluster).await)
}

/// GET /api/v1/organizations/{org}/clusters/{cluster}/nodes
pub async fn list_cluster_nodes(
    State(state): State<ApiState>,
    Path((org, cluster)): Path<(String, String)>,
) -> Response {
    reply(state.managers.nodes.list_cluster_nodes(&org, &cluster).await)
}

// ── Nodes ──────────────────────────────────────────────────────

/// GET /api/v1/organizations/{org}/nodes
pub async fn list_nodes(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.nodes.list(&org).await)
}

/// POST /api/v1/organizations/{org}/nodes
pub async fn add_node(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddNodeRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.nodes.add(&req).await)
}

/// GET /api/v1/organizations/{org}/nodes/{node}
pub async fn get_node(
    State(state): State<ApiState>,
    Path((org, node)): Path<(String, String)>,
) -> Response {
    reply(state.managers.nodes.get(&org, &node).await)
}

/// PATCH /api/v1/organizations/{org}/nodes/{node}
pub async fn update_node(
    State(state): State<ApiState>,
    Path((org, node)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateNodeRequest>,
) -> Response {
    req.organization_id = org;
    req.node_id = node;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.nodes.update(&req).await)
}

/// POST /api/v1/organizations/{org}/nodes/{node}/attach
pub async fn attach_node(
    State(state): State<ApiState>,
    Path((org, node)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<AttachNodeRequest>,
) -> Response {
    req.organization_id = org;
    req.node_id = node;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.nodes.attach(&req).await)
}

/// POST /api/v1/organizations/{org}/nodes/{node}/detach
pub async fn detach_node(
    State(state): State<ApiState>,
    Path((org, node)): Path<(String, String)>,
) -> Response {
    reply(state.managers.nodes.detach(&org, &node).await)
}

/// POST /api/v1/organizations/{org}/nodes/remove
pub async fn remove_nodes(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<RemoveNodesRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    deleted(state.managers.nodes.remove_nodes(&req).await)
}

// ── Roles ──────────────────────────────────────────────────────

/// GET /api/v1/organizations/{org}/roles
pub async fn list_roles(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.roles.list(&org).await)
}

/// POST /api/v1/organizations/{org}/roles
pub async fn add_role(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddRoleRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.roles.add(&req).await)
}

/// GET /api/v1/organizations/{org}/roles/{role}
pub async fn get_role(
    State(state): State<ApiState>,
    Path((org, role)): Path<(String, String)>,
) -> Response {
    reply(state.managers.roles.get(&org, &role).await)
}

/// PATCH /api/v1/organizations/{org}/roles/{role}
pub async fn update_role(
    State(state): State<ApiState>,
    Path((org, role)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateRoleRequest>,
) -> Response {
    req.organization_id = org;
    req.role_id = role;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.roles.update(&req).await)
}

/// DELETE /api/v1/organizations/{org}/roles/{role}
pub async fn remove_role(
    State(state): State<ApiState>,
    Path((org, role)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.roles.remove(&org, &role).await)
}

/// POST /api/v1/organizations/{org}/reconcile-roles
pub async fn reconcile_roles(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.roles.reconcile(&org).await)
}

/// POST /api/v1/organizations/{org}/reconcile-clusters
pub async fn reconcile_clusters(
    State(state): State<ApiState>,
    Path(org): Path<String>,
) -> Response {
    reply(state.managers.clusters.reconcile(&org).await)
}

// ── Users ──────────────────────────────────────────────────────

/// GET /api/v1/organizations/{org}/users
pub async fn list_users(State(state): State<ApiState>, Path(org): Path<String>) -> Response {
    reply(state.managers.users.list(&org).await)
}

/// POST /api/v1/organizations/{org}/users
pub async fn add_user(
    State(state): State<ApiState>,
    Path(org): Path<String>,
    ApiJson(mut req): ApiJson<AddUserRequest>,
) -> Response {
    req.organization_id = org;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    created(state.managers.users.add(&req).await)
}

/// GET /api/v1/organizations/{org}/users/{email}
pub async fn get_user(
    State(state): State<ApiState>,
    Path((org, email)): Path<(String, String)>,
) -> Response {
    reply(state.managers.users.get(&org, &email).await)
}

/// PATCH /api/v1/organizations/{org}/users/{email}
pub async fn update_user(
    State(state): State<ApiState>,
    Path((org, email)): Path<(String, String)>,
    ApiJson(mut req): ApiJson<UpdateUserRequest>,
) -> Response {
    req.organization_id = org;
    req.email = email;
    if let Err(e) = req.validate() {
        return error_response(&e);
    }
    reply(state.managers.users.update(&req).await)
}

/// DELETE /api/v1/organizations/{org}/users/{email}
pub async fn remove_user(
    State(state): State<ApiState>,
    Path((org, email)): Path<(String, String)>,
) -> Response {
    deleted(state.managers.users.remove(&org, &email).await)
}
