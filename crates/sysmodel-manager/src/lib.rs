//! Managers sequence provider calls to keep the organization hierarchy
//! consistent.
//!
//! A provider only sees its own family. Managers check that every ancestor
//! exists before a mutation, issue the mutation, and then perform any
//! linkage write on an ancestor's provider. Those steps are not atomic: when
//! a later step fails after an earlier one committed, the caller gets
//! [`SystemModelError::Inconsistent`] and the committed writes stay.
//!
//! Dropping a manager future stops the sequence at the next await point.
//! Nothing already written is undone.

mod application;
mod cluster;
mod device;
mod edge;
mod node;
mod organization;
mod role;
mod user;

use std::sync::Arc;

use tracing::error;

use sysmodel_entities::{EntityKind, IdGenerator, SmResult, SystemModelError};
use sysmodel_provider::{ClusterProvider, OrganizationProvider, Providers};

pub use application::ApplicationManager;
pub use cluster::{ClusterManager, ClusterReconcileReport};
pub use device::DeviceManager;
pub use edge::EdgeManager;
pub use node::NodeManager;
pub use organization::OrganizationManager;
pub use role::{ReconcileReport, RoleManager};
pub use user::UserManager;

/// Every manager, sharing one provider bundle and one id source.
#[derive(Clone)]
pub struct Managers {
    pub organizations: OrganizationManager,
    pub clusters: ClusterManager,
    pub nodes: NodeManager,
    pub roles: RoleManager,
    pub users: UserManager,
    pub devices: DeviceManager,
    pub applications: ApplicationManager,
    pub edge: EdgeManager,
}

impl Managers {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            organizations: OrganizationManager::new(providers, ids.clone()),
            clusters: ClusterManager::new(providers, ids.clone()),
            nodes: NodeManager::new(providers, ids.clone()),
            roles: RoleManager::new(providers, ids.clone()),
            users: UserManager::new(providers),
            devices: DeviceManager::new(providers, ids.clone()),
            applications: ApplicationManager::new(providers, ids.clone()),
            edge: EdgeManager::new(providers, ids),
        }
    }
}

pub(crate) async fn require_org(
    orgs: &dyn OrganizationProvider,
    organization_id: &str,
) -> SmResult<()> {
    if orgs.exists(organization_id).await? {
        Ok(())
    } else {
        Err(SystemModelError::not_found(
            EntityKind::Organization,
            &[organization_id],
        ))
    }
}

/// A cluster is a member of its organization while it has a row and the
/// organization links it.
pub(crate) async fn require_cluster(
    orgs: &dyn OrganizationProvider,
    clusters: &dyn ClusterProvider,
    organization_id: &str,
    cluster_id: &str,
) -> SmResult<()> {
    require_org(orgs, organization_id).await?;
    if orgs.cluster_exists(organization_id, cluster_id).await?
        && clusters.exists(organization_id, cluster_id).await?
    {
        Ok(())
    } else {
        Err(SystemModelError::not_found(
            EntityKind::Cluster,
            &[organization_id, cluster_id],
        ))
    }
}

/// Resolve the outcome of a multi-step mutation. A failure after the first
/// committed write becomes `Inconsistent`; before it, the error is returned
/// as is.
pub(crate) fn settle<T>(
    operation: &str,
    keys: &[&str],
    committed: bool,
    outcome: SmResult<T>,
) -> SmResult<T> {
    match outcome {
        Ok(value) => Ok(value),
        Err(cause) if committed => {
            error!(operation, keys = %keys.join("/"), %cause, "partial write left in place");
            Err(SystemModelError::inconsistent(operation, keys, cause))
        }
        Err(cause) => Err(cause),
    }
}
