use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use sysmodel_entities::{
    AddRoleRequest, EntityKind, IdGenerator, Role, SmResult, SystemModelError, UpdateRoleRequest,
    epoch_secs,
};
use sysmodel_provider::{OrganizationProvider, Providers, RoleProvider};

use crate::{require_org, settle};

/// What [`RoleManager::reconcile`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Role rows the organization never linked, now deleted.
    pub removed_roles: Vec<String>,
    /// Links on the organization whose role row was gone, now dropped.
    pub dropped_links: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.removed_roles.is_empty() && self.dropped_links.is_empty()
    }
}

/// Roles are members of an organization only while the organization's role
/// set links them.
#[derive(Clone)]
pub struct RoleManager {
    orgs: Arc<dyn OrganizationProvider>,
    roles: Arc<dyn RoleProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl RoleManager {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            roles: providers.roles.clone(),
            ids,
        }
    }

    async fn require_member(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        if self.orgs.role_exists(organization_id, role_id).await? {
            Ok(())
        } else {
            Err(SystemModelError::not_found(
                EntityKind::Role,
                &[organization_id, role_id],
            ))
        }
    }

    /// Persist the role, then link it on the organization. If linking fails
    /// the row stays and the call reports `Inconsistent`.
    pub async fn add(&self, req: &AddRoleRequest) -> SmResult<Role> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let role = Role::from_request(req, self.ids.next_id(), epoch_secs())?;
        self.roles.add(&role).await?;
        let linked = self
            .orgs
            .add_role(&role.organization_id, &role.role_id)
            .await;
        settle(
            "add role",
            &[&role.organization_id, &role.role_id],
            true,
            linked,
        )?;
        info!(organization_id = %role.organization_id, role_id = %role.role_id, name = %role.name, "role added");
        Ok(role)
    }

    pub async fn get(&self, organization_id: &str, role_id: &str) -> SmResult<Role> {
        self.require_member(organization_id, role_id).await?;
        self.roles.get(organization_id, role_id).await
    }

    pub async fn list(&self, organization_id: &str) -> SmResult<Vec<Role>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        let linked: HashSet<String> = self
            .orgs
            .list_roles(organization_id)
            .await?
            .into_iter()
            .collect();
        let mut roles = self.roles.list(organization_id).await?;
        roles.retain(|r| linked.contains(&r.role_id));
        Ok(roles)
    }

    pub async fn update(&self, req: &UpdateRoleRequest) -> SmResult<Role> {
        self.require_member(&req.organization_id, &req.role_id)
            .await?;
        let update = req.clone();
        let role = self
            .roles
            .modify(
                &req.organization_id,
                &req.role_id,
                Box::new(move |role: &mut Role| {
                    role.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(organization_id = %role.organization_id, role_id = %role.role_id, "role updated");
        Ok(role)
    }

    /// Unlink first, then drop the row. A row left behind is not a member
    /// and is picked up by [`reconcile`](Self::reconcile).
    pub async fn remove(&self, organization_id: &str, role_id: &str) -> SmResult<()> {
        self.require_member(organization_id, role_id).await?;
        self.orgs.delete_role(organization_id, role_id).await?;
        let removed = match self.roles.remove(organization_id, role_id).await {
            Err(e) if e.is_not_found() => {
                warn!(%organization_id, %role_id, "linked role had no row");
                Ok(())
            }
            other => other,
        };
        settle("remove role", &[organization_id, role_id], true, removed)?;
        info!(%organization_id, %role_id, "role removed");
        Ok(())
    }

    /// Bring the role rows and the organization's role set back into
    /// agreement. Safe to run repeatedly.
    pub async fn reconcile(&self, organization_id: &str) -> SmResult<ReconcileReport> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        let linked: HashSet<String> = self
            .orgs
            .list_roles(organization_id)
            .await?
            .into_iter()
            .collect();
        let rows: HashSet<String> = self
            .roles
            .list(organization_id)
            .await?
            .into_iter()
            .map(|r| r.role_id)
            .collect();

        let mut report = ReconcileReport::default();
        for role_id in rows.difference(&linked) {
            self.roles.remove(organization_id, role_id).await?;
            report.removed_roles.push(role_id.clone());
        }
        for role_id in linked.difference(&rows) {
            self.orgs.delete_role(organization_id, role_id).await?;
            report.dropped_links.push(role_id.clone());
        }
        report.removed_roles.sort();
        report.dropped_links.sort();

        if !report.is_clean() {
            warn!(
                %organization_id,
                removed = ?report.removed_roles,
                dropped = ?report.dropped_links,
                "roles reconciled"
            );
        }
        Ok(report)
    }
}
