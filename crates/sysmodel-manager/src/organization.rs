use std::sync::Arc;

use tracing::info;

use sysmodel_entities::{
    AddOrganizationRequest, IdGenerator, Organization, SmResult, SystemModelError,
    UpdateOrganizationRequest, epoch_secs,
};
use sysmodel_provider::{OrganizationProvider, Providers};

#[derive(Clone)]
pub struct OrganizationManager {
    orgs: Arc<dyn OrganizationProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl OrganizationManager {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            ids,
        }
    }

    pub async fn add(&self, req: &AddOrganizationRequest) -> SmResult<Organization> {
        let org = Organization::from_request(req, self.ids.next_id(), epoch_secs())?;
        self.orgs.add(&org).await?;
        info!(organization_id = %org.organization_id, name = %org.name, "organization added");
        Ok(org)
    }

    pub async fn get(&self, organization_id: &str) -> SmResult<Organization> {
        self.orgs.get(organization_id).await
    }

    pub async fn list(&self) -> SmResult<Vec<Organization>> {
        self.orgs.list().await
    }

    pub async fn update(&self, req: &UpdateOrganizationRequest) -> SmResult<Organization> {
        let update = req.clone();
        let org = self
            .orgs
            .modify(
                &req.organization_id,
                Box::new(move |org: &mut Organization| {
                    org.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(organization_id = %org.organization_id, "organization updated");
        Ok(org)
    }

    /// Tenant teardown is not supported.
    pub async fn remove(&self, organization_id: &str) -> SmResult<()> {
        Err(SystemModelError::Unimplemented(format!(
            "removing organization {organization_id}"
        )))
    }
}
