use std::sync::Arc;

use tracing::info;

use sysmodel_entities::{AddUserRequest, SmResult, UpdateUserRequest, User, epoch_secs};
use sysmodel_provider::{OrganizationProvider, Providers, UserProvider};

use crate::require_org;

#[derive(Clone)]
pub struct UserManager {
    orgs: Arc<dyn OrganizationProvider>,
    users: Arc<dyn UserProvider>,
}

impl UserManager {
    pub fn new(providers: &Providers) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            users: providers.users.clone(),
        }
    }

    /// Users are keyed by email; a second add with the same email fails.
    pub async fn add(&self, req: &AddUserRequest) -> SmResult<User> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let user = User::from_request(req, epoch_secs());
        self.users.add(&user).await?;
        info!(organization_id = %user.organization_id, email = %user.email, "user added");
        Ok(user)
    }

    pub async fn get(&self, organization_id: &str, email: &str) -> SmResult<User> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.users.get(organization_id, email).await
    }

    pub async fn list(&self, organization_id: &str) -> SmResult<Vec<User>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.users.list(organization_id).await
    }

    pub async fn update(&self, req: &UpdateUserRequest) -> SmResult<User> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let user = self
            .users
            .modify(
                &req.organization_id,
                &req.email,
                Box::new(move |user: &mut User| {
                    user.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(organization_id = %user.organization_id, email = %user.email, "user updated");
        Ok(user)
    }

    pub async fn remove(&self, organization_id: &str, email: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.users.remove(organization_id, email).await?;
        info!(%organization_id, %email, "user removed");
        Ok(())
    }
}
