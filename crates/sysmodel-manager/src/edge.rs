use std::sync::Arc;

use tracing::info;

use sysmodel_entities::{
    AddAssetRequest, AddEdgeControllerRequest, Asset, EdgeController, EntityKind, IdGenerator,
    SmResult, SystemModelError, UpdateAssetRequest, UpdateEdgeControllerRequest, epoch_secs,
};
use sysmodel_provider::{AssetProvider, EdgeControllerProvider, OrganizationProvider, Providers};

use crate::{require_org, settle};

/// Edge controllers and the assets they manage.
#[derive(Clone)]
pub struct EdgeManager {
    orgs: Arc<dyn OrganizationProvider>,
    controllers: Arc<dyn EdgeControllerProvider>,
    assets: Arc<dyn AssetProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl EdgeManager {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            controllers: providers.edge_controllers.clone(),
            assets: providers.assets.clone(),
            ids,
        }
    }

    async fn require_controller(&self, organization_id: &str, controller_id: &str) -> SmResult<()> {
        if self.controllers.exists(organization_id, controller_id).await? {
            Ok(())
        } else {
            Err(SystemModelError::not_found(
                EntityKind::EdgeController,
                &[organization_id, controller_id],
            ))
        }
    }

    pub async fn add_controller(&self, req: &AddEdgeControllerRequest) -> SmResult<EdgeController> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let controller = EdgeController::from_request(req, self.ids.next_id(), epoch_secs())?;
        self.controllers.add(&controller).await?;
        info!(
            organization_id = %controller.organization_id,
            edge_controller_id = %controller.edge_controller_id,
            "edge controller added"
        );
        Ok(controller)
    }

    pub async fn get_controller(
        &self,
        organization_id: &str,
        controller_id: &str,
    ) -> SmResult<EdgeController> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.controllers.get(organization_id, controller_id).await
    }

    pub async fn list_controllers(&self, organization_id: &str) -> SmResult<Vec<EdgeController>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.controllers.list(organization_id).await
    }

    pub async fn update_controller(
        &self,
        req: &UpdateEdgeControllerRequest,
    ) -> SmResult<EdgeController> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let controller = self
            .controllers
            .modify(
                &req.organization_id,
                &req.edge_controller_id,
                Box::new(move |controller: &mut EdgeController| {
                    controller.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(
            organization_id = %controller.organization_id,
            edge_controller_id = %controller.edge_controller_id,
            "edge controller updated"
        );
        Ok(controller)
    }

    /// Release every asset the controller manages, then drop it.
    pub async fn remove_controller(&self, organization_id: &str, controller_id: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.require_controller(organization_id, controller_id)
            .await?;
        let managed = self
            .assets
            .list_controller_assets(organization_id, controller_id)
            .await?;

        let mut committed = false;
        let outcome = async {
            for asset in &managed {
                let released = controller_id.to_string();
                let outcome = self
                    .assets
                    .modify(
                        organization_id,
                        &asset.asset_id,
                        Box::new(move |asset: &mut Asset| {
                            if asset.edge_controller_id == released {
                                asset.edge_controller_id.clear();
                            }
                            Ok(())
                        }),
                    )
                    .await;
                match outcome {
                    Ok(_) => committed = true,
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
            self.controllers.remove(organization_id, controller_id).await
        }
        .await;
        settle(
            "remove edge controller",
            &[organization_id, controller_id],
            committed,
            outcome,
        )?;
        info!(
            %organization_id,
            edge_controller_id = %controller_id,
            released = managed.len(),
            "edge controller removed"
        );
        Ok(())
    }

    /// A referenced controller must exist. An asset may also stand alone.
    pub async fn add_asset(&self, req: &AddAssetRequest) -> SmResult<Asset> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        if !req.edge_controller_id.is_empty() {
            self.require_controller(&req.organization_id, &req.edge_controller_id)
                .await?;
        }
        let asset = Asset::from_request(req, self.ids.next_id(), epoch_secs())?;
        self.assets.add(&asset).await?;
        info!(
            organization_id = %asset.organization_id,
            asset_id = %asset.asset_id,
            edge_controller_id = %asset.edge_controller_id,
            "asset added"
        );
        Ok(asset)
    }

    pub async fn get_asset(&self, organization_id: &str, asset_id: &str) -> SmResult<Asset> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.assets.get(organization_id, asset_id).await
    }

    pub async fn list_assets(&self, organization_id: &str) -> SmResult<Vec<Asset>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.assets.list(organization_id).await
    }

    pub async fn list_controller_assets(
        &self,
        organization_id: &str,
        controller_id: &str,
    ) -> SmResult<Vec<Asset>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.require_controller(organization_id, controller_id)
            .await?;
        self.assets
            .list_controller_assets(organization_id, controller_id)
            .await
    }

    pub async fn update_asset(&self, req: &UpdateAssetRequest) -> SmResult<Asset> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let asset = self
            .assets
            .modify(
                &req.organization_id,
                &req.asset_id,
                Box::new(move |asset: &mut Asset| {
                    asset.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(organization_id = %asset.organization_id, asset_id = %asset.asset_id, "asset updated");
        Ok(asset)
    }

    pub async fn remove_asset(&self, organization_id: &str, asset_id: &str) -> SmResult<()> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.assets.remove(organization_id, asset_id).await?;
        info!(%organization_id, %asset_id, "asset removed");
        Ok(())
    }
}
