use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use sysmodel_entities::{AddClusterRequest, Cluster, IdGenerator, SmResult, UpdateClusterRequest};
use sysmodel_provider::{ClusterProvider, NodeProvider, OrganizationProvider, Providers};

use crate::node::release;
use crate::{require_cluster, require_org, settle};

/// What [`ClusterManager::reconcile`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterReconcileReport {
    /// Cluster rows the organization never linked, now deleted.
    pub removed_clusters: Vec<String>,
    /// Links on the organization whose cluster row was gone, now dropped.
    pub dropped_links: Vec<String>,
    /// Nodes that pointed at a cluster which did not link them back.
    pub released_nodes: Vec<String>,
    /// `{cluster}/{node}` links whose node row was gone or pointed elsewhere.
    pub dropped_node_links: Vec<String>,
}

impl ClusterReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.removed_clusters.is_empty()
            && self.dropped_links.is_empty()
            && self.released_nodes.is_empty()
            && self.dropped_node_links.is_empty()
    }
}

/// Clusters are members of an organization only while the organization's
/// cluster set links them.
#[derive(Clone)]
pub struct ClusterManager {
    orgs: Arc<dyn OrganizationProvider>,
    clusters: Arc<dyn ClusterProvider>,
    nodes: Arc<dyn NodeProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl ClusterManager {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            clusters: providers.clusters.clone(),
            nodes: providers.nodes.clone(),
            ids,
        }
    }

    async fn require_member(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        require_cluster(
            self.orgs.as_ref(),
            self.clusters.as_ref(),
            organization_id,
            cluster_id,
        )
        .await
    }

    /// Clear `cluster_id` on every node row still pointing at it, recording
    /// each node freed. Nodes that vanished or moved meanwhile are skipped.
    async fn release_nodes(
        &self,
        organization_id: &str,
        cluster_id: &str,
        released: &mut Vec<String>,
    ) -> SmResult<()> {
        for node in self.nodes.list(organization_id).await? {
            if node.cluster_id != cluster_id {
                continue;
            }
            match self
                .nodes
                .modify(organization_id, &node.node_id, release(cluster_id.to_string()))
                .await
            {
                Ok(_) => released.push(node.node_id),
                Err(e) if e.is_not_found() || e.kind() == "invalid_argument" => {
                    warn!(%organization_id, %cluster_id, node_id = %node.node_id, %e, "node changed while releasing");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Persist the cluster, then link it on its organization.
    pub async fn add(&self, req: &AddClusterRequest) -> SmResult<Cluster> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let cluster = Cluster::from_request(req, self.ids.next_id())?;
        self.clusters.add(&cluster).await?;
        let linked = self
            .orgs
            .add_cluster(&cluster.organization_id, &cluster.cluster_id)
            .await;
        settle(
            "add cluster",
            &[&cluster.organization_id, &cluster.cluster_id],
            true,
            linked,
        )?;
        info!(
            organization_id = %cluster.organization_id,
            cluster_id = %cluster.cluster_id,
            "cluster added"
        );
        Ok(cluster)
    }

    pub async fn get(&self, organization_id: &str, cluster_id: &str) -> SmResult<Cluster> {
        self.require_member(organization_id, cluster_id).await?;
        self.clusters.get(organization_id, cluster_id).await
    }

    /// Clusters linked on the organization. Unlinked rows are not members.
    pub async fn list(&self, organization_id: &str) -> SmResult<Vec<Cluster>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        let linked: HashSet<String> = self
            .orgs
            .list_clusters(organization_id)
            .await?
            .into_iter()
            .collect();
        let mut clusters = self.clusters.list(organization_id).await?;
        clusters.retain(|c| linked.contains(&c.cluster_id));
        Ok(clusters)
    }

    pub async fn update(&self, req: &UpdateClusterRequest) -> SmResult<Cluster> {
        self.require_member(&req.organization_id, &req.cluster_id)
            .await?;
        let update = req.clone();
        let cluster = self
            .clusters
            .modify(
                &req.organization_id,
                &req.cluster_id,
                Box::new(move |cluster: &mut Cluster| {
                    cluster.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(
            organization_id = %cluster.organization_id,
            cluster_id = %cluster.cluster_id,
            "cluster updated"
        );
        Ok(cluster)
    }

    /// Free every node assigned to the cluster, unlink the cluster from its
    /// organization and drop the row together with its node links.
    pub async fn remove(&self, organization_id: &str, cluster_id: &str) -> SmResult<()> {
        self.require_member(organization_id, cluster_id).await?;

        let mut released = Vec::new();
        let mut unlinked = false;
        let outcome = async {
            self.release_nodes(organization_id, cluster_id, &mut released)
                .await?;
            self.orgs.delete_cluster(organization_id, cluster_id).await?;
            unlinked = true;
            self.clusters.remove(organization_id, cluster_id).await
        }
        .await;
        settle(
            "remove cluster",
            &[organization_id, cluster_id],
            unlinked || !released.is_empty(),
            outcome,
        )?;
        info!(%organization_id, %cluster_id, detached = released.len(), "cluster removed");
        Ok(())
    }

    /// Bring cluster rows, the organization's cluster set, cluster node
    /// links and node assignments back into agreement. Safe to run
    /// repeatedly.
    pub async fn reconcile(&self, organization_id: &str) -> SmResult<ClusterReconcileReport> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        let linked: HashSet<String> = self
            .orgs
            .list_clusters(organization_id)
            .await?
            .into_iter()
            .collect();
        let rows: HashSet<String> = self
            .clusters
            .list(organization_id)
            .await?
            .into_iter()
            .map(|c| c.cluster_id)
            .collect();

        let mut report = ClusterReconcileReport::default();
        for cluster_id in rows.difference(&linked) {
            self.release_nodes(organization_id, cluster_id, &mut report.released_nodes)
                .await?;
            self.clusters.remove(organization_id, cluster_id).await?;
            report.removed_clusters.push(cluster_id.clone());
        }
        for cluster_id in linked.difference(&rows) {
            self.orgs.delete_cluster(organization_id, cluster_id).await?;
            report.dropped_links.push(cluster_id.clone());
        }

        let assigned: HashMap<String, String> = self
            .nodes
            .list(organization_id)
            .await?
            .into_iter()
            .map(|n| (n.node_id, n.cluster_id))
            .collect();
        let mut kept: HashSet<(String, String)> = HashSet::new();
        for cluster_id in linked.intersection(&rows) {
            for node_id in self.clusters.list_nodes(organization_id, cluster_id).await? {
                if assigned.get(&node_id) == Some(cluster_id) {
                    kept.insert((cluster_id.clone(), node_id));
                    continue;
                }
                self.clusters
                    .delete_node(organization_id, cluster_id, &node_id)
                    .await?;
                report
                    .dropped_node_links
                    .push(format!("{cluster_id}/{node_id}"));
            }
        }
        for (node_id, cluster_id) in &assigned {
            if cluster_id.is_empty() || kept.contains(&(cluster_id.clone(), node_id.clone())) {
                continue;
            }
            match self
                .nodes
                .modify(organization_id, node_id, release(cluster_id.clone()))
                .await
            {
                Ok(_) => report.released_nodes.push(node_id.clone()),
                Err(e) if e.is_not_found() || e.kind() == "invalid_argument" => {
                    warn!(%organization_id, %cluster_id, %node_id, %e, "node changed while reconciling");
                }
                Err(e) => return Err(e),
            }
        }
        report.removed_clusters.sort();
        report.dropped_links.sort();
        report.released_nodes.sort();
        report.dropped_node_links.sort();

        if !report.is_clean() {
            warn!(
                %organization_id,
                removed = ?report.removed_clusters,
                dropped = ?report.dropped_links,
                released = ?report.released_nodes,
                unlinked = ?report.dropped_node_links,
                "clusters reconciled"
            );
        }
        Ok(report)
    }
}
