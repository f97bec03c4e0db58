use std::sync::Arc;

use tracing::{info, warn};

use sysmodel_entities::{
    AddNodeRequest, AttachNodeRequest, EntityKind, IdGenerator, Node, NodeState,
    RemoveNodesRequest, SmResult, SystemModelError, UpdateNodeRequest,
};
use sysmodel_provider::{ClusterProvider, Mutation, NodeProvider, OrganizationProvider, Providers};

use crate::{require_cluster, require_org, settle};

/// Clear the node's cluster, provided it still points at `cluster_id`.
pub(crate) fn release(cluster_id: String) -> Mutation<Node> {
    Box::new(move |node: &mut Node| {
        if node.cluster_id != cluster_id {
            return Err(SystemModelError::invalid(format!(
                "node {} is no longer attached to cluster {cluster_id}",
                node.node_id
            )));
        }
        node.cluster_id.clear();
        node.state = NodeState::Unassigned;
        Ok(())
    })
}

#[derive(Clone)]
pub struct NodeManager {
    orgs: Arc<dyn OrganizationProvider>,
    clusters: Arc<dyn ClusterProvider>,
    nodes: Arc<dyn NodeProvider>,
    ids: Arc<dyn IdGenerator>,
}

impl NodeManager {
    pub fn new(providers: &Providers, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            orgs: providers.organizations.clone(),
            clusters: providers.clusters.clone(),
            nodes: providers.nodes.clone(),
            ids,
        }
    }

    /// Register a node that belongs to no cluster yet.
    pub async fn add(&self, req: &AddNodeRequest) -> SmResult<Node> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let node = Node::from_request(req, self.ids.next_id())?;
        self.nodes.add(&node).await?;
        info!(organization_id = %node.organization_id, node_id = %node.node_id, ip = %node.ip, "node added");
        Ok(node)
    }

    pub async fn get(&self, organization_id: &str, node_id: &str) -> SmResult<Node> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.nodes.get(organization_id, node_id).await
    }

    pub async fn list(&self, organization_id: &str) -> SmResult<Vec<Node>> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        self.nodes.list(organization_id).await
    }

    /// Nodes linked on the cluster.
    pub async fn list_cluster_nodes(
        &self,
        organization_id: &str,
        cluster_id: &str,
    ) -> SmResult<Vec<Node>> {
        require_cluster(
            self.orgs.as_ref(),
            self.clusters.as_ref(),
            organization_id,
            cluster_id,
        )
        .await?;
        let mut nodes = Vec::new();
        for node_id in self.clusters.list_nodes(organization_id, cluster_id).await? {
            match self.nodes.get(organization_id, &node_id).await {
                Ok(node) => nodes.push(node),
                Err(e) if e.is_not_found() => {
                    warn!(%organization_id, %cluster_id, %node_id, "linked node has no row");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(nodes)
    }

    pub async fn update(&self, req: &UpdateNodeRequest) -> SmResult<Node> {
        require_org(self.orgs.as_ref(), &req.organization_id).await?;
        let update = req.clone();
        let node = self
            .nodes
            .modify(
                &req.organization_id,
                &req.node_id,
                Box::new(move |node: &mut Node| {
                    node.apply_update(&update);
                    Ok(())
                }),
            )
            .await?;
        info!(organization_id = %node.organization_id, node_id = %node.node_id, "node updated");
        Ok(node)
    }

    /// Assign a free node to a cluster and link it there. The free check and
    /// the assignment are one provider call, so racing attaches of the same
    /// node admit exactly one.
    pub async fn attach(&self, req: &AttachNodeRequest) -> SmResult<Node> {
        let org = &req.organization_id;
        require_cluster(self.orgs.as_ref(), self.clusters.as_ref(), org, &req.cluster_id).await?;
        let cluster_id = req.cluster_id.clone();
        let node = self
            .nodes
            .modify(
                org,
                &req.node_id,
                Box::new(move |node: &mut Node| {
                    if node.is_attached() {
                        return Err(SystemModelError::already_exists(
                            EntityKind::Node,
                            &[&node.organization_id, &node.cluster_id, &node.node_id],
                        ));
                    }
                    node.cluster_id = cluster_id;
                    node.state = NodeState::Assigned;
                    Ok(())
                }),
            )
            .await?;
        let linked = self
            .clusters
            .add_node(org, &req.cluster_id, &req.node_id)
            .await;
        settle(
            "attach node",
            &[org, &req.cluster_id, &req.node_id],
            true,
            linked,
        )?;
        info!(organization_id = %org, cluster_id = %req.cluster_id, node_id = %req.node_id, "node attached");
        Ok(node)
    }

    /// Unlink the node from its cluster and mark it unassigned. A node whose
    /// link was never written is released all the same.
    pub async fn detach(&self, organization_id: &str, node_id: &str) -> SmResult<Node> {
        require_org(self.orgs.as_ref(), organization_id).await?;
        let node = self.nodes.get(organization_id, node_id).await?;
        if !node.is_attached() {
            return Err(SystemModelError::invalid(format!(
                "node {node_id} is not attached to a cluster"
            )));
        }
        let cluster_id = node.cluster_id;

        let mut committed = false;
        let outcome = async {
            if self
                .clusters
                .node_exists(organization_id, &cluster_id, node_id)
                .await?
            {
                self.clusters
                    .delete_node(organization_id, &cluster_id, node_id)
                    .await?;
                committed = true;
            } else {
                warn!(%organization_id, %cluster_id, %node_id, "attached node had no cluster link");
            }
            self.nodes
                .modify(organization_id, node_id, release(cluster_id.clone()))
                .await
        }
        .await;
        let node = settle(
            "detach node",
            &[organization_id, &cluster_id, node_id],
            committed,
            outcome,
        )?;
        info!(%organization_id, %cluster_id, %node_id, "node detached");
        Ok(node)
    }

    /// Remove a batch of nodes. Every node is looked up before anything is
    /// written; attached nodes are unlinked from their cluster first.
    pub async fn remove_nodes(&self, req: &RemoveNodesRequest) -> SmResult<()> {
        req.validate()?;
        let org = &req.organization_id;
        require_org(self.orgs.as_ref(), org).await?;
        let mut nodes = Vec::with_capacity(req.nodes.len());
        for node_id in &req.nodes {
            nodes.push(self.nodes.get(org, node_id).await?);
        }

        let mut committed = false;
        let outcome = async {
            for node in &nodes {
                if node.is_attached()
                    && self
                        .clusters
                        .node_exists(org, &node.cluster_id, &node.node_id)
                        .await?
                {
                    self.clusters
                        .delete_node(org, &node.cluster_id, &node.node_id)
                        .await?;
                    committed = true;
                }
                self.nodes.remove(org, &node.node_id).await?;
                committed = true;
            }
            Ok::<_, SystemModelError>(())
        }
        .await;
        let keys: Vec<&str> = std::iter::once(org.as_str())
            .chain(req.nodes.iter().map(String::as_str))
            .collect();
        settle("remove nodes", &keys, committed, outcome)?;
        info!(organization_id = %org, count = nodes.len(), "nodes removed");
        Ok(())
    }
}
