mod common;

use sysmodel_provider::{Providers, RedbStore};

fn providers() -> Providers {
    Providers::redb(RedbStore::open_in_memory().unwrap())
}

#[tokio::test]
async fn organization_lifecycle() {
    common::organization_lifecycle(&providers()).await;
}

#[tokio::test]
async fn organization_links() {
    common::organization_links(&providers()).await;
}

#[tokio::test]
async fn cluster_and_node_links() {
    common::cluster_and_node_links(&providers()).await;
}

#[tokio::test]
async fn tenant_isolation() {
    common::tenant_isolation(&providers()).await;
}

#[tokio::test]
async fn device_group_cascade() {
    common::device_group_cascade(&providers()).await;
}

#[tokio::test]
async fn applications() {
    common::applications(&providers()).await;
}

#[tokio::test]
async fn edge_assets() {
    common::edge_assets(&providers()).await;
}

#[tokio::test]
async fn clear_empties_every_family() {
    common::clear_empties_every_family(&providers()).await;
}

#[tokio::test]
async fn duplicate_adds_keep_first_row() {
    common::duplicate_adds_keep_first_row(&providers()).await;
}

#[tokio::test]
async fn device_group_names_are_unique_per_organization() {
    common::device_group_names_are_unique_per_organization(&providers()).await;
}

#[tokio::test]
async fn modify_writes_back_only_on_success() {
    common::modify_writes_back_only_on_success(&providers()).await;
}

#[tokio::test]
async fn every_family_modifies_in_place() {
    common::every_family_modifies_in_place(&providers()).await;
}

#[tokio::test]
async fn instance_children_go_with_the_instance() {
    common::instance_children_go_with_the_instance(&providers()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_group_names_admit_one() {
    common::concurrent_group_names_admit_one(&providers()).await;
}

#[tokio::test]
async fn rows_and_links_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sysmodel.redb");
    {
        let p = Providers::redb(RedbStore::open(&path).unwrap());
        p.organizations.add(&common::org("org-1")).await.unwrap();
        p.organizations.add_cluster("org-1", "c-1").await.unwrap();
        p.clusters.add(&common::cluster("org-1", "c-1")).await.unwrap();
    }
    let p = Providers::redb(RedbStore::open(&path).unwrap());
    assert!(p.organizations.exists("org-1").await.unwrap());
    assert_eq!(p.organizations.list_clusters("org-1").await.unwrap(), vec!["c-1"]);
    assert_eq!(p.clusters.get("org-1", "c-1").await.unwrap().name, "cluster c-1");
}
