//! Behaviour every provider bundle must show, whatever the backend.

use sysmodel_entities::{
    AddAppDescriptorRequest, AddAppInstanceRequest, AddAssetRequest, AddClusterRequest,
    AddDeviceGroupRequest, AddDeviceRequest, AddEdgeControllerRequest, AddNodeRequest,
    AddOrganizationRequest, AddRoleRequest, AddUserRequest, AppDescriptor, AppEndpoint,
    AppInstance, AppZtNetwork, Asset, Cluster, Device, DeviceGroup, EdgeController,
    EndpointInstance, Node, Organization, ParametrizedDescriptor, Role, SequentialIds,
    ServiceGroupRequest, ServiceRequest, SystemModelError, User,
};
use sysmodel_provider::Providers;

pub fn org(id: &str) -> Organization {
    let req = AddOrganizationRequest {
        name: format!("{id} inc"),
        ..Default::default()
    };
    Organization::from_request(&req, id.to_string(), 1).unwrap()
}

pub fn cluster(org: &str, id: &str) -> Cluster {
    let req = AddClusterRequest {
        organization_id: org.to_string(),
        name: format!("cluster {id}"),
        hostname: "k8s.local".to_string(),
        ..Default::default()
    };
    Cluster::from_request(&req, id.to_string()).unwrap()
}

pub fn node(org: &str, id: &str) -> Node {
    let req = AddNodeRequest {
        organization_id: org.to_string(),
        ip: "10.0.0.1".to_string(),
        ..Default::default()
    };
    Node::from_request(&req, id.to_string()).unwrap()
}

pub fn role(org: &str, id: &str) -> Role {
    let req = AddRoleRequest {
        organization_id: org.to_string(),
        name: format!("role {id}"),
        ..Default::default()
    };
    Role::from_request(&req, id.to_string(), 1).unwrap()
}

pub fn user(org: &str, email: &str) -> User {
    let req = AddUserRequest {
        organization_id: org.to_string(),
        email: email.to_string(),
        name: "Ada".to_string(),
        ..Default::default()
    };
    User::from_request(&req, 1)
}

pub fn group(org: &str, id: &str, name: &str) -> DeviceGroup {
    let req = AddDeviceGroupRequest {
        organization_id: org.to_string(),
        name: name.to_string(),
        enabled: true,
        default_device_connectivity: true,
        ..Default::default()
    };
    DeviceGroup::from_request(&req, id.to_string(), format!("key-{id}"), 1).unwrap()
}

pub fn device(group: &DeviceGroup, id: &str) -> Device {
    let req = AddDeviceRequest {
        organization_id: group.organization_id.clone(),
        device_group_id: group.device_group_id.clone(),
        device_id: id.to_string(),
        ..Default::default()
    };
    Device::from_request(&req, group, 1)
}

pub fn descriptor(org: &str, id: &str) -> AppDescriptor {
    let req = AddAppDescriptorRequest {
        organization_id: org.to_string(),
        name: "shop".to_string(),
        groups: vec![ServiceGroupRequest {
            name: "web".to_string(),
            services: vec![ServiceRequest {
                name: "frontend".to_string(),
                image: "nginx:1".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    };
    AppDescriptor::from_request(&req, id.to_string(), &SequentialIds::new(id)).unwrap()
}

pub fn instance(desc: &AppDescriptor, id: &str) -> AppInstance {
    let req = AddAppInstanceRequest {
        organization_id: desc.organization_id.clone(),
        app_descriptor_id: desc.app_descriptor_id.clone(),
        name: format!("shop {id}"),
        ..Default::default()
    };
    AppInstance::from_descriptor(&req, desc, id.to_string(), &SequentialIds::new(id)).unwrap()
}

pub fn controller(org: &str, id: &str) -> EdgeController {
    let req = AddEdgeControllerRequest {
        organization_id: org.to_string(),
        name: format!("gateway {id}"),
        ..Default::default()
    };
    EdgeController::from_request(&req, id.to_string(), 1).unwrap()
}

pub fn asset(org: &str, ec: &str, id: &str) -> Asset {
    let req = AddAssetRequest {
        organization_id: org.to_string(),
        edge_controller_id: ec.to_string(),
        agent_id: format!("agent-{id}"),
        ..Default::default()
    };
    Asset::from_request(&req, id.to_string(), 1).unwrap()
}

pub fn endpoint(inst: &AppInstance, id: &str, fqdn: &str) -> AppEndpoint {
    let group = &inst.groups[0];
    AppEndpoint {
        organization_id: inst.organization_id.clone(),
        app_instance_id: inst.app_instance_id.clone(),
        service_group_instance_id: group.service_group_instance_id.clone(),
        service_instance_id: group.service_instances[0].service_instance_id.clone(),
        port: 443,
        protocol: "https".to_string(),
        endpoint_instance: EndpointInstance {
            endpoint_instance_id: id.to_string(),
            fqdn: fqdn.to_string(),
            port: 443,
            ..Default::default()
        },
    }
}

pub fn network(inst: &AppInstance, id: &str) -> AppZtNetwork {
    AppZtNetwork {
        organization_id: inst.organization_id.clone(),
        app_instance_id: inst.app_instance_id.clone(),
        network_id: id.to_string(),
    }
}

pub async fn organization_lifecycle(p: &Providers) {
    let o = org("org-1");
    p.organizations.add(&o).await.unwrap();
    assert_eq!(p.organizations.get("org-1").await.unwrap(), o);

    let mut dup = o.clone();
    dup.name = "other".to_string();
    assert!(p.organizations.add(&dup).await.unwrap_err().is_already_exists());
    assert_eq!(p.organizations.get("org-1").await.unwrap().name, o.name);

    let mut renamed = o.clone();
    renamed.name = "renamed".to_string();
    p.organizations.update(&renamed).await.unwrap();
    assert_eq!(p.organizations.get("org-1").await.unwrap().name, "renamed");
    assert!(p.organizations.update(&org("ghost")).await.unwrap_err().is_not_found());

    p.organizations.remove("org-1").await.unwrap();
    assert!(!p.organizations.exists("org-1").await.unwrap());
    assert!(p.organizations.get("org-1").await.unwrap_err().is_not_found());
    assert!(p.organizations.remove("org-1").await.unwrap_err().is_not_found());
}

pub async fn organization_links(p: &Providers) {
    assert!(
        p.organizations
            .add_cluster("missing", "c-1")
            .await
            .unwrap_err()
            .is_not_found()
    );

    p.organizations.add(&org("org-1")).await.unwrap();
    p.organizations.add_cluster("org-1", "c-1").await.unwrap();
    p.organizations.add_cluster("org-1", "c-2").await.unwrap();
    p.organizations.add_role("org-1", "r-1").await.unwrap();
    assert!(
        p.organizations
            .add_role("org-1", "r-1")
            .await
            .unwrap_err()
            .is_already_exists()
    );

    let mut clusters = p.organizations.list_clusters("org-1").await.unwrap();
    clusters.sort();
    assert_eq!(clusters, vec!["c-1", "c-2"]);
    assert!(p.organizations.cluster_exists("org-1", "c-2").await.unwrap());
    assert_eq!(p.organizations.list_roles("org-1").await.unwrap(), vec!["r-1"]);

    p.organizations.delete_cluster("org-1", "c-1").await.unwrap();
    assert!(!p.organizations.cluster_exists("org-1", "c-1").await.unwrap());
    assert!(
        p.organizations
            .delete_cluster("org-1", "c-1")
            .await
            .unwrap_err()
            .is_not_found()
    );

    // Removing the organization forgets its link sets.
    p.organizations.remove("org-1").await.unwrap();
    p.organizations.add(&org("org-1")).await.unwrap();
    assert!(p.organizations.list_clusters("org-1").await.unwrap().is_empty());
    assert!(p.organizations.list_roles("org-1").await.unwrap().is_empty());
}

pub async fn cluster_and_node_links(p: &Providers) {
    p.clusters.add(&cluster("org-1", "c-1")).await.unwrap();
    assert!(
        p.clusters
            .add_node("org-1", "missing", "n-1")
            .await
            .unwrap_err()
            .is_not_found()
    );
    p.clusters.add_node("org-1", "c-1", "n-1").await.unwrap();
    assert!(p.clusters.node_exists("org-1", "c-1", "n-1").await.unwrap());
    assert_eq!(p.clusters.list_nodes("org-1", "c-1").await.unwrap(), vec!["n-1"]);

    p.nodes.add(&node("org-1", "n-1")).await.unwrap();
    let mut attached = p.nodes.get("org-1", "n-1").await.unwrap();
    attached.cluster_id = "c-1".to_string();
    p.nodes.update(&attached).await.unwrap();
    assert!(p.nodes.get("org-1", "n-1").await.unwrap().is_attached());

    p.clusters.remove("org-1", "c-1").await.unwrap();
    assert!(!p.clusters.exists("org-1", "c-1").await.unwrap());
    p.clusters.add(&cluster("org-1", "c-1")).await.unwrap();
    assert!(p.clusters.list_nodes("org-1", "c-1").await.unwrap().is_empty());
}

pub async fn tenant_isolation(p: &Providers) {
    p.clusters.add(&cluster("org-a", "c-1")).await.unwrap();
    p.clusters.add(&cluster("org-b", "c-1")).await.unwrap();
    p.clusters.add(&cluster("org-b", "c-2")).await.unwrap();
    p.nodes.add(&node("org-a", "n-1")).await.unwrap();
    p.roles.add(&role("org-b", "r-1")).await.unwrap();
    p.users.add(&user("org-a", "ada@a.io")).await.unwrap();
    p.users.add(&user("org-ab", "bob@ab.io")).await.unwrap();
    p.edge_controllers.add(&controller("org-a", "ec-1")).await.unwrap();
    p.assets.add(&asset("org-b", "", "as-1")).await.unwrap();
    p.applications.add_descriptor(&descriptor("org-a", "d-1")).await.unwrap();
    p.devices.add_device_group(&group("org-b", "g-1", "sensors")).await.unwrap();

    assert_eq!(p.clusters.list("org-a").await.unwrap().len(), 1);
    assert_eq!(p.clusters.list("org-b").await.unwrap().len(), 2);
    assert!(p.nodes.list("org-b").await.unwrap().is_empty());
    assert!(p.roles.list("org-a").await.unwrap().is_empty());
    // "org-a" must not match keys under "org-ab".
    let users = p.users.list("org-a").await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "ada@a.io");
    assert!(p.edge_controllers.list("org-b").await.unwrap().is_empty());
    assert!(p.assets.list("org-a").await.unwrap().is_empty());
    assert!(p.applications.list_descriptors("org-b").await.unwrap().is_empty());
    assert!(p.devices.list_device_groups("org-a").await.unwrap().is_empty());
    assert!(!p.clusters.exists("org-a", "c-2").await.unwrap());
    assert!(p.roles.get("org-a", "r-1").await.unwrap_err().is_not_found());
}

pub async fn device_group_cascade(p: &Providers) {
    let g1 = group("org-1", "g-1", "sensors");
    let g2 = group("org-1", "g-2", "cameras");
    p.devices.add_device_group(&g1).await.unwrap();
    p.devices.add_device_group(&g2).await.unwrap();
    assert!(p.devices.device_group_exists_by_name("org-1", "sensors").await.unwrap());
    assert!(!p.devices.device_group_exists_by_name("org-2", "sensors").await.unwrap());

    p.devices.add_device(&device(&g1, "d-1")).await.unwrap();
    p.devices.add_device(&device(&g1, "d-2")).await.unwrap();
    p.devices.add_device(&device(&g2, "d-1")).await.unwrap();
    assert!(
        p.devices
            .add_device(&device(&g1, "d-1"))
            .await
            .unwrap_err()
            .is_already_exists()
    );
    assert_eq!(p.devices.list_devices("org-1", "g-1").await.unwrap().len(), 2);

    let mut disabled = p.devices.get_device("org-1", "g-1", "d-2").await.unwrap();
    disabled.enabled = false;
    p.devices.update_device(&disabled).await.unwrap();
    assert!(!p.devices.get_device("org-1", "g-1", "d-2").await.unwrap().enabled);

    p.devices.remove_device_group("org-1", "g-1").await.unwrap();
    assert!(!p.devices.device_group_exists("org-1", "g-1").await.unwrap());
    assert!(!p.devices.device_exists("org-1", "g-1", "d-1").await.unwrap());
    assert!(p.devices.list_devices("org-1", "g-1").await.unwrap().is_empty());
    assert!(p.devices.device_exists("org-1", "g-2", "d-1").await.unwrap());

    p.devices.remove_device("org-1", "g-2", "d-1").await.unwrap();
    assert!(
        p.devices
            .remove_device("org-1", "g-2", "d-1")
            .await
            .unwrap_err()
            .is_not_found()
    );
}

pub async fn applications(p: &Providers) {
    let desc = descriptor("org-1", "d-1");
    p.applications.add_descriptor(&desc).await.unwrap();
    assert_eq!(p.applications.get_descriptor("org-1", "d-1").await.unwrap(), desc);

    let other = descriptor("org-1", "d-2");
    p.applications.add_descriptor(&other).await.unwrap();
    p.applications.add_instance(&instance(&desc, "i-1")).await.unwrap();
    p.applications.add_instance(&instance(&desc, "i-2")).await.unwrap();
    p.applications.add_instance(&instance(&other, "i-3")).await.unwrap();

    assert_eq!(p.applications.list_instances("org-1").await.unwrap().len(), 3);
    let from_d1 = p
        .applications
        .list_descriptor_instances("org-1", "d-1")
        .await
        .unwrap();
    assert_eq!(from_d1.len(), 2);
    assert!(from_d1.iter().all(|i| i.app_descriptor_id == "d-1"));

    p.applications.remove_instance("org-1", "i-1").await.unwrap();
    assert!(!p.applications.instance_exists("org-1", "i-1").await.unwrap());
    assert!(
        p.applications
            .get_instance("org-1", "i-1")
            .await
            .unwrap_err()
            .is_not_found()
    );
    p.applications.remove_descriptor("org-1", "d-2").await.unwrap();
    assert_eq!(p.applications.list_descriptors("org-1").await.unwrap().len(), 1);
}

pub async fn edge_assets(p: &Providers) {
    p.edge_controllers.add(&controller("org-1", "ec-1")).await.unwrap();
    p.assets.add(&asset("org-1", "ec-1", "as-1")).await.unwrap();
    p.assets.add(&asset("org-1", "ec-1", "as-2")).await.unwrap();
    p.assets.add(&asset("org-1", "", "as-3")).await.unwrap();

    let managed = p.assets.list_controller_assets("org-1", "ec-1").await.unwrap();
    assert_eq!(managed.len(), 2);
    assert_eq!(p.assets.list("org-1").await.unwrap().len(), 3);

    let mut seen = p.assets.get("org-1", "as-3").await.unwrap();
    seen.last_alive_timestamp = 42;
    p.assets.update(&seen).await.unwrap();
    assert_eq!(p.assets.get("org-1", "as-3").await.unwrap().last_alive_timestamp, 42);

    p.edge_controllers.remove("org-1", "ec-1").await.unwrap();
    assert!(!p.edge_controllers.exists("org-1", "ec-1").await.unwrap());
}

pub async fn clear_empties_every_family(p: &Providers) {
    p.organizations.add(&org("org-1")).await.unwrap();
    p.organizations.add_role("org-1", "r-1").await.unwrap();
    p.roles.add(&role("org-1", "r-1")).await.unwrap();
    p.users.add(&user("org-1", "ada@a.io")).await.unwrap();
    p.devices.add_device_group(&group("org-1", "g-1", "sensors")).await.unwrap();

    p.clear_all().await.unwrap();

    assert!(p.organizations.list().await.unwrap().is_empty());
    assert!(p.roles.list("org-1").await.unwrap().is_empty());
    assert!(p.users.list("org-1").await.unwrap().is_empty());
    assert!(p.devices.list_device_groups("org-1").await.unwrap().is_empty());
    // The organization can be registered again after a clear.
    p.organizations.add(&org("org-1")).await.unwrap();
    assert!(p.organizations.list_roles("org-1").await.unwrap().is_empty());
}

pub async fn duplicate_adds_keep_first_row(p: &Providers) {
    let c = cluster("org-1", "c-1");
    p.clusters.add(&c).await.unwrap();
    let mut other = c.clone();
    other.name = "other".to_string();
    assert!(p.clusters.add(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.clusters.get("org-1", "c-1").await.unwrap(), c);

    let n = node("org-1", "n-1");
    p.nodes.add(&n).await.unwrap();
    let mut other = n.clone();
    other.ip = "10.9.9.9".to_string();
    assert!(p.nodes.add(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.nodes.get("org-1", "n-1").await.unwrap(), n);

    let r = role("org-1", "r-1");
    p.roles.add(&r).await.unwrap();
    let mut other = r.clone();
    other.name = "other".to_string();
    assert!(p.roles.add(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.roles.get("org-1", "r-1").await.unwrap(), r);

    let u = user("org-1", "ada@a.io");
    p.users.add(&u).await.unwrap();
    let mut other = u.clone();
    other.name = "Grace".to_string();
    assert!(p.users.add(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.users.get("org-1", "ada@a.io").await.unwrap(), u);

    let g = group("org-1", "g-1", "sensors");
    p.devices.add_device_group(&g).await.unwrap();
    let renamed = group("org-1", "g-1", "cameras");
    assert!(p.devices.add_device_group(&renamed).await.unwrap_err().is_already_exists());
    assert_eq!(p.devices.get_device_group("org-1", "g-1").await.unwrap(), g);

    let d = device(&g, "d-1");
    p.devices.add_device(&d).await.unwrap();
    let mut other = d.clone();
    other.enabled = !d.enabled;
    assert!(p.devices.add_device(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.devices.get_device("org-1", "g-1", "d-1").await.unwrap(), d);

    let desc = descriptor("org-1", "d-1");
    p.applications.add_descriptor(&desc).await.unwrap();
    let mut other = desc.clone();
    other.name = "other".to_string();
    assert!(p.applications.add_descriptor(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.applications.get_descriptor("org-1", "d-1").await.unwrap(), desc);

    let inst = instance(&desc, "i-1");
    p.applications.add_instance(&inst).await.unwrap();
    let mut other = inst.clone();
    other.name = "other".to_string();
    assert!(p.applications.add_instance(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.applications.get_instance("org-1", "i-1").await.unwrap(), inst);

    let ec = controller("org-1", "ec-1");
    p.edge_controllers.add(&ec).await.unwrap();
    let mut other = ec.clone();
    other.name = "other".to_string();
    assert!(p.edge_controllers.add(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.edge_controllers.get("org-1", "ec-1").await.unwrap(), ec);

    let a = asset("org-1", "ec-1", "as-1");
    p.assets.add(&a).await.unwrap();
    let mut other = a.clone();
    other.edge_controller_id = String::new();
    assert!(p.assets.add(&other).await.unwrap_err().is_already_exists());
    assert_eq!(p.assets.get("org-1", "as-1").await.unwrap(), a);

    let ep = endpoint(&inst, "ep-1", "shop.example.io");
    p.applications.add_app_endpoint(&ep).await.unwrap();
    let mut other = ep.clone();
    other.endpoint_instance.fqdn = "elsewhere.example.io".to_string();
    assert!(p.applications.add_app_endpoint(&other).await.unwrap_err().is_already_exists());
    assert!(
        p.applications
            .get_app_endpoints("org-1", "elsewhere.example.io")
            .await
            .unwrap()
            .is_empty()
    );

    let pd = ParametrizedDescriptor {
        app_instance_id: "i-1".to_string(),
        descriptor: desc.clone(),
    };
    p.applications.add_parametrized_descriptor(&pd).await.unwrap();
    let mut other = pd.clone();
    other.descriptor.name = "other".to_string();
    assert!(
        p.applications
            .add_parametrized_descriptor(&other)
            .await
            .unwrap_err()
            .is_already_exists()
    );
    assert_eq!(p.applications.get_parametrized_descriptor("org-1", "i-1").await.unwrap(), pd);

    let zt = network(&inst, "zt-1");
    p.applications.add_zt_network(&zt).await.unwrap();
    assert!(
        p.applications
            .add_zt_network(&network(&inst, "zt-2"))
            .await
            .unwrap_err()
            .is_already_exists()
    );
    assert_eq!(p.applications.get_zt_network("org-1", "i-1").await.unwrap(), zt);
}

pub async fn device_group_names_are_unique_per_organization(p: &Providers) {
    p.devices.add_device_group(&group("org-1", "g-1", "sensors")).await.unwrap();
    let err = p
        .devices
        .add_device_group(&group("org-1", "g-2", "sensors"))
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
    assert!(!p.devices.device_group_exists("org-1", "g-2").await.unwrap());
    // Another organization may reuse the name.
    p.devices.add_device_group(&group("org-2", "g-2", "sensors")).await.unwrap();
}

/// Many callers racing to create the same group name: one wins.
pub async fn concurrent_group_names_admit_one(p: &Providers) {
    let mut handles = Vec::new();
    for i in 0..16 {
        let devices = p.devices.clone();
        handles.push(tokio::spawn(async move {
            devices
                .add_device_group(&group("org-1", &format!("g-{i}"), "sensors"))
                .await
        }));
    }
    let mut admitted = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(()) => admitted += 1,
            Err(e) => assert!(e.is_already_exists()),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(p.devices.list_device_groups("org-1").await.unwrap().len(), 1);
}

pub async fn modify_writes_back_only_on_success(p: &Providers) {
    p.nodes.add(&node("org-1", "n-1")).await.unwrap();
    let written = p
        .nodes
        .modify(
            "org-1",
            "n-1",
            Box::new(|n: &mut Node| {
                n.ip = "10.0.0.2".to_string();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert_eq!(written.ip, "10.0.0.2");
    let err = p
        .nodes
        .modify(
            "org-1",
            "n-1",
            Box::new(|n: &mut Node| {
                n.ip = "10.0.0.3".to_string();
                Err(SystemModelError::invalid("refused"))
            }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_argument");
    assert_eq!(p.nodes.get("org-1", "n-1").await.unwrap().ip, "10.0.0.2");
    assert!(
        p.nodes
            .modify("org-1", "ghost", Box::new(|_: &mut Node| Ok(())))
            .await
            .unwrap_err()
            .is_not_found()
    );

    let desc = descriptor("org-1", "d-1");
    p.applications.add_instance(&instance(&desc, "i-1")).await.unwrap();
    p.applications
        .modify_instance(
            "org-1",
            "i-1",
            Box::new(|i: &mut AppInstance| {
                i.name = "renamed".to_string();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert_eq!(p.applications.get_instance("org-1", "i-1").await.unwrap().name, "renamed");
}

pub async fn every_family_modifies_in_place(p: &Providers) {
    p.organizations.add(&org("org-1")).await.unwrap();
    let o = p
        .organizations
        .modify(
            "org-1",
            Box::new(|o: &mut Organization| {
                o.city = "Lisbon".to_string();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert_eq!(o.city, "Lisbon");

    p.clusters.add(&cluster("org-1", "c-1")).await.unwrap();
    p.clusters
        .modify(
            "org-1",
            "c-1",
            Box::new(|c: &mut Cluster| {
                c.hostname = "edge.local".to_string();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert_eq!(p.clusters.get("org-1", "c-1").await.unwrap().hostname, "edge.local");

    p.roles.add(&role("org-1", "r-1")).await.unwrap();
    p.roles
        .modify(
            "org-1",
            "r-1",
            Box::new(|r: &mut Role| {
                r.description = "ops".to_string();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert_eq!(p.roles.get("org-1", "r-1").await.unwrap().description, "ops");

    p.users.add(&user("org-1", "ada@example.com")).await.unwrap();
    let err = p
        .users
        .modify(
            "org-1",
            "ada@example.com",
            Box::new(|u: &mut User| {
                u.name = "Grace".to_string();
                Err(SystemModelError::invalid("refused"))
            }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_argument");
    assert_eq!(p.users.get("org-1", "ada@example.com").await.unwrap().name, "Ada");

    let g = group("org-1", "g-1", "sensors");
    p.devices.add_device_group(&g).await.unwrap();
    p.devices.add_device(&device(&g, "d-1")).await.unwrap();
    p.devices
        .modify_device_group(
            "org-1",
            "g-1",
            Box::new(|g: &mut DeviceGroup| {
                g.enabled = false;
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert!(!p.devices.get_device_group("org-1", "g-1").await.unwrap().enabled);
    p.devices
        .modify_device(
            "org-1",
            "g-1",
            "d-1",
            Box::new(|d: &mut Device| {
                d.enabled = false;
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert!(!p.devices.get_device("org-1", "g-1", "d-1").await.unwrap().enabled);
    assert!(
        p.devices
            .modify_device("org-1", "g-1", "d-2", Box::new(|_: &mut Device| Ok(())))
            .await
            .unwrap_err()
            .is_not_found()
    );

    p.applications
        .add_descriptor(&descriptor("org-1", "d-1"))
        .await
        .unwrap();
    p.applications
        .modify_descriptor(
            "org-1",
            "d-1",
            Box::new(|d: &mut AppDescriptor| {
                d.name = "store".to_string();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert_eq!(
        p.applications.get_descriptor("org-1", "d-1").await.unwrap().name,
        "store"
    );

    p.edge_controllers.add(&controller("org-1", "ec-1")).await.unwrap();
    p.edge_controllers
        .modify(
            "org-1",
            "ec-1",
            Box::new(|c: &mut EdgeController| {
                c.location = "roof".to_string();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert_eq!(p.edge_controllers.get("org-1", "ec-1").await.unwrap().location, "roof");

    p.assets.add(&asset("org-1", "ec-1", "a-1")).await.unwrap();
    p.assets
        .modify(
            "org-1",
            "a-1",
            Box::new(|a: &mut Asset| {
                a.edge_controller_id.clear();
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert!(
        p.assets
            .list_controller_assets("org-1", "ec-1")
            .await
            .unwrap()
            .is_empty()
    );
}

pub async fn instance_children_go_with_the_instance(p: &Providers) {
    let desc = descriptor("org-1", "d-1");
    let keep = instance(&desc, "i-1");
    let gone = instance(&desc, "i-2");
    p.applications.add_instance(&keep).await.unwrap();
    p.applications.add_instance(&gone).await.unwrap();

    p.applications
        .add_app_endpoint(&endpoint(&keep, "ep-1", "shop.example.io"))
        .await
        .unwrap();
    p.applications
        .add_app_endpoint(&endpoint(&gone, "ep-2", "shop.example.io"))
        .await
        .unwrap();
    p.applications
        .add_app_endpoint(&endpoint(&gone, "ep-3", "admin.example.io"))
        .await
        .unwrap();
    let shop = p
        .applications
        .get_app_endpoints("org-1", "shop.example.io")
        .await
        .unwrap();
    assert_eq!(shop.len(), 2);
    assert!(
        p.applications
            .get_app_endpoints("org-2", "shop.example.io")
            .await
            .unwrap()
            .is_empty()
    );

    for inst in [&keep, &gone] {
        p.applications
            .add_parametrized_descriptor(&ParametrizedDescriptor {
                app_instance_id: inst.app_instance_id.clone(),
                descriptor: desc.clone(),
            })
            .await
            .unwrap();
        p.applications.add_zt_network(&network(inst, "zt")).await.unwrap();
    }

    p.applications.remove_instance("org-1", "i-2").await.unwrap();
    let shop = p
        .applications
        .get_app_endpoints("org-1", "shop.example.io")
        .await
        .unwrap();
    assert_eq!(shop.len(), 1);
    assert_eq!(shop[0].app_instance_id, "i-1");
    assert!(
        p.applications
            .get_app_endpoints("org-1", "admin.example.io")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        p.applications
            .get_parametrized_descriptor("org-1", "i-2")
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(p.applications.get_zt_network("org-1", "i-2").await.unwrap_err().is_not_found());
    p.applications.get_zt_network("org-1", "i-1").await.unwrap();

    assert_eq!(p.applications.remove_app_endpoints("org-1", "i-1").await.unwrap(), 1);
    assert_eq!(p.applications.remove_app_endpoints("org-1", "i-1").await.unwrap(), 0);
    p.applications.remove_zt_network("org-1", "i-1").await.unwrap();
    assert!(
        p.applications
            .remove_zt_network("org-1", "i-1")
            .await
            .unwrap_err()
            .is_not_found()
    );
    p.applications
        .remove_parametrized_descriptor("org-1", "i-1")
        .await
        .unwrap();
}
