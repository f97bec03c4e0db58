//! Application descriptors and the instances deployed from them.
//!
//! A descriptor is a reusable template: service groups, services, the
//! security rules between them and the parameters a deployment may
//! override. Creation requests name services and groups; construction
//! assigns ids and resolves every name inside the same descriptor.
//!
//! An instance is a frozen copy of a descriptor taken at deployment time.
//! It never follows later descriptor changes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, SmResult, SystemModelError};
use crate::ids::IdGenerator;
use crate::labels::{Labels, apply_label_update};
use crate::validate::{reject_supplied, require};

// ── Enumerations ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[default]
    Docker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollocationPolicy {
    #[default]
    SameCluster,
    SeparateClusters,
}

/// Who may reach a port guarded by a [`SecurityRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortAccess {
    #[default]
    AllAppServices,
    AppServices,
    Public,
    DeviceGroup,
}

/// Lifecycle of a deployed application, driven by the deployment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Queued,
    Planning,
    Scheduled,
    Deploying,
    Running,
    Incomplete,
    PlanningError,
    DeploymentError,
    Error,
    Terminating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    #[default]
    Scheduled,
    Waiting,
    Deploying,
    Running,
    Error,
    Terminating,
}

// ── Descriptor parts ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploySpecs {
    #[serde(default)]
    pub cpu: i64,
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub replicas: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub internal_port: i32,
    #[serde(default)]
    pub exposed_port: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub service_group_id: String,
    pub service_id: String,
    pub name: String,
    pub service_type: ServiceType,
    pub image: String,
    #[serde(default)]
    pub specs: DeploySpecs,
    #[serde(default)]
    pub exposed_ports: Vec<Port>,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub labels: Labels,
    /// Ids of services in the same descriptor that must be running first.
    #[serde(default)]
    pub deploy_after: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceGroup {
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub service_group_id: String,
    pub name: String,
    pub policy: CollocationPolicy,
    #[serde(default)]
    pub specs: DeploySpecs,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityRule {
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub rule_id: String,
    pub name: String,
    pub target_service_group_id: String,
    pub target_service_id: String,
    pub target_port: i32,
    pub access: PortAccess,
    #[serde(default)]
    pub auth_service_group_id: String,
    #[serde(default)]
    pub auth_services: Vec<String>,
    #[serde(default)]
    pub device_group_ids: Vec<String>,
}

/// A value deployments may override, addressed by `path` inside the descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppParameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: String,
    #[serde(default)]
    pub default_value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceParameter {
    pub parameter_name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppDescriptor {
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub name: String,
    #[serde(default)]
    pub configuration_options: HashMap<String, String>,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub rules: Vec<SecurityRule>,
    pub groups: Vec<ServiceGroup>,
    #[serde(default)]
    pub parameters: Vec<AppParameter>,
}

// ── Descriptor requests ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceRequest {
    pub name: String,
    #[serde(default)]
    pub service_type: ServiceType,
    pub image: String,
    #[serde(default)]
    pub specs: DeploySpecs,
    #[serde(default)]
    pub exposed_ports: Vec<Port>,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub labels: Labels,
    /// Names of services in the same descriptor.
    #[serde(default)]
    pub deploy_after: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceGroupRequest {
    pub name: String,
    #[serde(default)]
    pub policy: CollocationPolicy,
    #[serde(default)]
    pub specs: DeploySpecs,
    pub services: Vec<ServiceRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityRuleRequest {
    pub name: String,
    pub target_service_group_name: String,
    pub target_service_name: String,
    pub target_port: i32,
    #[serde(default)]
    pub access: PortAccess,
    #[serde(default)]
    pub auth_service_group_name: String,
    /// Names of services inside `auth_service_group_name`.
    #[serde(default)]
    pub auth_services: Vec<String>,
    #[serde(default)]
    pub device_group_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddAppDescriptorRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_descriptor_id: String,
    pub name: String,
    #[serde(default)]
    pub configuration_options: HashMap<String, String>,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub rules: Vec<SecurityRuleRequest>,
    pub groups: Vec<ServiceGroupRequest>,
    #[serde(default)]
    pub parameters: Vec<AppParameter>,
}

impl AddAppDescriptorRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.name, "name")?;
        reject_supplied(&self.app_descriptor_id, "app_descriptor_id")?;
        if self.groups.is_empty() {
            return Err(SystemModelError::invalid("groups must not be empty"));
        }
        for group in &self.groups {
            require(&group.name, "group name")?;
            if group.services.is_empty() {
                return Err(SystemModelError::invalid(format!(
                    "group {} has no services",
                    group.name
                )));
            }
            for service in &group.services {
                require(&service.name, "service name")?;
                require(&service.image, "service image")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateAppDescriptorRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_descriptor_id: String,
    pub name: Option<String>,
    pub add_labels: Option<Labels>,
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateAppDescriptorRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_descriptor_id, "app_descriptor_id")
    }
}

/// Name → id tables built while constructing a descriptor.
#[derive(Default)]
struct NameIndex {
    groups: HashMap<String, String>,
    // service name → (group id, service id)
    services: HashMap<String, (String, String)>,
}

impl NameIndex {
    fn group(&self, name: &str) -> SmResult<&str> {
        self.groups
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| SystemModelError::invalid(format!("unknown service group {name}")))
    }

    fn service_in(&self, group_id: &str, name: &str) -> SmResult<&str> {
        match self.services.get(name) {
            Some((gid, sid)) if gid == group_id => Ok(sid.as_str()),
            _ => Err(SystemModelError::invalid(format!(
                "unknown service {name} in referenced group"
            ))),
        }
    }

    fn service(&self, name: &str) -> SmResult<&str> {
        self.services
            .get(name)
            .map(|(_, sid)| sid.as_str())
            .ok_or_else(|| SystemModelError::invalid(format!("unknown service {name}")))
    }
}

impl AppDescriptor {
    /// Build a descriptor, generating group, service and rule ids from `ids`.
    pub fn from_request(
        req: &AddAppDescriptorRequest,
        app_descriptor_id: String,
        ids: &dyn IdGenerator,
    ) -> SmResult<Self> {
        reject_supplied(&req.app_descriptor_id, "app_descriptor_id")?;
        let org = &req.organization_id;

        let mut index = NameIndex::default();
        for group in &req.groups {
            let group_id = ids.next_id();
            if index.groups.insert(group.name.clone(), group_id.clone()).is_some() {
                return Err(SystemModelError::invalid(format!(
                    "duplicated service group name {}",
                    group.name
                )));
            }
            for service in &group.services {
                let entry = (group_id.clone(), ids.next_id());
                if index.services.insert(service.name.clone(), entry).is_some() {
                    return Err(SystemModelError::invalid(format!(
                        "duplicated service name {}",
                        service.name
                    )));
                }
            }
        }

        let mut groups = Vec::with_capacity(req.groups.len());
        for group in &req.groups {
            let service_group_id = index.group(&group.name)?.to_string();
            let mut services = Vec::with_capacity(group.services.len());
            for service in &group.services {
                let deploy_after = service
                    .deploy_after
                    .iter()
                    .map(|name| index.service(name).map(str::to_string))
                    .collect::<SmResult<Vec<_>>>()?;
                services.push(Service {
                    organization_id: org.clone(),
                    app_descriptor_id: app_descriptor_id.clone(),
                    service_group_id: service_group_id.clone(),
                    service_id: index.service(&service.name)?.to_string(),
                    name: service.name.clone(),
                    service_type: service.service_type,
                    image: service.image.clone(),
                    specs: service.specs.clone(),
                    exposed_ports: service.exposed_ports.clone(),
                    environment_variables: service.environment_variables.clone(),
                    labels: service.labels.clone(),
                    deploy_after,
                });
            }
            groups.push(ServiceGroup {
                organization_id: org.clone(),
                app_descriptor_id: app_descriptor_id.clone(),
                service_group_id,
                name: group.name.clone(),
                policy: group.policy,
                specs: group.specs.clone(),
                services,
            });
        }

        let mut rules = Vec::with_capacity(req.rules.len());
        for rule in &req.rules {
            let target_group = index.group(&rule.target_service_group_name)?;
            let target_service = index.service_in(target_group, &rule.target_service_name)?;
            let (auth_group, auth_services) = if rule.auth_service_group_name.is_empty() {
                if !rule.auth_services.is_empty() {
                    return Err(SystemModelError::invalid(format!(
                        "rule {} names auth services without an auth group",
                        rule.name
                    )));
                }
                (String::new(), Vec::new())
            } else {
                let gid = index.group(&rule.auth_service_group_name)?;
                let services = rule
                    .auth_services
                    .iter()
                    .map(|name| index.service_in(gid, name).map(str::to_string))
                    .collect::<SmResult<Vec<_>>>()?;
                (gid.to_string(), services)
            };
            rules.push(SecurityRule {
                organization_id: org.clone(),
                app_descriptor_id: app_descriptor_id.clone(),
                rule_id: ids.next_id(),
                name: rule.name.clone(),
                target_service_group_id: target_group.to_string(),
                target_service_id: target_service.to_string(),
                target_port: rule.target_port,
                access: rule.access,
                auth_service_group_id: auth_group,
                auth_services,
                device_group_ids: rule.device_group_ids.clone(),
            });
        }

        let mut declared = HashSet::new();
        for p in &req.parameters {
            if !declared.insert(p.name.as_str()) {
                return Err(SystemModelError::invalid(format!(
                    "duplicated parameter {}",
                    p.name
                )));
            }
        }

        Ok(Self {
            organization_id: org.clone(),
            app_descriptor_id,
            name: req.name.clone(),
            configuration_options: req.configuration_options.clone(),
            environment_variables: req.environment_variables.clone(),
            labels: req.labels.clone(),
            rules,
            groups,
            parameters: req.parameters.clone(),
        })
    }

    pub fn apply_update(&mut self, req: &UpdateAppDescriptorRequest) {
        if let Some(name) = &req.name {
            self.name = name.clone();
        }
        apply_label_update(
            &mut self.labels,
            req.add_labels.as_ref(),
            req.remove_labels.as_deref(),
        );
    }

    pub fn group(&self, service_group_id: &str) -> SmResult<&ServiceGroup> {
        self.groups
            .iter()
            .find(|g| g.service_group_id == service_group_id)
            .ok_or_else(|| {
                SystemModelError::not_found(
                    EntityKind::ServiceGroup,
                    &[
                        &self.organization_id,
                        &self.app_descriptor_id,
                        service_group_id,
                    ],
                )
            })
    }

    pub fn service(&self, service_group_id: &str, service_id: &str) -> SmResult<&Service> {
        self.group(service_group_id)?
            .services
            .iter()
            .find(|s| s.service_id == service_id)
            .ok_or_else(|| {
                SystemModelError::not_found(
                    EntityKind::Service,
                    &[
                        &self.organization_id,
                        &self.app_descriptor_id,
                        service_group_id,
                        service_id,
                    ],
                )
            })
    }
}

// ── Instances ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInstance {
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub app_instance_id: String,
    pub service_group_id: String,
    pub service_group_instance_id: String,
    pub service_id: String,
    pub service_instance_id: String,
    pub name: String,
    pub service_type: ServiceType,
    pub image: String,
    #[serde(default)]
    pub specs: DeploySpecs,
    #[serde(default)]
    pub exposed_ports: Vec<Port>,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub deploy_after: Vec<String>,
    pub status: ServiceStatus,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub deployed_on_cluster_id: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceGroupInstance {
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub app_instance_id: String,
    pub service_group_id: String,
    pub service_group_instance_id: String,
    pub name: String,
    pub policy: CollocationPolicy,
    #[serde(default)]
    pub specs: DeploySpecs,
    pub service_instances: Vec<ServiceInstance>,
    #[serde(default)]
    pub metadata: InstanceMetadata,
}

/// Replica bookkeeping for one service group instance, kept by the
/// deployment pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceMetadata {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_descriptor_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    /// Id of the service group instance this entry describes.
    #[serde(default)]
    pub monitored_instance_id: String,
    /// Service instance ids of the group instance.
    #[serde(default)]
    pub instances_id: Vec<String>,
    #[serde(default)]
    pub desired_replicas: i32,
    #[serde(default)]
    pub available_replicas: i32,
    #[serde(default)]
    pub unavailable_replicas: i32,
    #[serde(default)]
    pub status: HashMap<String, ServiceStatus>,
    #[serde(default)]
    pub info: HashMap<String, String>,
}

impl InstanceMetadata {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")?;
        require(&self.monitored_instance_id, "monitored_instance_id")
    }
}

impl ServiceInstance {
    /// A scheduled copy of `service` inside the given group instance.
    pub fn from_service(
        service: &Service,
        app_instance_id: &str,
        service_group_instance_id: &str,
        service_instance_id: String,
    ) -> Self {
        Self {
            organization_id: service.organization_id.clone(),
            app_descriptor_id: service.app_descriptor_id.clone(),
            app_instance_id: app_instance_id.to_string(),
            service_group_id: service.service_group_id.clone(),
            service_group_instance_id: service_group_instance_id.to_string(),
            service_id: service.service_id.clone(),
            service_instance_id,
            name: service.name.clone(),
            service_type: service.service_type,
            image: service.image.clone(),
            specs: service.specs.clone(),
            exposed_ports: service.exposed_ports.clone(),
            environment_variables: service.environment_variables.clone(),
            labels: service.labels.clone(),
            deploy_after: service.deploy_after.clone(),
            status: ServiceStatus::Scheduled,
            endpoints: Vec::new(),
            deployed_on_cluster_id: String::new(),
            info: String::new(),
        }
    }
}

impl ServiceGroupInstance {
    /// Instantiate every service of `group` under a freshly generated group
    /// instance id. Metadata starts with every service scheduled.
    pub fn from_group(group: &ServiceGroup, app_instance_id: &str, ids: &dyn IdGenerator) -> Self {
        let service_group_instance_id = ids.next_id();
        let service_instances: Vec<ServiceInstance> = group
            .services
            .iter()
            .map(|service| {
                ServiceInstance::from_service(
                    service,
                    app_instance_id,
                    &service_group_instance_id,
                    ids.next_id(),
                )
            })
            .collect();
        let metadata = InstanceMetadata {
            organization_id: group.organization_id.clone(),
            app_descriptor_id: group.app_descriptor_id.clone(),
            app_instance_id: app_instance_id.to_string(),
            monitored_instance_id: service_group_instance_id.clone(),
            instances_id: service_instances
                .iter()
                .map(|s| s.service_instance_id.clone())
                .collect(),
            desired_replicas: group.specs.replicas,
            available_replicas: 0,
            unavailable_replicas: 0,
            status: service_instances
                .iter()
                .map(|s| (s.service_instance_id.clone(), s.status))
                .collect(),
            info: HashMap::new(),
        };
        Self {
            organization_id: group.organization_id.clone(),
            app_descriptor_id: group.app_descriptor_id.clone(),
            app_instance_id: app_instance_id.to_string(),
            service_group_id: group.service_group_id.clone(),
            service_group_instance_id,
            name: group.name.clone(),
            policy: group.policy,
            specs: group.specs.clone(),
            service_instances,
            metadata,
        }
    }

    /// Append a service instance and register it in the metadata.
    pub fn push_service(&mut self, service: ServiceInstance) {
        self.metadata
            .instances_id
            .push(service.service_instance_id.clone());
        self.metadata
            .status
            .insert(service.service_instance_id.clone(), service.status);
        self.service_instances.push(service);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppInstance {
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub app_instance_id: String,
    pub name: String,
    #[serde(default)]
    pub configuration_options: HashMap<String, String>,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub rules: Vec<SecurityRule>,
    pub groups: Vec<ServiceGroupInstance>,
    #[serde(default)]
    pub parameters: Vec<InstanceParameter>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddAppInstanceRequest {
    #[serde(default)]
    pub organization_id: String,
    pub app_descriptor_id: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<InstanceParameter>,
}

impl AddAppInstanceRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_descriptor_id, "app_descriptor_id")?;
        require(&self.name, "name")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateAppStatusRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    pub status: ApplicationStatus,
    pub info: Option<String>,
}

impl UpdateAppStatusRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateServiceStatusRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    pub service_group_instance_id: String,
    pub service_instance_id: String,
    pub status: ServiceStatus,
    pub endpoints: Option<Vec<String>>,
    pub deployed_on_cluster_id: Option<String>,
    pub info: Option<String>,
}

impl UpdateServiceStatusRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")?;
        require(&self.service_group_instance_id, "service_group_instance_id")?;
        require(&self.service_instance_id, "service_instance_id")
    }
}

impl AppInstance {
    /// Freeze `descriptor` into a new queued instance.
    ///
    /// Every parameter must be declared by the descriptor.
    pub fn from_descriptor(
        req: &AddAppInstanceRequest,
        descriptor: &AppDescriptor,
        app_instance_id: String,
        ids: &dyn IdGenerator,
    ) -> SmResult<Self> {
        for p in &req.parameters {
            if !descriptor.parameters.iter().any(|d| d.name == p.parameter_name) {
                return Err(SystemModelError::invalid(format!(
                    "parameter {} is not declared by descriptor {}",
                    p.parameter_name, descriptor.app_descriptor_id
                )));
            }
        }

        let groups = descriptor
            .groups
            .iter()
            .map(|group| ServiceGroupInstance::from_group(group, &app_instance_id, ids))
            .collect();

        Ok(Self {
            organization_id: descriptor.organization_id.clone(),
            app_descriptor_id: descriptor.app_descriptor_id.clone(),
            app_instance_id,
            name: req.name.clone(),
            configuration_options: descriptor.configuration_options.clone(),
            environment_variables: descriptor.environment_variables.clone(),
            labels: descriptor.labels.clone(),
            rules: descriptor.rules.clone(),
            groups,
            parameters: req.parameters.clone(),
            status: ApplicationStatus::Queued,
            info: String::new(),
        })
    }

    pub fn apply_status(&mut self, req: &UpdateAppStatusRequest) {
        self.status = req.status;
        if let Some(info) = &req.info {
            self.info = info.clone();
        }
    }

    /// Update one service instance. Fails if the group instance or the
    /// service instance is not part of this application instance.
    pub fn apply_service_status(&mut self, req: &UpdateServiceStatusRequest) -> SmResult<()> {
        let org = self.organization_id.clone();
        let app = self.app_instance_id.clone();
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.service_group_instance_id == req.service_group_instance_id)
            .ok_or_else(|| {
                SystemModelError::not_found(
                    EntityKind::ServiceGroupInstance,
                    &[&org, &app, &req.service_group_instance_id],
                )
            })?;
        let service = group
            .service_instances
            .iter_mut()
            .find(|s| s.service_instance_id == req.service_instance_id)
            .ok_or_else(|| {
                SystemModelError::not_found(
                    EntityKind::ServiceInstance,
                    &[
                        &org,
                        &app,
                        &req.service_group_instance_id,
                        &req.service_instance_id,
                    ],
                )
            })?;
        service.status = req.status;
        if group.metadata.status.contains_key(&req.service_instance_id) {
            group
                .metadata
                .status
                .insert(req.service_instance_id.clone(), req.status);
        }
        if let Some(endpoints) = &req.endpoints {
            service.endpoints = endpoints.clone();
        }
        if let Some(cluster) = &req.deployed_on_cluster_id {
            service.deployed_on_cluster_id = cluster.clone();
        }
        if let Some(info) = &req.info {
            service.info = info.clone();
        }
        Ok(())
    }

    fn group_not_found(&self, service_group_instance_id: &str) -> SystemModelError {
        SystemModelError::not_found(
            EntityKind::ServiceGroupInstance,
            &[
                &self.organization_id,
                &self.app_instance_id,
                service_group_instance_id,
            ],
        )
    }

    pub fn group_instance(&self, service_group_instance_id: &str) -> SmResult<&ServiceGroupInstance> {
        self.groups
            .iter()
            .find(|g| g.service_group_instance_id == service_group_instance_id)
            .ok_or_else(|| self.group_not_found(service_group_instance_id))
    }

    pub fn group_instance_mut(
        &mut self,
        service_group_instance_id: &str,
    ) -> SmResult<&mut ServiceGroupInstance> {
        let err = self.group_not_found(service_group_instance_id);
        self.groups
            .iter_mut()
            .find(|g| g.service_group_instance_id == service_group_instance_id)
            .ok_or(err)
    }

    pub fn service_instance(
        &self,
        service_group_instance_id: &str,
        service_instance_id: &str,
    ) -> SmResult<&ServiceInstance> {
        self.group_instance(service_group_instance_id)?
            .service_instances
            .iter()
            .find(|s| s.service_instance_id == service_instance_id)
            .ok_or_else(|| {
                SystemModelError::not_found(
                    EntityKind::ServiceInstance,
                    &[
                        &self.organization_id,
                        &self.app_instance_id,
                        service_group_instance_id,
                        service_instance_id,
                    ],
                )
            })
    }

    /// Drop the named group instances, or all of them when `ids` is empty.
    /// Nothing changes if one of the ids is unknown.
    pub fn remove_group_instances(&mut self, ids: &[String]) -> SmResult<usize> {
        if ids.is_empty() {
            let removed = self.groups.len();
            self.groups.clear();
            return Ok(removed);
        }
        for id in ids {
            self.group_instance(id)?;
        }
        let before = self.groups.len();
        self.groups
            .retain(|g| !ids.contains(&g.service_group_instance_id));
        Ok(before - self.groups.len())
    }

    /// Replace the metadata of one group instance. The entry keeps pointing
    /// at the group instance it belongs to.
    pub fn set_group_metadata(&mut self, metadata: InstanceMetadata) -> SmResult<()> {
        let group = self.group_instance_mut(&metadata.monitored_instance_id)?;
        let mut metadata = metadata;
        metadata.organization_id = group.organization_id.clone();
        metadata.app_descriptor_id = group.app_descriptor_id.clone();
        metadata.app_instance_id = group.app_instance_id.clone();
        group.metadata = metadata;
        Ok(())
    }
}

// ── Instance lifecycle requests ─────────────────────────────────

/// Instantiate one descriptor group `num_instances` more times inside an
/// existing application instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddServiceGroupInstancesRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    pub service_group_id: String,
    pub num_instances: u32,
}

impl AddServiceGroupInstancesRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")?;
        require(&self.service_group_id, "service_group_id")?;
        if self.num_instances == 0 {
            return Err(SystemModelError::invalid("num_instances must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveServiceGroupInstancesRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    /// Empty removes every group instance.
    #[serde(default)]
    pub service_group_instance_ids: Vec<String>,
}

impl RemoveServiceGroupInstancesRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")?;
        let mut seen = HashSet::new();
        for id in &self.service_group_instance_ids {
            require(id, "service group instance id")?;
            if !seen.insert(id.as_str()) {
                return Err(SystemModelError::invalid(format!(
                    "service group instance {id} is listed more than once"
                )));
            }
        }
        Ok(())
    }
}

/// Add one more instance of a descriptor service to a group instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddServiceInstanceRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    #[serde(default)]
    pub service_group_instance_id: String,
    pub service_id: String,
}

impl AddServiceInstanceRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")?;
        require(&self.service_group_instance_id, "service_group_instance_id")?;
        require(&self.service_id, "service_id")
    }
}

// ── Endpoints, parametrized descriptors, networks ───────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointType {
    #[default]
    IsAlive,
    Rest,
    Web,
    Prometheus,
    Ingestion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointInstance {
    pub endpoint_instance_id: String,
    #[serde(default)]
    pub endpoint_type: EndpointType,
    pub fqdn: String,
    #[serde(default)]
    pub port: i32,
}

/// A reachable endpoint of a running service instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppEndpoint {
    pub organization_id: String,
    pub app_instance_id: String,
    pub service_group_instance_id: String,
    pub service_instance_id: String,
    #[serde(default)]
    pub port: i32,
    #[serde(default)]
    pub protocol: String,
    pub endpoint_instance: EndpointInstance,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddAppEndpointRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    pub service_group_instance_id: String,
    pub service_instance_id: String,
    #[serde(default)]
    pub port: i32,
    #[serde(default)]
    pub protocol: String,
    pub endpoint_instance: EndpointInstance,
}

impl AddAppEndpointRequest {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")?;
        require(&self.service_group_instance_id, "service_group_instance_id")?;
        require(&self.service_instance_id, "service_instance_id")?;
        require(
            &self.endpoint_instance.endpoint_instance_id,
            "endpoint_instance_id",
        )?;
        require(&self.endpoint_instance.fqdn, "fqdn")
    }
}

impl AppEndpoint {
    pub fn from_request(req: &AddAppEndpointRequest) -> Self {
        Self {
            organization_id: req.organization_id.clone(),
            app_instance_id: req.app_instance_id.clone(),
            service_group_instance_id: req.service_group_instance_id.clone(),
            service_instance_id: req.service_instance_id.clone(),
            port: req.port,
            protocol: req.protocol.clone(),
            endpoint_instance: req.endpoint_instance.clone(),
        }
    }
}

/// The descriptor an instance was deployed from, after its parameters were
/// applied. One per instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParametrizedDescriptor {
    pub app_instance_id: String,
    #[serde(flatten)]
    pub descriptor: AppDescriptor,
}

impl ParametrizedDescriptor {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.descriptor.organization_id, "organization_id")?;
        require(&self.descriptor.app_descriptor_id, "app_descriptor_id")?;
        require(&self.app_instance_id, "app_instance_id")
    }

    pub fn organization_id(&self) -> &str {
        &self.descriptor.organization_id
    }
}

/// Overlay network of an application instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppZtNetwork {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub app_instance_id: String,
    pub network_id: String,
}

impl AppZtNetwork {
    pub fn validate(&self) -> SmResult<()> {
        require(&self.organization_id, "organization_id")?;
        require(&self.app_instance_id, "app_instance_id")?;
        require(&self.network_id, "network_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    fn service(name: &str, after: &[&str]) -> ServiceRequest {
        ServiceRequest {
            name: name.to_string(),
            image: format!("registry/{name}:1"),
            deploy_after: after.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn request() -> AddAppDescriptorRequest {
        AddAppDescriptorRequest {
            organization_id: "org-1".to_string(),
            name: "wordpress".to_string(),
            groups: vec![ServiceGroupRequest {
                name: "web".to_string(),
                services: vec![service("db", &[]), service("wp", &["db"])],
                ..Default::default()
            }],
            rules: vec![SecurityRuleRequest {
                name: "db-from-wp".to_string(),
                target_service_group_name: "web".to_string(),
                target_service_name: "db".to_string(),
                target_port: 3306,
                access: PortAccess::AppServices,
                auth_service_group_name: "web".to_string(),
                auth_services: vec!["wp".to_string()],
                ..Default::default()
            }],
            parameters: vec![AppParameter {
                name: "replicas".to_string(),
                path: "groups.0.specs.replicas".to_string(),
                default_value: "1".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn names_resolve_to_generated_ids() {
        let ids = SequentialIds::new("id");
        let desc = AppDescriptor::from_request(&request(), "desc-1".to_string(), &ids).unwrap();
        let group = &desc.groups[0];
        assert_eq!(group.service_group_id, "id-1");
        let db = &group.services[0];
        let wp = &group.services[1];
        assert_eq!(db.service_id, "id-2");
        assert_eq!(wp.deploy_after, vec![db.service_id.clone()]);

        let rule = &desc.rules[0];
        assert_eq!(rule.target_service_group_id, group.service_group_id);
        assert_eq!(rule.target_service_id, db.service_id);
        assert_eq!(rule.auth_services, vec![wp.service_id.clone()]);
    }

    #[test]
    fn unresolved_reference_is_invalid() {
        let ids = SequentialIds::new("id");
        let mut req = request();
        req.groups[0].services[1].deploy_after = vec!["cache".to_string()];
        let err = AppDescriptor::from_request(&req, "desc-1".to_string(), &ids).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");

        let mut req = request();
        req.rules[0].target_service_group_name = "missing".to_string();
        assert!(AppDescriptor::from_request(&req, "desc-1".to_string(), &ids).is_err());
    }

    #[test]
    fn duplicated_service_name_is_invalid() {
        let ids = SequentialIds::new("id");
        let mut req = request();
        req.groups.push(ServiceGroupRequest {
            name: "other".to_string(),
            services: vec![service("db", &[])],
            ..Default::default()
        });
        assert!(AppDescriptor::from_request(&req, "desc-1".to_string(), &ids).is_err());
    }

    #[test]
    fn instance_is_a_queued_copy() {
        let ids = SequentialIds::new("id");
        let desc = AppDescriptor::from_request(&request(), "desc-1".to_string(), &ids).unwrap();
        let req = AddAppInstanceRequest {
            organization_id: "org-1".to_string(),
            app_descriptor_id: "desc-1".to_string(),
            name: "blog".to_string(),
            parameters: vec![InstanceParameter {
                parameter_name: "replicas".to_string(),
                value: "3".to_string(),
            }],
        };
        let inst = AppInstance::from_descriptor(&req, &desc, "inst-1".to_string(), &ids).unwrap();
        assert_eq!(inst.status, ApplicationStatus::Queued);
        assert_eq!(inst.groups.len(), 1);
        let services = &inst.groups[0].service_instances;
        assert!(services.iter().all(|s| s.status == ServiceStatus::Scheduled));
        assert_eq!(services[0].service_id, desc.groups[0].services[0].service_id);
        assert_eq!(inst.rules, desc.rules);
    }

    #[test]
    fn undeclared_instance_parameter_is_invalid() {
        let ids = SequentialIds::new("id");
        let desc = AppDescriptor::from_request(&request(), "desc-1".to_string(), &ids).unwrap();
        let req = AddAppInstanceRequest {
            organization_id: "org-1".to_string(),
            app_descriptor_id: "desc-1".to_string(),
            name: "blog".to_string(),
            parameters: vec![InstanceParameter {
                parameter_name: "nope".to_string(),
                value: "x".to_string(),
            }],
        };
        assert!(AppInstance::from_descriptor(&req, &desc, "inst-1".to_string(), &ids).is_err());
    }

    #[test]
    fn service_status_update_targets_one_service() {
        let ids = SequentialIds::new("id");
        let desc = AppDescriptor::from_request(&request(), "desc-1".to_string(), &ids).unwrap();
        let req = AddAppInstanceRequest {
            organization_id: "org-1".to_string(),
            app_descriptor_id: "desc-1".to_string(),
            name: "blog".to_string(),
            parameters: vec![],
        };
        let mut inst =
            AppInstance::from_descriptor(&req, &desc, "inst-1".to_string(), &ids).unwrap();
        let group_id = inst.groups[0].service_group_instance_id.clone();
        let service_id = inst.groups[0].service_instances[1].service_instance_id.clone();

        inst.apply_service_status(&UpdateServiceStatusRequest {
            service_group_instance_id: group_id.clone(),
            service_instance_id: service_id,
            status: ServiceStatus::Running,
            deployed_on_cluster_id: Some("c-1".to_string()),
            ..Default::default()
        })
        .unwrap();
        let services = &inst.groups[0].service_instances;
        assert_eq!(services[0].status, ServiceStatus::Scheduled);
        assert_eq!(services[1].status, ServiceStatus::Running);
        assert_eq!(services[1].deployed_on_cluster_id, "c-1");

        let err = inst
            .apply_service_status(&UpdateServiceStatusRequest {
                service_group_instance_id: group_id,
                service_instance_id: "ghost".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_not_found());
    }

    fn blog(ids: &SequentialIds) -> (AppDescriptor, AppInstance) {
        let desc = AppDescriptor::from_request(&request(), "desc-1".to_string(), ids).unwrap();
        let req = AddAppInstanceRequest {
            organization_id: "org-1".to_string(),
            app_descriptor_id: "desc-1".to_string(),
            name: "blog".to_string(),
            parameters: vec![],
        };
        let inst = AppInstance::from_descriptor(&req, &desc, "inst-1".to_string(), ids).unwrap();
        (desc, inst)
    }

    #[test]
    fn group_metadata_tracks_its_services() {
        let ids = SequentialIds::new("id");
        let (desc, mut inst) = blog(&ids);
        let group = &inst.groups[0];
        assert_eq!(group.metadata.monitored_instance_id, group.service_group_instance_id);
        assert_eq!(group.metadata.instances_id.len(), 2);
        assert!(group.metadata.status.values().all(|s| *s == ServiceStatus::Scheduled));

        let gid = group.service_group_instance_id.clone();
        let extra = ServiceInstance::from_service(
            desc.service(&desc.groups[0].service_group_id, &desc.groups[0].services[0].service_id)
                .unwrap(),
            "inst-1",
            &gid,
            "svc-extra".to_string(),
        );
        inst.group_instance_mut(&gid).unwrap().push_service(extra);
        inst.apply_service_status(&UpdateServiceStatusRequest {
            service_group_instance_id: gid.clone(),
            service_instance_id: "svc-extra".to_string(),
            status: ServiceStatus::Running,
            ..Default::default()
        })
        .unwrap();
        let group = inst.group_instance(&gid).unwrap();
        assert_eq!(group.service_instances.len(), 3);
        assert_eq!(group.metadata.status["svc-extra"], ServiceStatus::Running);
    }

    #[test]
    fn removing_unknown_group_instance_changes_nothing() {
        let ids = SequentialIds::new("id");
        let (desc, mut inst) = blog(&ids);
        inst.groups
            .push(ServiceGroupInstance::from_group(&desc.groups[0], "inst-1", &ids));
        let first = inst.groups[0].service_group_instance_id.clone();

        let err = inst
            .remove_group_instances(&[first.clone(), "ghost".to_string()])
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(inst.groups.len(), 2);

        assert_eq!(inst.remove_group_instances(&[first]).unwrap(), 1);
        assert_eq!(inst.remove_group_instances(&[]).unwrap(), 1);
        assert!(inst.groups.is_empty());
    }

    #[test]
    fn metadata_update_keeps_owner_keys() {
        let ids = SequentialIds::new("id");
        let (_, mut inst) = blog(&ids);
        let gid = inst.groups[0].service_group_instance_id.clone();
        inst.set_group_metadata(InstanceMetadata {
            organization_id: "someone-else".to_string(),
            app_instance_id: "inst-1".to_string(),
            monitored_instance_id: gid.clone(),
            available_replicas: 2,
            ..Default::default()
        })
        .unwrap();
        let meta = &inst.group_instance(&gid).unwrap().metadata;
        assert_eq!(meta.organization_id, "org-1");
        assert_eq!(meta.available_replicas, 2);

        let missing = InstanceMetadata {
            monitored_instance_id: "ghost".to_string(),
            ..Default::default()
        };
        assert!(inst.set_group_metadata(missing).unwrap_err().is_not_found());
    }

    #[test]
    fn parametrized_descriptor_is_flat_on_the_wire() {
        let ids = SequentialIds::new("id");
        let (desc, _) = blog(&ids);
        let pd = ParametrizedDescriptor {
            app_instance_id: "inst-1".to_string(),
            descriptor: desc,
        };
        pd.validate().unwrap();
        let json = serde_json::to_value(&pd).unwrap();
        assert_eq!(json["app_instance_id"], "inst-1");
        assert_eq!(json["app_descriptor_id"], "desc-1");
        assert_eq!(json["name"], "wordpress");
    }

    #[test]
    fn lifecycle_requests_validate() {
        let add = AddServiceGroupInstancesRequest {
            organization_id: "org-1".to_string(),
            app_instance_id: "inst-1".to_string(),
            service_group_id: "g".to_string(),
            num_instances: 0,
        };
        assert!(add.validate().is_err());

        let remove = RemoveServiceGroupInstancesRequest {
            organization_id: "org-1".to_string(),
            app_instance_id: "inst-1".to_string(),
            service_group_instance_ids: vec!["a".to_string(), "a".to_string()],
        };
        assert!(remove.validate().is_err());

        let endpoint = AddAppEndpointRequest {
            organization_id: "org-1".to_string(),
            app_instance_id: "inst-1".to_string(),
            service_group_instance_id: "g".to_string(),
            service_instance_id: "s".to_string(),
            endpoint_instance: EndpointInstance {
                endpoint_instance_id: "e".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(endpoint.validate().unwrap_err().to_string().contains("fqdn"));
    }
}
