//! Error types shared by every layer of the system model.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for system model operations.
pub type SmResult<T> = Result<T, SystemModelError>;

/// Entity family an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    Cluster,
    Node,
    Role,
    User,
    DeviceGroup,
    Device,
    AppDescriptor,
    ServiceGroup,
    Service,
    AppInstance,
    ServiceGroupInstance,
    ServiceInstance,
    AppEndpoint,
    ParametrizedDescriptor,
    AppZtNetwork,
    EdgeController,
    Asset,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Organization => "organization",
            EntityKind::Cluster => "cluster",
            EntityKind::Node => "node",
            EntityKind::Role => "role",
            EntityKind::User => "user",
            EntityKind::DeviceGroup => "device group",
            EntityKind::Device => "device",
            EntityKind::AppDescriptor => "app descriptor",
            EntityKind::ServiceGroup => "service group",
            EntityKind::Service => "service",
            EntityKind::AppInstance => "app instance",
            EntityKind::ServiceGroupInstance => "service group instance",
            EntityKind::ServiceInstance => "service instance",
            EntityKind::AppEndpoint => "app endpoint",
            EntityKind::ParametrizedDescriptor => "parametrized descriptor",
            EntityKind::AppZtNetwork => "app zt network",
            EntityKind::EdgeController => "edge controller",
            EntityKind::Asset => "asset",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by validation, providers, and managers.
///
/// Every variant that refers to stored data carries the key path that
/// identifies the failing level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemModelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{entity} not found: {}", .keys.join("/"))]
    NotFound {
        entity: EntityKind,
        keys: Vec<String>,
    },

    #[error("{entity} already exists: {}", .keys.join("/"))]
    AlreadyExists {
        entity: EntityKind,
        keys: Vec<String>,
    },

    /// A multi-step operation committed some writes before failing.
    #[error("inconsistent state after {operation} on {}: {cause}", .keys.join("/"))]
    Inconsistent {
        operation: String,
        keys: Vec<String>,
        cause: Box<SystemModelError>,
    },

    #[error("unimplemented: {0}")]
    Unimplemented(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl SystemModelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(entity: EntityKind, keys: &[&str]) -> Self {
        Self::NotFound {
            entity,
            keys: owned(keys),
        }
    }

    pub fn already_exists(entity: EntityKind, keys: &[&str]) -> Self {
        Self::AlreadyExists {
            entity,
            keys: owned(keys),
        }
    }

    pub fn inconsistent(operation: &str, keys: &[&str], cause: SystemModelError) -> Self {
        Self::Inconsistent {
            operation: operation.to_string(),
            keys: owned(keys),
            cause: Box::new(cause),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::Inconsistent { .. } => "inconsistent",
            Self::Unimplemented(_) => "unimplemented",
            Self::Storage(_) => "storage",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}
