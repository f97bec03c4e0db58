//! sysmodel-entities: entity records of the system model.
//!
//! Every family (organizations, clusters, nodes, roles, users, devices,
//! applications, edge controllers and assets) has a record type, a creation
//! request that [`validate`](organization::AddOrganizationRequest::validate)s
//! its required fields, and an update request whose `Option` fields express
//! "leave unchanged" as `None`.
//!
//! The [`SystemModelError`] taxonomy defined here is shared by the provider,
//! manager, and API layers.

pub mod application;
pub mod cluster;
pub mod device;
pub mod edge;
pub mod error;
pub mod ids;
pub mod labels;
pub mod node;
pub mod organization;
pub mod role;
pub mod user;

mod validate;

pub use application::*;
pub use cluster::*;
pub use device::*;
pub use edge::*;
pub use error::{EntityKind, SmResult, SystemModelError};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator, epoch_secs};
pub use labels::{Labels, apply_label_update};
pub use node::*;
pub use organization::*;
pub use role::*;
pub use user::*;
