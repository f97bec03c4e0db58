//! In-memory reference providers.
//!
//! Each provider keeps its whole family behind one [`parking_lot::Mutex`],
//! held for the duration of a single call and never across an await point.
//! Operations on the same family serialize; different families never block
//! each other. Reads return clones.

mod application;
mod cluster;
mod device;
mod edge;
mod node;
mod organization;
mod role;
mod table;
mod user;

pub use application::MemoryApplicationProvider;
pub use cluster::MemoryClusterProvider;
pub use device::MemoryDeviceProvider;
pub use edge::{MemoryAssetProvider, MemoryEdgeControllerProvider};
pub use node::MemoryNodeProvider;
pub use organization::MemoryOrganizationProvider;
pub use role::MemoryRoleProvider;
pub use user::MemoryUserProvider;
