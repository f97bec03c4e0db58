//! Providers backed by an embedded [redb](https://docs.rs/redb) database.
//!
//! Every family shares one [`RedbStore`]. Isolation is redb's: write
//! transactions are serialized database-wide, so a provider call's
//! check-then-write never interleaves with another writer. Listing filters
//! on the owning key fields as well as the key prefix.

mod application;
mod cluster;
mod device;
mod edge;
mod node;
mod organization;
mod role;
mod store;
mod tables;
mod user;

pub use application::RedbApplicationProvider;
pub use cluster::RedbClusterProvider;
pub use device::RedbDeviceProvider;
pub use edge::{RedbAssetProvider, RedbEdgeControllerProvider};
pub use node::RedbNodeProvider;
pub use organization::RedbOrganizationProvider;
pub use role::RedbRoleProvider;
pub use store::RedbStore;
pub use user::RedbUserProvider;
