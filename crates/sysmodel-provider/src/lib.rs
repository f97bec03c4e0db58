//! Persistence for the system model.
//!
//! [`traits`] is the contract the managers program against. Two families of
//! implementations ship here: [`memory`] for tests and single-process use,
//! and [`redb_backend`] for a durable embedded store.

mod bundle;
pub mod memory;
pub mod redb_backend;
pub mod traits;

pub use bundle::Providers;
pub use redb_backend::RedbStore;
pub use traits::{
    ApplicationProvider, AssetProvider, ClusterProvider, DeviceProvider, EdgeControllerProvider,
    Mutation, NodeProvider, OrganizationProvider, RoleProvider, UserProvider,
};
