use async_trait::async_trait;

use sysmodel_entities::{EntityKind, SmResult, User};

use super::store::RedbStore;
use super::tables::USERS;
use crate::traits::{Mutation, UserProvider};

pub struct RedbUserProvider {
    store: RedbStore,
}

impl RedbUserProvider {
    pub fn new(store: RedbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserProvider for RedbUserProvider {
    async fn add(&self, user: &User) -> SmResult<()> {
        self.store.insert(
            USERS,
            EntityKind::User,
            &[&user.organization_id, &user.email],
            user,
        )
    }

    async fn update(&self, user: &User) -> SmResult<()> {
        self.store.replace(
            USERS,
            EntityKind::User,
            &[&user.organization_id, &user.email],
            user,
        )
    }

    async fn exists(&self, organization_id: &str, email: &str) -> SmResult<bool> {
        self.store.contains(USERS, &[organization_id, email])
    }

    async fn get(&self, organization_id: &str, email: &str) -> SmResult<User> {
        self.store
            .fetch(USERS, EntityKind::User, &[organization_id, email])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<User>> {
        let mut rows: Vec<User> = self.store.scan(USERS, &[organization_id])?;
        rows.retain(|r| r.organization_id == organization_id);
        Ok(rows)
    }

    async fn modify(
        &self,
        organization_id: &str,
        email: &str,
        change: Mutation<User>,
    ) -> SmResult<User> {
        self.store
            .modify(USERS, EntityKind::User, &[organization_id, email], change)
    }

    async fn remove(&self, organization_id: &str, email: &str) -> SmResult<()> {
        self.store
            .remove(USERS, EntityKind::User, &[organization_id, email])
    }

    async fn clear(&self) -> SmResult<()> {
        self.store.clear(&[USERS])
    }
}
