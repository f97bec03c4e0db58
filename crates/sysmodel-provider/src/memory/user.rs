use async_trait::async_trait;
use parking_lot::Mutex;

use sysmodel_entities::{EntityKind, SmResult, User};

use super::table::Table;
use crate::traits::{Mutation, UserProvider};

/// In-memory users, keyed by `(organization_id, email)`.
pub struct MemoryUserProvider {
    rows: Mutex<Table<User>>,
}

impl MemoryUserProvider {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Table::new(EntityKind::User)),
        }
    }
}

impl Default for MemoryUserProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserProvider for MemoryUserProvider {
    async fn add(&self, user: &User) -> SmResult<()> {
        self.rows
            .lock()
            .insert(&[&user.organization_id, &user.email], user)
    }

    async fn update(&self, user: &User) -> SmResult<()> {
        self.rows
            .lock()
            .replace(&[&user.organization_id, &user.email], user)
    }

    async fn exists(&self, organization_id: &str, email: &str) -> SmResult<bool> {
        Ok(self.rows.lock().contains(&[organization_id, email]))
    }

    async fn get(&self, organization_id: &str, email: &str) -> SmResult<User> {
        self.rows.lock().get(&[organization_id, email])
    }

    async fn list(&self, organization_id: &str) -> SmResult<Vec<User>> {
        Ok(self.rows.lock().scan(&[organization_id]))
    }

    async fn modify(
        &self,
        organization_id: &str,
        email: &str,
        change: Mutation<User>,
    ) -> SmResult<User> {
        self.rows.lock().modify(&[organization_id, email], change)
    }

    async fn remove(&self, organization_id: &str, email: &str) -> SmResult<()> {
        self.rows.lock().remove(&[organization_id, email]).map(|_| ())
    }

    async fn clear(&self) -> SmResult<()> {
        self.rows.lock().clear();
        Ok(())
    }
}
