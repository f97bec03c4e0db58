//! Keyed row map and parent→child link set shared by the in-memory providers.
//!
//! Neither type locks anything; each provider wraps its tables in a single
//! mutex so one provider call sees and leaves a consistent family.

use std::collections::{BTreeMap, BTreeSet};

use sysmodel_entities::{EntityKind, SmResult, SystemModelError};

fn owned(key: &[&str]) -> Vec<String> {
    key.iter().map(|k| k.to_string()).collect()
}

fn has_prefix(key: &[String], prefix: &[&str]) -> bool {
    key.len() >= prefix.len() && key.iter().zip(prefix).all(|(a, b)| a == b)
}

/// Rows of one entity family keyed by their full key path.
#[derive(Debug)]
pub(crate) struct Table<T> {
    entity: EntityKind,
    rows: BTreeMap<Vec<String>, T>,
}

impl<T: Clone> Table<T> {
    pub(crate) fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            rows: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: &[&str], value: &T) -> SmResult<()> {
        let key = owned(key);
        if self.rows.contains_key(&key) {
            return Err(SystemModelError::AlreadyExists {
                entity: self.entity,
                keys: key,
            });
        }
        self.rows.insert(key, value.clone());
        Ok(())
    }

    pub(crate) fn replace(&mut self, key: &[&str], value: &T) -> SmResult<()> {
        match self.rows.get_mut(&owned(key)) {
            Some(row) => {
                *row = value.clone();
                Ok(())
            }
            None => Err(SystemModelError::not_found(self.entity, key)),
        }
    }

    /// Run `change` on a copy of the row and store the copy only when it
    /// succeeds.
    pub(crate) fn modify(
        &mut self,
        key: &[&str],
        change: impl FnOnce(&mut T) -> SmResult<()>,
    ) -> SmResult<T> {
        let row = self
            .rows
            .get_mut(&owned(key))
            .ok_or_else(|| SystemModelError::not_found(self.entity, key))?;
        let mut next = row.clone();
        change(&mut next)?;
        *row = next.clone();
        Ok(next)
    }

    pub(crate) fn contains(&self, key: &[&str]) -> bool {
        self.rows.contains_key(&owned(key))
    }

    pub(crate) fn get(&self, key: &[&str]) -> SmResult<T> {
        self.rows
            .get(&owned(key))
            .cloned()
            .ok_or_else(|| SystemModelError::not_found(self.entity, key))
    }

    pub(crate) fn remove(&mut self, key: &[&str]) -> SmResult<T> {
        self.rows
            .remove(&owned(key))
            .ok_or_else(|| SystemModelError::not_found(self.entity, key))
    }

    /// Copies of every row whose key starts with `prefix`.
    pub(crate) fn scan(&self, prefix: &[&str]) -> Vec<T> {
        self.rows
            .iter()
            .filter(|(key, _)| has_prefix(key, prefix))
            .map(|(_, row)| row.clone())
            .collect()
    }

    /// Copies of every row, for families that are not scoped by organization.
    pub(crate) fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// Drop every row whose key starts with `prefix`. Returns how many went.
    pub(crate) fn remove_prefix(&mut self, prefix: &[&str]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|key, _| !has_prefix(key, prefix));
        before - self.rows.len()
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }
}

/// Child ids registered under a parent key path.
#[derive(Debug)]
pub(crate) struct LinkSet {
    child: EntityKind,
    links: BTreeMap<Vec<String>, BTreeSet<String>>,
}

impl LinkSet {
    pub(crate) fn new(child: EntityKind) -> Self {
        Self {
            child,
            links: BTreeMap::new(),
        }
    }

    pub(crate) fn add(&mut self, parent: &[&str], child: &str) -> SmResult<()> {
        let children = self.links.entry(owned(parent)).or_default();
        if !children.insert(child.to_string()) {
            let mut keys = owned(parent);
            keys.push(child.to_string());
            return Err(SystemModelError::AlreadyExists {
                entity: self.child,
                keys,
            });
        }
        Ok(())
    }

    pub(crate) fn contains(&self, parent: &[&str], child: &str) -> bool {
        self.links
            .get(&owned(parent))
            .is_some_and(|children| children.contains(child))
    }

    pub(crate) fn list(&self, parent: &[&str]) -> Vec<String> {
        self.links
            .get(&owned(parent))
            .map(|children| children.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn delete(&mut self, parent: &[&str], child: &str) -> SmResult<()> {
        let key = owned(parent);
        let removed = self
            .links
            .get_mut(&key)
            .is_some_and(|children| children.remove(child));
        if !removed {
            let mut keys = key;
            keys.push(child.to_string());
            return Err(SystemModelError::NotFound {
                entity: self.child,
                keys,
            });
        }
        if self.links.get(&key).is_some_and(BTreeSet::is_empty) {
            self.links.remove(&key);
        }
        Ok(())
    }

    /// Forget every link held by `parent`.
    pub(crate) fn drop_parent(&mut self, parent: &[&str]) {
        self.links.remove(&owned(parent));
    }

    pub(crate) fn clear(&mut self) {
        self.links.clear();
    }
}
