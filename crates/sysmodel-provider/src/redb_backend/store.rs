//! RedbStore: the shared redb database behind every redb provider.
//!
//! All values are JSON-serialized into redb's `&[u8]` value columns. Each
//! mutating provider call runs inside one write transaction, so its
//! existence checks and writes commit or abort together. redb allows a
//! single writer at a time across the whole database; readers never block.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadTransaction, ReadableDatabase, ReadableTable, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use sysmodel_entities::{EntityKind, SmResult, SystemModelError};

use super::tables::{self, Table};

/// Convert any `Display` error into a `SystemModelError::Storage` with a stage prefix.
macro_rules! map_err {
    ($stage:literal) => {
        |e| SystemModelError::Storage(format!(concat!($stage, ": {}"), e))
    };
}

fn join(keys: &[&str]) -> String {
    keys.join("/")
}

/// Key prefix of everything stored under `parent`; empty matches every key.
fn prefix_of(parent: &[&str]) -> String {
    if parent.is_empty() {
        String::new()
    } else {
        format!("{}/", join(parent))
    }
}

fn encode<T: Serialize>(value: &T) -> SmResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(map_err!("serialize"))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> SmResult<T> {
    serde_json::from_slice(bytes).map_err(map_err!("deserialize"))
}

fn has_key(table: &impl ReadableTable<&'static str, &'static [u8]>, key: &str) -> SmResult<bool> {
    Ok(table.get(key).map_err(map_err!("read"))?.is_some())
}

fn load<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    entity: EntityKind,
    keys: &[&str],
) -> SmResult<T> {
    match table.get(join(keys).as_str()).map_err(map_err!("read"))? {
        Some(guard) => decode(guard.value()),
        None => Err(SystemModelError::not_found(entity, keys)),
    }
}

fn scan_rows<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    parent: &[&str],
) -> SmResult<Vec<T>> {
    let prefix = prefix_of(parent);
    let mut rows = Vec::new();
    for entry in table.iter().map_err(map_err!("read"))? {
        let (key, value) = entry.map_err(map_err!("read"))?;
        if key.value().starts_with(&prefix) {
            rows.push(decode(value.value())?);
        }
    }
    Ok(rows)
}

/// Keys directly under `parent`, with the parent prefix stripped.
fn child_keys(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    parent: &[&str],
) -> SmResult<Vec<String>> {
    let prefix = prefix_of(parent);
    let mut children = Vec::new();
    for entry in table.iter().map_err(map_err!("read"))? {
        let (key, _) = entry.map_err(map_err!("read"))?;
        if let Some(rest) = key.value().strip_prefix(&prefix) {
            if !rest.contains('/') {
                children.push(rest.to_string());
            }
        }
    }
    Ok(children)
}

/// Thread-safe handle to the system model database.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> SmResult<Self> {
        let db = Database::create(path).map_err(map_err!("open"))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "redb store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store.
    pub fn open_in_memory() -> SmResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!("open"))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory redb store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> SmResult<()> {
        let txn = self.db.begin_write().map_err(map_err!("transaction"))?;
        for def in tables::ALL {
            txn.open_table(def).map_err(map_err!("table"))?;
        }
        txn.commit().map_err(map_err!("commit"))?;
        Ok(())
    }

    /// Run `f` in a read transaction.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Reader) -> SmResult<R>) -> SmResult<R> {
        let txn = self.db.begin_read().map_err(map_err!("transaction"))?;
        f(&Reader { txn })
    }

    /// Run `f` in a write transaction, committing on `Ok` and aborting on `Err`.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&Writer<'_>) -> SmResult<R>) -> SmResult<R> {
        let txn = self.db.begin_write().map_err(map_err!("transaction"))?;
        let result = f(&Writer { txn: &txn });
        match result {
            Ok(out) => {
                txn.commit().map_err(map_err!("commit"))?;
                Ok(out)
            }
            Err(err) => {
                txn.abort().map_err(map_err!("abort"))?;
                Err(err)
            }
        }
    }

    // ── One-shot helpers ───────────────────────────────────────────

    pub(crate) fn insert<T: Serialize>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
        value: &T,
    ) -> SmResult<()> {
        self.write(|w| w.insert(def, entity, keys, value))
    }

    pub(crate) fn replace<T: Serialize>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
        value: &T,
    ) -> SmResult<()> {
        self.write(|w| w.replace(def, entity, keys, value))
    }

    pub(crate) fn remove(&self, def: Table, entity: EntityKind, keys: &[&str]) -> SmResult<()> {
        self.write(|w| w.remove(def, entity, keys))
    }

    pub(crate) fn contains(&self, def: Table, keys: &[&str]) -> SmResult<bool> {
        self.read(|r| r.contains(def, keys))
    }

    pub(crate) fn fetch<T: DeserializeOwned>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
    ) -> SmResult<T> {
        self.read(|r| r.fetch(def, entity, keys))
    }

    pub(crate) fn scan<T: DeserializeOwned>(&self, def: Table, parent: &[&str]) -> SmResult<Vec<T>> {
        self.read(|r| r.scan(def, parent))
    }

    /// Fetch a row, apply `change` and write it back in one transaction.
    /// A failing `change` aborts and leaves the row as it was.
    pub(crate) fn modify<T: Serialize + DeserializeOwned>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
        change: impl FnOnce(&mut T) -> SmResult<()>,
    ) -> SmResult<T> {
        self.write(|w| {
            let mut row: T = w.fetch(def, entity, keys)?;
            change(&mut row)?;
            w.replace(def, entity, keys, &row)?;
            Ok(row)
        })
    }

    /// Empty the given tables in one transaction.
    pub(crate) fn clear(&self, defs: &[Table]) -> SmResult<()> {
        self.write(|w| {
            for def in defs {
                w.remove_prefix(*def, &[])?;
            }
            Ok(())
        })
    }
}

/// Read access inside one read transaction.
pub(crate) struct Reader {
    txn: ReadTransaction,
}

impl Reader {
    pub(crate) fn contains(&self, def: Table, keys: &[&str]) -> SmResult<bool> {
        let table = self.txn.open_table(def).map_err(map_err!("table"))?;
        has_key(&table, &join(keys))
    }

    pub(crate) fn fetch<T: DeserializeOwned>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
    ) -> SmResult<T> {
        let table = self.txn.open_table(def).map_err(map_err!("table"))?;
        load(&table, entity, keys)
    }

    pub(crate) fn scan<T: DeserializeOwned>(&self, def: Table, parent: &[&str]) -> SmResult<Vec<T>> {
        let table = self.txn.open_table(def).map_err(map_err!("table"))?;
        scan_rows(&table, parent)
    }

    pub(crate) fn children(&self, def: Table, parent: &[&str]) -> SmResult<Vec<String>> {
        let table = self.txn.open_table(def).map_err(map_err!("table"))?;
        child_keys(&table, parent)
    }
}

/// Read-write access inside one write transaction.
pub(crate) struct Writer<'a> {
    txn: &'a WriteTransaction,
}

impl Writer<'_> {
    pub(crate) fn contains(&self, def: Table, keys: &[&str]) -> SmResult<bool> {
        let table = self.txn.open_table(def).map_err(map_err!("table"))?;
        has_key(&table, &join(keys))
    }

    pub(crate) fn fetch<T: DeserializeOwned>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
    ) -> SmResult<T> {
        let table = self.txn.open_table(def).map_err(map_err!("table"))?;
        load(&table, entity, keys)
    }

    pub(crate) fn scan<T: DeserializeOwned>(&self, def: Table, parent: &[&str]) -> SmResult<Vec<T>> {
        let table = self.txn.open_table(def).map_err(map_err!("table"))?;
        scan_rows(&table, parent)
    }

    /// Insert a new row. Fails `AlreadyExists` if the key is taken.
    pub(crate) fn insert<T: Serialize>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
        value: &T,
    ) -> SmResult<()> {
        let key = join(keys);
        let bytes = encode(value)?;
        let mut table = self.txn.open_table(def).map_err(map_err!("table"))?;
        if has_key(&table, &key)? {
            return Err(SystemModelError::already_exists(entity, keys));
        }
        table
            .insert(key.as_str(), bytes.as_slice())
            .map_err(map_err!("write"))?;
        Ok(())
    }

    /// Overwrite an existing row. Fails `NotFound` if the key is absent.
    pub(crate) fn replace<T: Serialize>(
        &self,
        def: Table,
        entity: EntityKind,
        keys: &[&str],
        value: &T,
    ) -> SmResult<()> {
        let key = join(keys);
        let bytes = encode(value)?;
        let mut table = self.txn.open_table(def).map_err(map_err!("table"))?;
        if !has_key(&table, &key)? {
            return Err(SystemModelError::not_found(entity, keys));
        }
        table
            .insert(key.as_str(), bytes.as_slice())
            .map_err(map_err!("write"))?;
        Ok(())
    }

    pub(crate) fn remove(&self, def: Table, entity: EntityKind, keys: &[&str]) -> SmResult<()> {
        let key = join(keys);
        let mut table = self.txn.open_table(def).map_err(map_err!("table"))?;
        let existed = table
            .remove(key.as_str())
            .map_err(map_err!("write"))?
            .is_some();
        if existed {
            Ok(())
        } else {
            Err(SystemModelError::not_found(entity, keys))
        }
    }

    /// Delete every key under `parent` (every key when `parent` is empty).
    pub(crate) fn remove_prefix(&self, def: Table, parent: &[&str]) -> SmResult<u32> {
        let prefix = prefix_of(parent);
        let mut table = self.txn.open_table(def).map_err(map_err!("table"))?;
        // Collect keys first; the table can't be mutated while iterating.
        let mut keys = Vec::new();
        for entry in table.iter().map_err(map_err!("read"))? {
            let (key, _) = entry.map_err(map_err!("read"))?;
            if key.value().starts_with(&prefix) {
                keys.push(key.value().to_string());
            }
        }
        for key in &keys {
            table.remove(key.as_str()).map_err(map_err!("write"))?;
        }
        Ok(keys.len() as u32)
    }

    /// Register `child` under `parent` in a link table.
    pub(crate) fn link(
        &self,
        def: Table,
        child_entity: EntityKind,
        parent: &[&str],
        child: &str,
    ) -> SmResult<()> {
        let mut keys = parent.to_vec();
        keys.push(child);
        self.insert(def, child_entity, &keys, &())
    }

    pub(crate) fn unlink(
        &self,
        def: Table,
        child_entity: EntityKind,
        parent: &[&str],
        child: &str,
    ) -> SmResult<()> {
        let mut keys = parent.to_vec();
        keys.push(child);
        self.remove(def, child_entity, &keys)
    }
}
