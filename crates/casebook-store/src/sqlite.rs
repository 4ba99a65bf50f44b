//! SQLite-backed document store
//!
//! One `documents` table keyed by `(namespace, id)` plus a single-row
//! revision counter. Every write runs in its own transaction so the
//! revision check and the write are atomic. rusqlite is blocking, so calls
//! hop onto the blocking pool.

use crate::{Document, DocumentStore, StoreError};
use async_trait::async_trait;
use casebook_domain::Namespace;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite implementation of [`DocumentStore`]
///
/// # Thread Safety
///
/// The connection is shared behind a mutex; concurrent requests serialize
/// on it.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use casebook_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("casebook.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool
    async fn run<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Task("connection mutex poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    fn next_revision(tx: &Transaction<'_>) -> Result<u64, StoreError> {
        let value: i64 = tx.query_row(
            "UPDATE revision_counter SET value = value + 1 WHERE id = 1 RETURNING value",
            [],
            |row| row.get(0),
        )?;
        Ok(value as u64)
    }

    fn current_revision(
        tx: &Transaction<'_>,
        ns: &str,
        id: &str,
    ) -> Result<Option<u64>, StoreError> {
        let revision: Option<i64> = tx
            .query_row(
                "SELECT revision FROM documents WHERE namespace = ?1 AND id = ?2",
                params![ns, id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision.map(|r| r as u64))
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, i64, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn into_document((id, revision, body): (String, i64, String)) -> Result<Document, StoreError> {
        Ok(Document {
            id,
            revision: revision as u64,
            body: serde_json::from_str(&body)?,
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, ns: &Namespace, id: &str) -> Result<Option<Document>, StoreError> {
        let ns = ns.to_string();
        let id = id.to_string();
        self.run(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, revision, body FROM documents WHERE namespace = ?1 AND id = ?2",
                    params![ns, id],
                    Self::row_to_document,
                )
                .optional()?;
            row.map(Self::into_document).transpose()
        })
        .await
    }

    async fn get_many(&self, ns: &Namespace, ids: &[String]) -> Result<Vec<Document>, StoreError> {
        let ns = ns.to_string();
        let ids = ids.to_vec();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, revision, body FROM documents WHERE namespace = ?1 AND id = ?2",
            )?;
            let mut docs = Vec::with_capacity(ids.len());
            for id in &ids {
                if let Some(row) = stmt
                    .query_row(params![ns, id], Self::row_to_document)
                    .optional()?
                {
                    docs.push(Self::into_document(row)?);
                }
            }
            Ok(docs)
        })
        .await
    }

    async fn insert(&self, ns: &Namespace, id: &str, body: Value) -> Result<u64, StoreError> {
        let ns = ns.to_string();
        let id = id.to_string();
        let body = serde_json::to_string(&body)?;
        self.run(move |conn| {
            let tx = conn.transaction()?;
            if Self::current_revision(&tx, &ns, &id)?.is_some() {
                return Err(StoreError::conflict(&ns, &id));
            }
            let revision = Self::next_revision(&tx)?;
            tx.execute(
                "INSERT INTO documents (namespace, id, revision, body) VALUES (?1, ?2, ?3, ?4)",
                params![ns, id, revision as i64, body],
            )?;
            tx.commit()?;
            Ok(revision)
        })
        .await
    }

    async fn replace(
        &self,
        ns: &Namespace,
        id: &str,
        body: Value,
        expected_revision: u64,
    ) -> Result<u64, StoreError> {
        let ns = ns.to_string();
        let id = id.to_string();
        let body = serde_json::to_string(&body)?;
        self.run(move |conn| {
            let tx = conn.transaction()?;
            match Self::current_revision(&tx, &ns, &id)? {
                None => return Err(StoreError::not_found(&ns, &id)),
                Some(current) if current != expected_revision => {
                    return Err(StoreError::conflict(&ns, &id));
                }
                Some(_) => {}
            }
            let revision = Self::next_revision(&tx)?;
            tx.execute(
                "UPDATE documents SET revision = ?3, body = ?4 WHERE namespace = ?1 AND id = ?2",
                params![ns, id, revision as i64, body],
            )?;
            tx.commit()?;
            Ok(revision)
        })
        .await
    }

    async fn delete(
        &self,
        ns: &Namespace,
        id: &str,
        expected_revision: Option<u64>,
    ) -> Result<(), StoreError> {
        let ns = ns.to_string();
        let id = id.to_string();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let current = Self::current_revision(&tx, &ns, &id)?
                .ok_or_else(|| StoreError::not_found(&ns, &id))?;
            if expected_revision.is_some_and(|r| r != current) {
                return Err(StoreError::conflict(&ns, &id));
            }
            tx.execute(
                "DELETE FROM documents WHERE namespace = ?1 AND id = ?2",
                params![ns, id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn list(&self, ns: &Namespace) -> Result<Vec<Document>, StoreError> {
        let ns = ns.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, revision, body FROM documents WHERE namespace = ?1 ORDER BY revision DESC",
            )?;
            let rows = stmt
                .query_map(params![ns], Self::row_to_document)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(Self::into_document).collect()
        })
        .await
    }
}
