use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Document store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Store connection failed: {reason}")]
    ConnectionFailed { reason: String },
}

/// Minimal document-store interface the persistence adapter consumes
///
/// Documents are flat JSON objects keyed by a store-assigned id within a
/// named collection. Absence is a normal outcome (`Option`), never an
/// error; only transport/serialization problems surface as `StoreError`.
pub trait DocumentStore {
    /// Write a new document and return its assigned id
    fn create(&self, collection: &str, document: &Value) -> Result<String, StoreError>;

    /// All documents of a collection, in unspecified order
    fn list_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// A single document by id
    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Durable removal; deleting a missing id is not a failure
    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn create(&self, collection: &str, document: &Value) -> Result<String, StoreError> {
        (**self).create(collection, document)
    }

    fn list_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        (**self).list_all(collection)
    }

    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        (**self).get_one(collection, id)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        (**self).delete(collection, id)
    }
}

/// SQLite-backed document store
///
/// One `documents` table holds every collection; payloads are stored as
/// JSON text. Each write is a single-row insert, which is the atomic
/// document write the persistence contract relies on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a store at the specified path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests and ephemeral sessions
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock();

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (collection, id)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection)",
            [],
        )?;

        info!("document store schema initialized");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock only means an earlier query panicked; the
        // connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DocumentStore for SqliteStore {
    fn create(&self, collection: &str, document: &Value) -> Result<String, StoreError> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Stamp the assigned id back into the stored payload
        let mut payload = document.clone();
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("id".to_string(), Value::String(id.clone()));
        }
        let payload_text = serde_json::to_string(&payload)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.lock().execute(
            "INSERT OR REPLACE INTO documents (collection, id, payload) VALUES (?1, ?2, ?3)",
            params![collection, id, payload_text],
        )?;

        debug!(collection, id = %id, "document created");
        Ok(id)
    }

    fn list_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT payload FROM documents WHERE collection = ?1")?;
        let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

        let mut documents = Vec::new();
        for row in rows {
            let payload = row?;
            let value: Value = serde_json::from_str(&payload)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            documents.push(value);
        }
        Ok(documents)
    }

    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let payload = self
            .lock()
            .query_row(
                "SELECT payload FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match payload {
            Some(text) => {
                let value: Value = serde_json::from_str(&text)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let affected = self.lock().execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        debug!(collection, id, affected, "document delete");
        Ok(())
    }
}

/// In-memory document store for tests and previews
#[derive(Default, Clone)]
pub struct MemoryStore {
    documents: Arc<Mutex<BTreeMap<(String, String), Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn create(&self, collection: &str, document: &Value) -> Result<String, StoreError> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut payload = document.clone();
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("id".to_string(), Value::String(id.clone()));
        }

        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((collection.to_string(), id.clone()), payload);
        Ok(id)
    }

    fn list_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|((coll, _), _)| coll == collection)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }
}
