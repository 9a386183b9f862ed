use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, warn};

use bridaldesk_core::{SessionId, Snapshot, StorageKey};

use crate::error::StorageError;
use crate::traits::{Collection, CollectionStore, KeyedStore, Record};

fn encode_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, StorageError> {
    rmp_serde::to_vec(snapshot).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, StorageError> {
    rmp_serde::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// SQLite-backed drafts and record collections.
///
/// Each draft row carries a blake3 checksum of its payload; a row whose
/// payload no longer matches reads as absent.
pub struct SqliteStore {
    conn: Connection,
    writer: String,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self::with_conn(conn))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self::with_conn(conn))
    }

    fn with_conn(conn: Connection) -> Self {
        Self {
            conn,
            writer: SessionId::new().to_string(),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Label recorded as `written_by` on every draft this handle writes.
    pub fn writer(&self) -> &str {
        &self.writer
    }

    /// Which handle last wrote `key`, if any.
    pub fn last_writer(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        let writer = self
            .conn
            .query_row(
                "SELECT written_by FROM drafts WHERE key = ?1",
                rusqlite::params![key.as_str()],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(writer.flatten())
    }

    pub fn draft_keys(&self) -> Result<Vec<StorageKey>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key FROM drafts ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys.into_iter().map(StorageKey::from_raw).collect())
    }
}

impl KeyedStore for SqliteStore {
    fn read(&self, key: &StorageKey) -> Result<Option<Snapshot>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT payload, checksum FROM drafts WHERE key = ?1",
                rusqlite::params![key.as_str()],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?)),
            )
            .optional()?;
        let Some((payload, checksum)) = row else {
            return Ok(None);
        };

        if blake3::hash(&payload).as_bytes().as_slice() != checksum.as_slice() {
            warn!(key = %key, "discarding stored snapshot with checksum mismatch");
            return Ok(None);
        }
        match decode_snapshot(&payload) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding corrupt stored snapshot");
                Ok(None)
            }
        }
    }

    fn write(&self, key: &StorageKey, snapshot: &Snapshot) -> Result<(), StorageError> {
        let payload = encode_snapshot(snapshot)?;
        let checksum = blake3::hash(&payload);
        // Single statement: readers see either the old row or the new one.
        self.conn.execute(
            "INSERT INTO drafts (key, payload, checksum, written_by) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, checksum = excluded.checksum,
                written_by = excluded.written_by,
                written_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![
                key.as_str(),
                payload,
                checksum.as_bytes().as_slice(),
                self.writer,
            ],
        )?;
        debug!(key = %key, bytes = payload.len(), writer = %self.writer, "snapshot written");
        Ok(())
    }

    fn delete(&self, key: &StorageKey) -> Result<(), StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM drafts WHERE key = ?1",
            rusqlite::params![key.as_str()],
        )?;
        if removed > 0 {
            debug!(key = %key, "snapshot deleted");
        }
        Ok(())
    }
}

impl CollectionStore for SqliteStore {
    fn add_record(&self, collection: Collection, body: &Snapshot) -> Result<i64, StorageError> {
        let bytes = encode_snapshot(body)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO record_sequences (collection, last_id) VALUES (?1, 1)
             ON CONFLICT(collection) DO UPDATE SET last_id = last_id + 1",
            rusqlite::params![collection.as_str()],
        )?;
        let id: i64 = tx.query_row(
            "SELECT last_id FROM record_sequences WHERE collection = ?1",
            rusqlite::params![collection.as_str()],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3)",
            rusqlite::params![collection.as_str(), id, bytes],
        )?;
        tx.commit()?;
        debug!(collection = collection.as_str(), id, "record added");
        Ok(id)
    }

    fn get_record(&self, collection: Collection, id: i64) -> Result<Option<Record>, StorageError> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM records WHERE collection = ?1 AND id = ?2",
                rusqlite::params![collection.as_str(), id],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        match body {
            Some(bytes) => Ok(Some(Record {
                id,
                body: decode_snapshot(&bytes)?,
            })),
            None => Ok(None),
        }
    }

    fn get_all_records(&self, collection: Collection) -> Result<Vec<Record>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM records WHERE collection = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(rusqlite::params![collection.as_str()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = Vec::with_capacity(rows.len());
        for (id, bytes) in rows {
            result.push(Record {
                id,
                body: decode_snapshot(&bytes)?,
            });
        }
        Ok(result)
    }

    fn update_record(&self, collection: Collection, id: i64, body: &Snapshot) -> Result<(), StorageError> {
        let bytes = encode_snapshot(body)?;
        let changed = self.conn.execute(
            "UPDATE records SET body = ?1, updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)
             WHERE collection = ?2 AND id = ?3",
            rusqlite::params![bytes, collection.as_str(), id],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("{}/{id}", collection.as_str())));
        }
        Ok(())
    }

    fn delete_record(&self, collection: Collection, id: i64) -> Result<bool, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            rusqlite::params![collection.as_str(), id],
        )?;
        Ok(removed > 0)
    }
}
