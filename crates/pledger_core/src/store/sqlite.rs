//! SQLite-backed campaign store.
//!
//! # Responsibility
//! - Persist campaign records as keyed blobs in the `campaigns` table.
//! - Enforce the store's fixed key and record size bounds.
//!
//! # Invariants
//! - Records are re-validated on decode before reaching callers.
//! - `insert` and `remove` report the previous record from the same
//!   transaction that performs the write.

use crate::model::campaign::{Campaign, CampaignId};
use crate::store::{migrations, CampaignStore, StoreError, StoreResult};
use rusqlite::{params, Connection};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Largest accepted key, in encoded bytes.
pub const MAX_KEY_BYTES: usize = 64;

/// Largest accepted campaign record, in encoded bytes.
pub const MAX_RECORD_BYTES: usize = 16 * 1024;

/// Campaign store backed by a single SQLite connection.
///
/// The connection sits behind a mutex so one store value can be shared
/// across threads. Each trait call holds the lock for the duration of its
/// statement(s), which keeps the single-key contract of [`CampaignStore`].
pub struct SqliteCampaignStore {
    conn: Mutex<Connection>,
}

impl SqliteCampaignStore {
    /// Wraps a migrated connection, rejecting schemas this store cannot use.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CampaignStore for SqliteCampaignStore {
    fn get(&self, id: &CampaignId) -> StoreResult<Option<Campaign>> {
        let key = encode_key(id)?;
        let conn = self.lock();
        select_record(&conn, &key)
    }

    fn insert(&self, id: CampaignId, campaign: &Campaign) -> StoreResult<Option<Campaign>> {
        let key = encode_key(&id)?;
        let record = encode_record(campaign)?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let previous = select_record(&tx, &key)?;
        tx.execute(
            "INSERT OR REPLACE INTO campaigns (id, record) VALUES (?1, ?2);",
            params![key, record],
        )?;
        tx.commit()?;

        Ok(previous)
    }

    fn remove(&self, id: &CampaignId) -> StoreResult<Option<Campaign>> {
        let key = encode_key(id)?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let previous = select_record(&tx, &key)?;
        if previous.is_some() {
            tx.execute("DELETE FROM campaigns WHERE id = ?1;", [&key])?;
        }
        tx.commit()?;

        Ok(previous)
    }
}

fn select_record(conn: &Connection, key: &str) -> StoreResult<Option<Campaign>> {
    let mut stmt = conn.prepare("SELECT record FROM campaigns WHERE id = ?1;")?;
    let mut rows = stmt.query([key])?;
    if let Some(row) = rows.next()? {
        let bytes: Vec<u8> = row.get(0)?;
        return Ok(Some(decode_record(&bytes)?));
    }

    Ok(None)
}

fn encode_key(id: &CampaignId) -> StoreResult<String> {
    let key = id.to_string();
    if key.len() > MAX_KEY_BYTES {
        return Err(StoreError::KeyTooLarge {
            bytes: key.len(),
            max: MAX_KEY_BYTES,
        });
    }

    Ok(key)
}

fn encode_record(campaign: &Campaign) -> StoreResult<Vec<u8>> {
    let bytes = serde_json::to_vec(campaign)?;
    if bytes.len() > MAX_RECORD_BYTES {
        return Err(StoreError::RecordTooLarge {
            bytes: bytes.len(),
            max: MAX_RECORD_BYTES,
        });
    }

    Ok(bytes)
}

fn decode_record(bytes: &[u8]) -> StoreResult<Campaign> {
    let campaign: Campaign = serde_json::from_slice(bytes)?;
    campaign.validate().map_err(StoreError::InvalidRecord)?;
    Ok(campaign)
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version = migrations::current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    ensure_table(conn, "campaigns", &["id", "record"])
}

fn ensure_table(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> StoreResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    let mut found: Vec<String> = Vec::new();
    while let Some(row) = rows.next()? {
        found.push(row.get(0)?);
    }

    if found.is_empty() {
        return Err(StoreError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !found.iter().any(|name| name.as_str() == column) {
            return Err(StoreError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}
