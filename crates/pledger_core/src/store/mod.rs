//! Durable campaign storage boundary.
//!
//! # Responsibility
//! - Define the keyed store contract the ledger is built on.
//! - Bootstrap SQLite-backed stores and apply schema migrations.
//!
//! # Invariants
//! - Store keys are campaign ids; no operation touches more than one key.
//! - `insert` has upsert semantics and returns the previous record.
//! - Persisted records must survive a full encode/decode roundtrip.

use crate::model::campaign::{Campaign, CampaignId, CampaignValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod memory;
mod open;
mod sqlite;

pub use memory::MemoryCampaignStore;
pub use open::{open_store, open_store_in_memory};
pub use sqlite::{SqliteCampaignStore, MAX_KEY_BYTES, MAX_RECORD_BYTES};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from campaign store operations and bootstrap.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    Sqlite(rusqlite::Error),
    /// Record bytes could not be encoded or decoded.
    Codec(serde_json::Error),
    /// Database schema is newer than this binary supports.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Store key exceeds the fixed byte bound.
    KeyTooLarge { bytes: usize, max: usize },
    /// Encoded record exceeds the fixed byte bound.
    RecordTooLarge { bytes: usize, max: usize },
    /// Persisted record decodes but violates campaign invariants.
    InvalidRecord(CampaignValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "campaign record codec failure: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "campaign store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "campaign store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "campaign store requires column `{column}` in table `{table}`"
            ),
            Self::KeyTooLarge { bytes, max } => {
                write!(f, "campaign key is {bytes} bytes, store limit is {max}")
            }
            Self::RecordTooLarge { bytes, max } => {
                write!(f, "campaign record is {bytes} bytes, store limit is {max}")
            }
            Self::InvalidRecord(err) => write!(f, "invalid persisted campaign record: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::InvalidRecord(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

/// Keyed store contract the campaign repository runs on.
///
/// Implementations must make each call atomic at single-key granularity;
/// the repository never spans keys in one operation.
pub trait CampaignStore {
    /// Returns the record stored under `id`.
    fn get(&self, id: &CampaignId) -> StoreResult<Option<Campaign>>;

    /// Stores `campaign` under `id`, returning the previous record.
    fn insert(&self, id: CampaignId, campaign: &Campaign) -> StoreResult<Option<Campaign>>;

    /// Removes and returns the record stored under `id`.
    fn remove(&self, id: &CampaignId) -> StoreResult<Option<Campaign>>;
}
