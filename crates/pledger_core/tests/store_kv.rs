use pledger_core::store::migrations::latest_version;
use pledger_core::{
    open_store, open_store_in_memory, Campaign, CampaignStore, MemoryCampaignStore, Principal,
    SqliteCampaignStore, StoreError, NANOS_PER_DAY,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn open_store_in_memory_applies_all_migrations() {
    let conn = open_store_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "campaigns");
}

#[test]
fn opening_same_store_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pledger.db");

    let conn_first = open_store(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_store(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "campaigns");
}

#[test]
fn opening_store_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_store(&path).unwrap_err();
    match err {
        StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_store_insert_get_remove_roundtrip() {
    let store = sqlite_store();
    let campaign = sample_campaign(500);
    let id = campaign.id;

    assert!(store.insert(id, &campaign).unwrap().is_none());
    assert_eq!(store.get(&id).unwrap().unwrap(), campaign);

    let mut updated = campaign.clone();
    updated.title = "Renamed".to_string();
    let previous = store.insert(id, &updated).unwrap().unwrap();
    assert_eq!(previous, campaign);

    let removed = store.remove(&id).unwrap().unwrap();
    assert_eq!(removed, updated);
    assert!(store.get(&id).unwrap().is_none());
    assert!(store.remove(&id).unwrap().is_none());
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pledger.db");
    let campaign = sample_campaign(500);
    let id = campaign.id;

    let store = SqliteCampaignStore::try_new(open_store(&path).unwrap()).unwrap();
    store.insert(id, &campaign).unwrap();
    drop(store);

    let reopened = SqliteCampaignStore::try_new(open_store(&path).unwrap()).unwrap();
    assert_eq!(reopened.get(&id).unwrap().unwrap(), campaign);
}

#[test]
fn sqlite_store_rejects_oversized_record() {
    let store = sqlite_store();
    let mut campaign = sample_campaign(500);
    campaign.description = "x".repeat(20_000);
    let id = campaign.id;

    let err = store.insert(id, &campaign).unwrap_err();
    match err {
        StoreError::RecordTooLarge { bytes, max } => {
            assert!(bytes > max);
            assert_eq!(max, 16 * 1024);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.get(&id).unwrap().is_none());
}

#[test]
fn sqlite_store_surfaces_undecodable_record() {
    let conn = open_store_in_memory().unwrap();
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO campaigns (id, record) VALUES (?1, ?2);",
        rusqlite::params![id.to_string(), b"not json".to_vec()],
    )
    .unwrap();

    let store = SqliteCampaignStore::try_new(conn).unwrap();
    let err = store.get(&id).unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
}

#[test]
fn sqlite_store_surfaces_record_violating_invariants() {
    let conn = open_store_in_memory().unwrap();
    let mut corrupt = sample_campaign(500);
    corrupt.total_donations = 9_999;
    let id = corrupt.id;
    conn.execute(
        "INSERT INTO campaigns (id, record) VALUES (?1, ?2);",
        rusqlite::params![id.to_string(), serde_json::to_vec(&corrupt).unwrap()],
    )
    .unwrap();

    let store = SqliteCampaignStore::try_new(conn).unwrap();
    let err = store.get(&id).unwrap_err();
    assert!(matches!(err, StoreError::InvalidRecord(_)));
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteCampaignStore::try_new(conn);
    match result {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_without_required_campaigns_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCampaignStore::try_new(conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredTable("campaigns"))
    ));
}

#[test]
fn store_rejects_connection_missing_required_record_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE campaigns (id TEXT PRIMARY KEY NOT NULL);")
        .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCampaignStore::try_new(conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredColumn {
            table: "campaigns",
            column: "record"
        })
    ));
}

#[test]
fn memory_store_matches_the_sqlite_contract() {
    let store = MemoryCampaignStore::new();
    assert!(store.is_empty());

    let campaign = sample_campaign(500);
    let id = campaign.id;

    assert!(store.insert(id, &campaign).unwrap().is_none());
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&id).unwrap().unwrap(), campaign);

    let mut updated = campaign.clone();
    updated.description = "Rewritten".to_string();
    assert_eq!(store.insert(id, &updated).unwrap().unwrap(), campaign);

    assert_eq!(store.remove(&id).unwrap().unwrap(), updated);
    assert!(store.get(&id).unwrap().is_none());
    assert!(store.is_empty());
}

fn sqlite_store() -> SqliteCampaignStore {
    SqliteCampaignStore::try_new(open_store_in_memory().unwrap()).unwrap()
}

fn sample_campaign(goal: u64) -> Campaign {
    Campaign::new(
        Uuid::new_v4(),
        Principal::new("alice"),
        "Community garden",
        "Raised beds for the north lot",
        goal,
        30 * NANOS_PER_DAY,
    )
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
