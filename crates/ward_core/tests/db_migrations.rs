use rusqlite::Connection;
use ward_core::db::migrations::latest_version;
use ward_core::db::{open_db, open_db_in_memory, DbError};
use ward_core::{FamilyRepository, RepoError, SqliteFamilyRepository, SqliteRequestRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "families");
    assert_table_exists(&conn, "members");
    assert_table_exists(&conn, "requests");
}

#[test]
fn foreign_keys_are_enabled_on_open() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ward.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO families (uuid, family_name, zone, house_number, house_ownership, address, created_at, updated_at)
             VALUES ('0b0e4b9a-5d3c-4b7f-9f3e-2f1d7f0e8a11', 'Smith', 3, 12, 'OWNED', 'Main Road', 0, 0);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let repo = SqliteFamilyRepository::try_new(&conn_second).unwrap();
    assert_eq!(repo.count_families().unwrap(), 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
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
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteFamilyRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
    assert!(SqliteRequestRepository::try_new(&conn).is_err());
}

#[test]
fn zone_outside_range_is_rejected_by_storage() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO families (uuid, family_name, zone, house_number, house_ownership, address, created_at, updated_at)
         VALUES ('7c1a0d4e-2b6f-4e0a-8a3d-5f9b1c2d3e4f', 'Smith', 6, 12, 'OWNED', 'Main Road', 0, 0);",
        [],
    );
    assert!(result.is_err());
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
