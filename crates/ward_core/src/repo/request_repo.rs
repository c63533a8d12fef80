//! Service request repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist member service requests and their lifecycle fields.
//! - Provide status/member projections with a fixed ordering.
//!
//! # Invariants
//! - A request row is only inserted while its member row exists (one transaction).
//! - Listings are ordered `created_at DESC`, ties by insertion order.
//! - `member_uuid` and `created_at` are never rewritten by updates.

use crate::model::member::MemberId;
use crate::model::request::{Request, RequestId, RequestStatus};
use crate::repo::family_repo::{RecordRef, RepoError, RepoResult};
use crate::repo::schema::{contains_ignore_case, ensure_connection_ready, parse_uuid};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const REQUEST_SELECT_SQL: &str = "SELECT
    uuid,
    member_uuid,
    description,
    status,
    notes,
    created_at,
    completed_at
FROM requests";

const REQUEST_COLUMNS: &[&str] = &[
    "uuid",
    "member_uuid",
    "description",
    "status",
    "notes",
    "created_at",
    "completed_at",
];

/// Query options for listing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestListQuery {
    /// Exact status match.
    pub status: Option<RequestStatus>,
    /// Exact member match.
    pub member_id: Option<MemberId>,
    /// Case-insensitive substring of `description`.
    pub description_contains: Option<String>,
}

/// Persistence gateway for service requests.
pub trait RequestRepository {
    /// Inserts a request for `request.member_id`; `NotFound` if that member
    /// does not exist.
    fn create_request(&self, request: &Request) -> RepoResult<RequestId>;
    /// Replaces description, status, notes and completion stamp.
    fn update_request(&self, request: &Request) -> RepoResult<()>;
    fn get_request(&self, id: RequestId) -> RepoResult<Option<Request>>;
    /// Lists requests, most recently created first.
    fn list_requests(&self, query: &RequestListQuery) -> RepoResult<Vec<Request>>;
    /// Counts requests, optionally only those in `status`.
    fn count_requests(&self, status: Option<RequestStatus>) -> RepoResult<u64>;
    fn delete_request(&self, id: RequestId) -> RepoResult<()>;
}

/// SQLite-backed request repository.
pub struct SqliteRequestRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRequestRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("requests", REQUEST_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl RequestRepository for SqliteRequestRepository<'_> {
    fn create_request(&self, request: &Request) -> RepoResult<RequestId> {
        request.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let member_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM members WHERE uuid = ?1);",
            [request.member_id.to_string()],
            |row| row.get(0),
        )?;
        if member_exists != 1 {
            return Err(RepoError::NotFound(RecordRef::Member(request.member_id)));
        }

        tx.execute(
            "INSERT INTO requests (
                uuid,
                member_uuid,
                description,
                status,
                notes,
                created_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                request.uuid.to_string(),
                request.member_id.to_string(),
                request.description.as_str(),
                request.status.as_str(),
                request.notes.as_deref(),
                request.created_at,
                request.completed_at,
            ],
        )?;

        tx.commit()?;
        Ok(request.uuid)
    }

    fn update_request(&self, request: &Request) -> RepoResult<()> {
        request.validate()?;

        let changed = self.conn.execute(
            "UPDATE requests
             SET
                description = ?1,
                status = ?2,
                notes = ?3,
                completed_at = ?4
             WHERE uuid = ?5;",
            params![
                request.description.as_str(),
                request.status.as_str(),
                request.notes.as_deref(),
                request.completed_at,
                request.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Request(request.uuid)));
        }

        Ok(())
    }

    fn get_request(&self, id: RequestId) -> RepoResult<Option<Request>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REQUEST_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_request_row(row)?));
        }
        Ok(None)
    }

    fn list_requests(&self, query: &RequestListQuery) -> RepoResult<Vec<Request>> {
        let mut sql = format!("{REQUEST_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(member_id) = query.member_id {
            sql.push_str(" AND member_uuid = ?");
            bind_values.push(Value::Text(member_id.to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid ASC");

        let needle = query
            .description_contains
            .as_deref()
            .map(str::to_lowercase);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut requests = Vec::new();

        while let Some(row) = rows.next()? {
            let request = parse_request_row(row)?;
            if let Some(needle) = needle.as_deref() {
                if !contains_ignore_case(&request.description, needle) {
                    continue;
                }
            }
            requests.push(request);
        }

        Ok(requests)
    }

    fn count_requests(&self, status: Option<RequestStatus>) -> RepoResult<u64> {
        let count: i64 = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM requests WHERE status = ?1;",
                [status.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM requests;", [], |row| row.get(0))?,
        };
        Ok(count as u64)
    }

    fn delete_request(&self, id: RequestId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM requests WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Request(id)));
        }

        Ok(())
    }
}

fn parse_request_row(row: &Row<'_>) -> RepoResult<Request> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "requests.uuid")?;
    let member_text: String = row.get("member_uuid")?;
    let member_id = parse_uuid(&member_text, "requests.member_uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in requests.status"))
    })?;

    let request = Request {
        uuid,
        member_id,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        status,
        completed_at: row.get("completed_at")?,
        notes: row.get("notes")?,
    };
    request.validate()?;
    Ok(request)
}

fn parse_status(value: &str) -> Option<RequestStatus> {
    RequestStatus::ALL
        .into_iter()
        .find(|status| status.as_str() == value)
}
