//! Family/member aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist households and the members they own.
//! - Keep member ownership and cascading removal inside the storage boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - A member row is only inserted while its family row exists (one transaction).
//! - Deleting a family deletes each owned member, then the family, in one
//!   transaction. Request rows are not touched.
//! - Listings follow insertion order.

use crate::db::DbError;
use crate::model::family::{Family, FamilyId, HouseOwnership, Zone};
use crate::model::member::{Member, MemberFlag, MemberId, Relation};
use crate::model::request::RequestId;
use crate::model::validation::ValidationError;
use crate::repo::schema::{
    bool_to_int, contains_ignore_case, ensure_connection_ready, parse_bool, parse_uuid,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FAMILY_SELECT_SQL: &str = "SELECT
    uuid,
    family_name,
    zone,
    house_number,
    house_ownership,
    address
FROM families";

const MEMBER_SELECT_SQL: &str = "SELECT
    uuid,
    family_uuid,
    name,
    date_of_birth,
    relation,
    phone_number,
    occupation,
    is_student,
    is_senior_citizen,
    is_disabled,
    is_pensioner,
    pension_type,
    medical_needs
FROM members";

const FAMILY_COLUMNS: &[&str] = &[
    "uuid",
    "family_name",
    "zone",
    "house_number",
    "house_ownership",
    "address",
];

const MEMBER_COLUMNS: &[&str] = &[
    "uuid",
    "family_uuid",
    "name",
    "date_of_birth",
    "relation",
    "phone_number",
    "occupation",
    "is_student",
    "is_senior_citizen",
    "is_disabled",
    "is_pensioner",
    "pension_type",
    "medical_needs",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Identifies one stored record in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordRef {
    Family(FamilyId),
    Member(MemberId),
    Request(RequestId),
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Family(id) => write!(f, "family {id}"),
            Self::Member(id) => write!(f, "member {id}"),
            Self::Request(id) => write!(f, "request {id}"),
        }
    }
}

/// Repository error for ward persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(RecordRef),
    InvalidData(String),
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
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::InvalidData(message) => write!(f, "invalid persisted ward data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "ward repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "ward repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "ward repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing households.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyListQuery {
    /// Exact zone match.
    pub zone: Option<Zone>,
    /// Case-insensitive substring of `family_name`.
    pub name_contains: Option<String>,
}

/// Query options for listing members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberListQuery {
    /// Owning household.
    pub family_id: Option<FamilyId>,
    /// Classification flag that must be set.
    pub flag: Option<MemberFlag>,
    /// Case-insensitive substring of `name` or `phone_number`.
    pub text: Option<String>,
    /// Case-insensitive substring of `occupation`.
    pub occupation_contains: Option<String>,
}

/// Persistence gateway for the family/member aggregate.
pub trait FamilyRepository {
    fn create_family(&self, family: &Family) -> RepoResult<FamilyId>;
    fn update_family(&self, family: &Family) -> RepoResult<()>;
    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>>;
    fn list_families(&self, query: &FamilyListQuery) -> RepoResult<Vec<Family>>;
    fn count_families(&self) -> RepoResult<u64>;
    /// Deletes the family and every member it owns. Returns removed member ids
    /// in insertion order.
    fn delete_family(&self, id: FamilyId) -> RepoResult<Vec<MemberId>>;

    /// Inserts a member under `member.family_id`; `NotFound` if that family
    /// does not exist.
    fn add_member(&self, member: &Member) -> RepoResult<MemberId>;
    /// Replaces mutable member fields. Never changes the owning family.
    fn update_member(&self, member: &Member) -> RepoResult<()>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>>;
    /// Counts members, optionally only those with `flag` set.
    fn count_members(&self, flag: Option<MemberFlag>) -> RepoResult<u64>;
    fn delete_member(&self, id: MemberId) -> RepoResult<()>;
}

/// SQLite-backed family/member repository.
pub struct SqliteFamilyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[("families", FAMILY_COLUMNS), ("members", MEMBER_COLUMNS)],
        )?;
        Ok(Self { conn })
    }
}

impl FamilyRepository for SqliteFamilyRepository<'_> {
    fn create_family(&self, family: &Family) -> RepoResult<FamilyId> {
        family.validate()?;

        self.conn.execute(
            "INSERT INTO families (
                uuid,
                family_name,
                zone,
                house_number,
                house_ownership,
                address
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                family.uuid.to_string(),
                family.family_name.as_str(),
                i64::from(family.zone),
                i64::from(family.house_number),
                family.house_ownership.as_str(),
                family.address.as_str(),
            ],
        )?;

        Ok(family.uuid)
    }

    fn update_family(&self, family: &Family) -> RepoResult<()> {
        family.validate()?;

        let changed = self.conn.execute(
            "UPDATE families
             SET
                family_name = ?1,
                zone = ?2,
                house_number = ?3,
                house_ownership = ?4,
                address = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                family.family_name.as_str(),
                i64::from(family.zone),
                i64::from(family.house_number),
                family.house_ownership.as_str(),
                family.address.as_str(),
                family.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Family(family.uuid)));
        }

        Ok(())
    }

    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FAMILY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_family_row(row)?));
        }
        Ok(None)
    }

    fn list_families(&self, query: &FamilyListQuery) -> RepoResult<Vec<Family>> {
        let mut sql = format!("{FAMILY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(zone) = query.zone {
            sql.push_str(" AND zone = ?");
            bind_values.push(Value::Integer(i64::from(zone)));
        }

        sql.push_str(" ORDER BY rowid ASC");

        // Substring filters run in Rust so case folding covers non-ASCII names.
        let needle = query.name_contains.as_deref().map(str::to_lowercase);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut families = Vec::new();

        while let Some(row) = rows.next()? {
            let family = parse_family_row(row)?;
            if let Some(needle) = needle.as_deref() {
                if !contains_ignore_case(&family.family_name, needle) {
                    continue;
                }
            }
            families.push(family);
        }

        Ok(families)
    }

    fn count_families(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM families;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn delete_family(&self, id: FamilyId) -> RepoResult<Vec<MemberId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !family_exists(&tx, id)? {
            return Err(RepoError::NotFound(RecordRef::Family(id)));
        }

        let member_ids = list_owned_member_ids(&tx, id)?;
        for member_id in &member_ids {
            tx.execute(
                "DELETE FROM members WHERE uuid = ?1;",
                [member_id.to_string()],
            )?;
        }
        tx.execute("DELETE FROM families WHERE uuid = ?1;", [id.to_string()])?;

        tx.commit()?;
        Ok(member_ids)
    }

    fn add_member(&self, member: &Member) -> RepoResult<MemberId> {
        member.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !family_exists(&tx, member.family_id)? {
            return Err(RepoError::NotFound(RecordRef::Family(member.family_id)));
        }

        tx.execute(
            "INSERT INTO members (
                uuid,
                family_uuid,
                name,
                date_of_birth,
                relation,
                phone_number,
                occupation,
                is_student,
                is_senior_citizen,
                is_disabled,
                is_pensioner,
                pension_type,
                medical_needs
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                member.uuid.to_string(),
                member.family_id.to_string(),
                member.name.as_str(),
                member.date_of_birth.format(DATE_FORMAT).to_string(),
                member.relation.as_str(),
                member.phone_number.as_str(),
                member.occupation.as_deref(),
                bool_to_int(member.is_student),
                bool_to_int(member.is_senior_citizen),
                bool_to_int(member.is_disabled),
                bool_to_int(member.is_pensioner),
                member.pension_type.as_deref(),
                member.medical_needs.as_deref(),
            ],
        )?;

        tx.commit()?;
        Ok(member.uuid)
    }

    fn update_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                name = ?1,
                date_of_birth = ?2,
                relation = ?3,
                phone_number = ?4,
                occupation = ?5,
                is_student = ?6,
                is_senior_citizen = ?7,
                is_disabled = ?8,
                is_pensioner = ?9,
                pension_type = ?10,
                medical_needs = ?11,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?12;",
            params![
                member.name.as_str(),
                member.date_of_birth.format(DATE_FORMAT).to_string(),
                member.relation.as_str(),
                member.phone_number.as_str(),
                member.occupation.as_deref(),
                bool_to_int(member.is_student),
                bool_to_int(member.is_senior_citizen),
                bool_to_int(member.is_disabled),
                bool_to_int(member.is_pensioner),
                member.pension_type.as_deref(),
                member.medical_needs.as_deref(),
                member.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Member(member.uuid)));
        }

        Ok(())
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        let mut sql = format!("{MEMBER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(family_id) = query.family_id {
            sql.push_str(" AND family_uuid = ?");
            bind_values.push(Value::Text(family_id.to_string()));
        }

        if let Some(flag) = query.flag {
            sql.push_str(&format!(" AND {} = 1", flag_column(flag)));
        }

        sql.push_str(" ORDER BY rowid ASC");

        let text = query.text.as_deref().map(str::to_lowercase);
        let occupation = query.occupation_contains.as_deref().map(str::to_lowercase);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut members = Vec::new();

        while let Some(row) = rows.next()? {
            let member = parse_member_row(row)?;
            if let Some(text) = text.as_deref() {
                if !contains_ignore_case(&member.name, text)
                    && !contains_ignore_case(&member.phone_number, text)
                {
                    continue;
                }
            }
            if let Some(occupation) = occupation.as_deref() {
                let matches = member
                    .occupation
                    .as_deref()
                    .is_some_and(|value| contains_ignore_case(value, occupation));
                if !matches {
                    continue;
                }
            }
            members.push(member);
        }

        Ok(members)
    }

    fn count_members(&self, flag: Option<MemberFlag>) -> RepoResult<u64> {
        let sql = match flag {
            Some(flag) => format!(
                "SELECT COUNT(*) FROM members WHERE {} = 1;",
                flag_column(flag)
            ),
            None => "SELECT COUNT(*) FROM members;".to_string(),
        };
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Member(id)));
        }

        Ok(())
    }
}

fn family_exists(conn: &Connection, id: FamilyId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM families WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn list_owned_member_ids(conn: &Connection, family_id: FamilyId) -> RepoResult<Vec<MemberId>> {
    let mut stmt = conn.prepare(
        "SELECT uuid
         FROM members
         WHERE family_uuid = ?1
         ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([family_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "members.uuid")?);
    }
    Ok(ids)
}

fn flag_column(flag: MemberFlag) -> &'static str {
    match flag {
        MemberFlag::Student => "is_student",
        MemberFlag::SeniorCitizen => "is_senior_citizen",
        MemberFlag::Disabled => "is_disabled",
        MemberFlag::Pensioner => "is_pensioner",
    }
}

fn parse_family_row(row: &Row<'_>) -> RepoResult<Family> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "families.uuid")?;

    let zone_value: i64 = row.get("zone")?;
    let zone = Zone::new(zone_value).map_err(|_| {
        RepoError::InvalidData(format!("invalid zone `{zone_value}` in families.zone"))
    })?;

    let house_number_value: i64 = row.get("house_number")?;
    let house_number = u32::try_from(house_number_value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid house number `{house_number_value}` in families.house_number"
        ))
    })?;

    let ownership_text: String = row.get("house_ownership")?;
    let house_ownership = parse_house_ownership(&ownership_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid house ownership `{ownership_text}` in families.house_ownership"
        ))
    })?;

    let family = Family {
        uuid,
        family_name: row.get("family_name")?,
        zone,
        house_number,
        house_ownership,
        address: row.get("address")?,
    };
    family.validate()?;
    Ok(family)
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "members.uuid")?;
    let family_text: String = row.get("family_uuid")?;
    let family_id = parse_uuid(&family_text, "members.family_uuid")?;

    let dob_text: String = row.get("date_of_birth")?;
    let date_of_birth = NaiveDate::parse_from_str(&dob_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{dob_text}` in members.date_of_birth"
        ))
    })?;

    let relation_text: String = row.get("relation")?;
    let relation = parse_relation(&relation_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid relation `{relation_text}` in members.relation"
        ))
    })?;

    let member = Member {
        uuid,
        family_id,
        name: row.get("name")?,
        date_of_birth,
        relation,
        phone_number: row.get("phone_number")?,
        occupation: row.get("occupation")?,
        is_student: parse_bool(row.get("is_student")?, "members.is_student")?,
        is_senior_citizen: parse_bool(
            row.get("is_senior_citizen")?,
            "members.is_senior_citizen",
        )?,
        is_disabled: parse_bool(row.get("is_disabled")?, "members.is_disabled")?,
        is_pensioner: parse_bool(row.get("is_pensioner")?, "members.is_pensioner")?,
        pension_type: row.get("pension_type")?,
        medical_needs: row.get("medical_needs")?,
    };
    member.validate()?;
    Ok(member)
}

fn parse_house_ownership(value: &str) -> Option<HouseOwnership> {
    match value {
        "OWNED" => Some(HouseOwnership::Owned),
        "RENTAL" => Some(HouseOwnership::Rental),
        _ => None,
    }
}

/// Stored relations use the canonical spelling only.
fn parse_relation(value: &str) -> Option<Relation> {
    value
        .parse::<Relation>()
        .ok()
        .filter(|relation| relation.as_str() == value)
}
