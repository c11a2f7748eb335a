//! Staff record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create / merge-patch / delete / read APIs over the `staff` table.
//! - Keep SQL and column encoding inside the persistence boundary.
//!
//! # Invariants
//! - `create_staff` always assigns a fresh id; callers never choose it.
//! - `patch_staff` writes only the fields present in the patch.
//! - `list_staff` returns the full set in insertion order.
//! - Read paths reject undecodable persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::staff::{
    Education, Experience, Research, StaffMember, StaffPatch, StaffProfile, StaffRecordId,
    StaffStatus,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const STAFF_TABLE: &str = "staff";

const STAFF_COLUMNS: &[&str] = &[
    "id",
    "staff_id",
    "first_name",
    "last_name",
    "email",
    "position",
    "department",
    "phone_number",
    "image_url",
    "start_date",
    "status",
    "bio",
    "education_json",
    "experience_json",
    "research_json",
    "created_at",
    "updated_at",
];

const STAFF_SELECT_SQL: &str = "SELECT
    id,
    staff_id,
    first_name,
    last_name,
    email,
    position,
    department,
    phone_number,
    image_url,
    start_date,
    status,
    bio,
    education_json,
    experience_json,
    research_json
FROM staff";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for staff record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Nested list could not be encoded for storage.
    Encode(serde_json::Error),
    NotFound(StaffRecordId),
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode staff record: {err}"),
            Self::NotFound(id) => write!(f, "staff member not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "staff repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "staff repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "staff repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted staff data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
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

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Staff record store contract.
///
/// Mirrors the document collection semantics: the store assigns ids, updates
/// are merge-patches and deletes are hard deletes.
pub trait StaffRepository {
    /// Adds one document and returns its store-assigned id.
    fn create_staff(&self, profile: &StaffProfile) -> RepoResult<StaffRecordId>;
    /// Merge-patches the record identified by `id`.
    fn patch_staff(&self, id: StaffRecordId, patch: &StaffPatch) -> RepoResult<()>;
    /// Removes the record identified by `id`.
    fn delete_staff(&self, id: StaffRecordId) -> RepoResult<()>;
    fn get_staff(&self, id: StaffRecordId) -> RepoResult<Option<StaffMember>>;
    /// Returns every record in store iteration order.
    fn list_staff(&self) -> RepoResult<Vec<StaffMember>>;
}

impl<R: StaffRepository + ?Sized> StaffRepository for &R {
    fn create_staff(&self, profile: &StaffProfile) -> RepoResult<StaffRecordId> {
        (**self).create_staff(profile)
    }

    fn patch_staff(&self, id: StaffRecordId, patch: &StaffPatch) -> RepoResult<()> {
        (**self).patch_staff(id, patch)
    }

    fn delete_staff(&self, id: StaffRecordId) -> RepoResult<()> {
        (**self).delete_staff(id)
    }

    fn get_staff(&self, id: StaffRecordId) -> RepoResult<Option<StaffMember>> {
        (**self).get_staff(id)
    }

    fn list_staff(&self) -> RepoResult<Vec<StaffMember>> {
        (**self).list_staff()
    }
}

/// SQLite-backed staff record store.
pub struct SqliteStaffRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStaffRepository<'conn> {
    /// Creates a repository from a migrated connection.
    ///
    /// Fails when the schema version or the `staff` table shape does not match.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_staff_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StaffRepository for SqliteStaffRepository<'_> {
    fn create_staff(&self, profile: &StaffProfile) -> RepoResult<StaffRecordId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO staff (
                id,
                staff_id,
                first_name,
                last_name,
                email,
                position,
                department,
                phone_number,
                image_url,
                start_date,
                status,
                bio,
                education_json,
                experience_json,
                research_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                id.to_string(),
                profile.staff_id.as_str(),
                profile.first_name.as_str(),
                profile.last_name.as_str(),
                profile.email.as_str(),
                profile.position.as_str(),
                profile.department.as_str(),
                profile.phone_number.as_str(),
                profile.image_url.as_str(),
                profile.start_date.format(DATE_FORMAT).to_string(),
                profile.status.as_str(),
                profile.bio.as_str(),
                serde_json::to_string(&profile.education)?,
                serde_json::to_string(&profile.experience)?,
                serde_json::to_string(&profile.research)?,
            ],
        )?;

        Ok(id)
    }

    fn patch_staff(&self, id: StaffRecordId, patch: &StaffPatch) -> RepoResult<()> {
        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        for (column, value) in patch_columns(patch)? {
            assignments.push(format!("{column} = ?"));
            bind_values.push(value);
        }
        assignments.push("updated_at = (strftime('%s', 'now') * 1000)".to_string());
        bind_values.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE staff SET {} WHERE id = ?;", assignments.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_staff(&self, id: StaffRecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM staff WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_staff(&self, id: StaffRecordId) -> RepoResult<Option<StaffMember>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STAFF_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_staff_row(row)?));
        }

        Ok(None)
    }

    fn list_staff(&self) -> RepoResult<Vec<StaffMember>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STAFF_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();

        while let Some(row) = rows.next()? {
            members.push(parse_staff_row(row)?);
        }

        Ok(members)
    }
}

fn patch_columns(patch: &StaffPatch) -> RepoResult<Vec<(&'static str, Value)>> {
    let mut columns = Vec::new();
    let text_fields = [
        ("staff_id", &patch.staff_id),
        ("first_name", &patch.first_name),
        ("last_name", &patch.last_name),
        ("email", &patch.email),
        ("position", &patch.position),
        ("department", &patch.department),
        ("phone_number", &patch.phone_number),
        ("image_url", &patch.image_url),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            columns.push((column, Value::Text(value.clone())));
        }
    }

    if let Some(start_date) = patch.start_date {
        columns.push((
            "start_date",
            Value::Text(start_date.format(DATE_FORMAT).to_string()),
        ));
    }
    if let Some(status) = patch.status {
        columns.push(("status", Value::Text(status.as_str().to_string())));
    }
    if let Some(bio) = &patch.bio {
        columns.push(("bio", Value::Text(bio.clone())));
    }
    if let Some(education) = &patch.education {
        columns.push(("education_json", Value::Text(serde_json::to_string(education)?)));
    }
    if let Some(experience) = &patch.experience {
        columns.push((
            "experience_json",
            Value::Text(serde_json::to_string(experience)?),
        ));
    }
    if let Some(research) = &patch.research {
        columns.push(("research_json", Value::Text(serde_json::to_string(research)?)));
    }

    Ok(columns)
}

fn parse_staff_row(row: &Row<'_>) -> RepoResult<StaffMember> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid id `{id_text}` in staff.id")))?;

    let date_text: String = row.get("start_date")?;
    let start_date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid start date `{date_text}` in staff.start_date"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = StaffStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in staff.status"))
    })?;

    let education: Vec<Education> = parse_json_column(row, "education_json")?;
    let experience: Vec<Experience> = parse_json_column(row, "experience_json")?;
    let research: Vec<Research> = parse_json_column(row, "research_json")?;

    Ok(StaffMember {
        id,
        profile: StaffProfile {
            staff_id: row.get("staff_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            position: row.get("position")?,
            department: row.get("department")?,
            phone_number: row.get("phone_number")?,
            image_url: row.get("image_url")?,
            start_date,
            status,
            bio: row.get("bio")?,
            education,
            experience,
            research,
        },
    })
}

fn parse_json_column<T: DeserializeOwned>(row: &Row<'_>, column: &str) -> RepoResult<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw)
        .map_err(|err| RepoError::InvalidData(format!("invalid JSON in staff.{column}: {err}")))
}

fn ensure_staff_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, STAFF_TABLE)? {
        return Err(RepoError::MissingRequiredTable(STAFF_TABLE));
    }

    for &column in STAFF_COLUMNS {
        if !table_has_column(conn, STAFF_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: STAFF_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
